//! HTTP error mapping.

use crate::store::StoreError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Error wrapper for converting handler failures to HTTP responses
///
/// Bodies are plain text: 404 `no data found`, 405 `invalid http method`
/// with an `Allow` header, 500 with the underlying error message.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    /// Carries the value of the `Allow` header
    MethodNotAllowed(&'static str),
    Store(StoreError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "no data found").into_response(),
            ApiError::MethodNotAllowed(allow) => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow)],
                "invalid http method",
            )
                .into_response(),
            ApiError::Store(e) => {
                error!("Store operation failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            other => ApiError::Store(other),
        }
    }
}
