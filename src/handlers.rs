//! HTTP route handlers.
//!
//! Storage routes (`/dkv/...`) accept GET and POST; translate routes
//! (`/dkv/translate/...`) accept GET only.

use crate::error::ApiError;
use crate::server::AppState;
use crate::translation::translate_all;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Allowed methods on storage routes
pub const STORAGE_METHODS: &str = "GET,POST";

/// Allowed methods on translate routes
pub const TRANSLATE_METHODS: &str = "GET";

/// Key segment of a record route
///
/// Any trailing segments after the key (`/dkv/{key}/...`) are captured by the
/// router but ignored here.
#[derive(Debug, Deserialize)]
pub struct KeyPath {
    pub key: String,
}

/// Body returned after a successful POST
#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    #[serde(rename = "Key")]
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub k: String,
    pub v: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub k: String,
    pub v: String,
    pub translations: BTreeMap<String, String>,
}

/// Serialize as tab-indented JSON with a trailing newline
fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    buf.push(b'\n');

    Ok(([(header::CONTENT_TYPE, "application/json")], buf).into_response())
}

/// Handle GET /dkv/{key}
pub async fn get_record(
    State(state): State<AppState>,
    Path(KeyPath { key }): Path<KeyPath>,
) -> Result<Response, ApiError> {
    let value = state.store.get(&key).await?;
    debug!("Fetched record {}", key);

    json_response(&RecordResponse { k: key, v: value })
}

/// Handle POST /dkv/
///
/// The body is stored as text; invalid UTF-8 sequences are replaced.
pub async fn put_record(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let value = String::from_utf8_lossy(&body);
    let id = state.store.put(&value).await?;
    info!("Stored record {} ({} bytes)", id, body.len());

    json_response(&PutResponse { key: id.to_hex() })
}

/// Handle GET /dkv/translate/{key}
///
/// Translation failures are dropped per language; the response is 200 as long
/// as the record itself was found.
pub async fn translate_record(
    State(state): State<AppState>,
    Path(KeyPath { key }): Path<KeyPath>,
) -> Result<Response, ApiError> {
    let value = state.store.get(&key).await?;
    let translations = translate_all(&state.translator, &value).await;
    info!(
        "Translated record {} into {} language(s)",
        key,
        translations.len()
    );

    json_response(&TranslateResponse {
        k: key,
        v: value,
        translations,
    })
}

/// Handle GET on a route without a key segment
pub async fn missing_key() -> ApiError {
    ApiError::NotFound
}

pub async fn storage_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(STORAGE_METHODS)
}

pub async fn translate_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(TRANSLATE_METHODS)
}
