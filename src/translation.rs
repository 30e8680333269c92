use crate::config::Config;
use futures::future::join_all;
use reqwest::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Language stored values are assumed to be written in
pub const SOURCE_LANGUAGE: &str = "en";

/// Languages every lookup is translated into
pub const TARGET_LANGUAGES: [&str; 3] = ["es", "fr", "pt"];

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation API error ({status}): {body}")]
    Status { status: StatusCode, body: String },
}

/// Client for the machine-translation HTTP API
///
/// Authenticates with HTTP Basic credentials on every call. There is no retry;
/// the underlying `reqwest::Client` timeouts apply.
#[derive(Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationClient")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl TranslationClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            &config.translation_url,
            &config.translation_user,
            &config.translation_password,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Translate `text` from `source` to `target`
    ///
    /// The text travels twice: URL-encoded in the `text` query parameter and as
    /// the raw request body. The response body is returned as-is.
    pub async fn translate(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/v2/translate", self.endpoint);

        let response = self
            .http
            .post(&url)
            .query(&[("source", source), ("target", target), ("text", text)])
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/plain")
            .body(text.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslationError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}

/// Translate `text` into every target language, keeping whatever succeeds
///
/// Calls run concurrently. A failed language is logged and left out of the
/// result; this never fails as a whole.
pub async fn translate_all(client: &TranslationClient, text: &str) -> BTreeMap<String, String> {
    let calls = TARGET_LANGUAGES.iter().map(|&lang| async move {
        (lang, client.translate(SOURCE_LANGUAGE, lang, text).await)
    });

    let mut translations = BTreeMap::new();
    for (lang, result) in join_all(calls).await {
        match result {
            Ok(translated) => {
                debug!("Translated {} chars to {}", text.len(), lang);
                translations.insert(lang.to_string(), translated);
            }
            Err(e) => warn!("Translation to {} failed: {}", lang, e),
        }
    }

    translations
}
