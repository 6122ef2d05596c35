//! Upstream API error types

use thiserror::Error;

/// Error from the Memento API with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub message: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Unknown, message)
    }

    /// Classify a non-2xx upstream response.
    ///
    /// The API reports failures as `{"error": "..."}`; when the body does
    /// not match that shape the per-operation fallback message is used.
    pub fn from_response(status: reqwest::StatusCode, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(serde_json::Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_else(|| fallback.to_string());

        let kind = match status.as_u16() {
            401 | 403 => UpstreamErrorKind::Auth,
            404 => UpstreamErrorKind::NotFound,
            400 => UpstreamErrorKind::InvalidRequest,
            500..=599 => UpstreamErrorKind::ServerError,
            _ => UpstreamErrorKind::Unknown,
        };

        Self::new(kind, message)
    }
}

/// Error classification for response mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Could not reach the API (connect failure, timeout)
    Network,
    /// Token rejected (401, 403)
    Auth,
    /// Resource absent (404)
    NotFound,
    /// Bad request (400)
    InvalidRequest,
    /// Upstream failure (5xx)
    ServerError,
    /// Anything else
    Unknown,
}
