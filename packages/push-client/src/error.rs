//! Error types for the push-server client.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Result type for push-server client operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Push-server client errors.
#[derive(Debug, Error)]
pub enum PushError {
    /// Non-2xx response from the push server
    #[error("push server returned {status}: {body}")]
    Transport { status: u16, body: ErrorBody },

    /// Network error (connection failed, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error (missing API key, device id)
    #[error("configuration error: {0}")]
    Config(String),
}

impl PushError {
    /// HTTP status for transport errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error payload the push server sends alongside a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    #[serde(alias = "error")]
    pub message: String,
}

/// Body of a failed response.
///
/// The server usually answers with a JSON error object, but proxies and
/// crashes in front of it produce arbitrary text. Both are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Parsed(ServerError),
    Raw(String),
}

impl ErrorBody {
    /// Try the structured form first, falling back to the raw text.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<ServerError>(&text) {
            Ok(parsed) => ErrorBody::Parsed(parsed),
            Err(_) => ErrorBody::Raw(text),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorBody::Parsed(err) => &err.message,
            ErrorBody::Raw(text) => text,
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
