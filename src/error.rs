//! Error types for studio operations.

use std::time::Duration;

/// Errors that can occur while talking to the generative service.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Local file could not be read or was empty.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Selected file is not an image the service accepts.
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reply body was not the JSON shape the service documents.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// The call succeeded but carried no usable text or image.
    #[error("no result: {0}")]
    NoResult(String),
}

/// Coarse error classes shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Local file could not be read or encoded.
    Io,
    /// Transport or model-side failure.
    RemoteService,
    /// Nominal success with nothing to show.
    NoResult,
}

impl StudioError {
    /// Folds this error into its user-facing class.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io(_) | Self::UnsupportedMedia(_) => ErrorClass::Io,
            Self::NoResult(_) => ErrorClass::NoResult,
            _ => ErrorClass::RemoteService,
        }
    }

    /// Returns true if this error is likely transient.
    ///
    /// Nothing in the crate retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Redacts API keys echoed back by the service and truncates long bodies.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: String = text
        .split_inclusive(|c: char| c.is_whitespace() || c == '"' || c == '&' || c == '=')
        .map(|token| {
            let word = token.trim_end_matches(|c: char| {
                c.is_whitespace() || c == '"' || c == '&' || c == '='
            });
            if word.starts_with("AIza") && word.len() >= 30 {
                token.replacen(word, "[REDACTED]", 1)
            } else {
                token.to_string()
            }
        })
        .collect();

    if redacted.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        redacted
    }
}
