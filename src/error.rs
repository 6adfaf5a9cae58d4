//! Error types for image generation.

use std::path::PathBuf;
use std::time::Duration;

/// Longest error message carried over from a remote response body.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while generating and saving an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// Required configuration (the API key) is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested delay, if one was sent.
        retry_after: Option<Duration>,
    },

    /// Account has no remaining quota or billing is not set up.
    #[error("billing error: {0}")]
    Billing(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed but did not contain an image record.
    #[error("unexpected response: {0}")]
    ResponseFormat(String),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// Writing the output file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ImageGenError {
    /// Returns true if the error came from (or on the way to) the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Auth(_)
                | Self::Api { .. }
                | Self::RateLimited { .. }
                | Self::Billing(_)
                | Self::ContentBlocked(_)
                | Self::Network(_)
                | Self::Json(_)
        )
    }
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Redacts anything that looks like an API key and caps the length of a
/// remote error body before it is surfaced to the user.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted = text
        .split_inclusive(char::is_whitespace)
        .map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-');
            if trimmed.starts_with("sk-") && trimmed.len() > 8 {
                word.replace(trimmed, "sk-***")
            } else {
                word.to_string()
            }
        })
        .collect::<String>();

    let redacted = redacted.trim();
    if redacted.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let mut cut: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        cut.push_str("...");
        cut
    } else {
        redacted.to_string()
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
