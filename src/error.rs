//! Grok Client Error Types
//!
//! A flat error taxonomy shared by the buffered and streaming operations.

use thiserror::Error;

/// Main error type for client operations
#[derive(Debug, Error)]
pub enum GrokError {
    /// The transport handed back something that is not a usable HTTP response
    #[error("Invalid response from the server: {0}")]
    InvalidResponse(String),

    /// The server answered with a non-2xx status
    #[error("HTTP error {status}: {body}")]
    Http {
        status: u16,
        /// Raw response body, kept verbatim for diagnostics
        body: String,
    },

    /// Success status but an empty body
    #[error("No data received from the server")]
    NoData,

    /// Body present but it does not match the expected shape
    #[error("Decoding error: {0}")]
    Decoding(#[from] serde_json::Error),

    /// Request entity could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Network-level failure (timeout, connection reset, DNS)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Client configuration errors (missing key, bad header value, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GrokError {
    /// HTTP status code, for `Http` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            GrokError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, for `Http` errors
    pub fn body(&self) -> Option<&str> {
        match self {
            GrokError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` if the transport gave up waiting on a deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GrokError::Transport(err) if err.is_timeout())
    }

    /// Returns `true` if the failure is potentially transient.
    ///
    /// Nothing in this crate retries; this only helps callers that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            GrokError::Transport(err) => err.is_timeout() || err.is_connect(),
            GrokError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Build a decoding error from a plain message
    pub(crate) fn decoding(msg: impl std::fmt::Display) -> Self {
        GrokError::Decoding(<serde_json::Error as serde::de::Error>::custom(msg))
    }
}

impl From<reqwest::Error> for GrokError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GrokError::InvalidResponse(err.to_string())
        } else {
            GrokError::Transport(err)
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, GrokError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_keeps_body() {
        let err = GrokError::Http {
            status: 401,
            body: r#"{"error":"invalid key"}"#.to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some(r#"{"error":"invalid key"}"#));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_retryable_statuses() {
        let overloaded = GrokError::Http {
            status: 503,
            body: String::new(),
        };
        let limited = GrokError::Http {
            status: 429,
            body: String::new(),
        };
        assert!(overloaded.is_retryable());
        assert!(limited.is_retryable());
        assert!(!GrokError::NoData.is_retryable());
        assert!(!GrokError::NoData.is_timeout());
    }

    #[test]
    fn test_decoding_from_message() {
        let err = GrokError::decoding("frame is not valid UTF-8");
        assert!(matches!(err, GrokError::Decoding(_)));
        assert!(err.to_string().contains("frame is not valid UTF-8"));
        assert_eq!(err.status(), None);
    }
}
