//! API error types

use std::time::Duration;

/// Errors that can occur during backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP response from the backend.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message, taken from the body's `message` field when present.
        message: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates an HTTP error from a raw body, preferring its `message` field.
    ///
    /// Backends answer failures with `{"message": "..."}`; anything else is
    /// kept verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.to_string());
        Self::http(status, message)
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_prefers_message_field() {
        let err = ApiError::from_body(404, r#"{"message":"Order not found"}"#);
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Order not found");
    }

    #[test]
    fn test_from_body_keeps_plain_text() {
        let err = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!ApiError::http(400, "bad").is_retryable());
        assert!(!ApiError::parse("oops").is_retryable());
    }
}
