//! Error types for the extractor
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into two process-level classes: user-facing errors (bad
//! credentials, rejected requests, invalid configuration) terminate with
//! exit code 1 and a clean one-line message; everything else terminates
//! with exit code 2 and a full diagnostic. See [`Error::is_user_facing`].

use thiserror::Error;

/// The main error type for the extractor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Failed to login, verify your user name, password and database name. Detail: {detail}")]
    Auth { detail: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response after transport retries were exhausted. Carries the
    /// server diagnostic body so the operator can act on it.
    #[error("Request failed with HTTP {status}. Detail: {body}")]
    Request { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error carrying the server diagnostic text
    pub fn auth(detail: impl Into<String>) -> Self {
        Self::Auth {
            detail: detail.into(),
        }
    }

    /// Create a classified request error
    pub fn request(status: u16, body: impl Into<String>) -> Self {
        Self::Request {
            status,
            body: body.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is retryable at the transport layer
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::Request { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if this error is user-actionable.
    ///
    /// User-facing errors produce exit code 1 with a clean message; anything
    /// else produces exit code 2 with full diagnostics.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::Auth { .. }
                | Error::Request { .. }
                | Error::InvalidUrl(_)
        )
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for the extractor
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("layout_name");
        assert_eq!(
            err.to_string(),
            "Missing required config field: layout_name"
        );

        let err = Error::request(404, "Not found");
        assert_eq!(
            err.to_string(),
            "Request failed with HTTP 404. Detail: Not found"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::request(500, "").is_retryable());
        assert!(Error::request(503, "").is_retryable());

        assert!(!Error::request(400, "").is_retryable());
        assert!(!Error::request(401, "").is_retryable());
        assert!(!Error::auth("bad credentials").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_is_user_facing() {
        assert!(Error::auth("denied").is_user_facing());
        assert!(Error::request(400, "bad query").is_user_facing());
        assert!(Error::config("missing mode").is_user_facing());

        assert!(!Error::state("corrupt").is_user_facing());
        assert!(!Error::output("disk full").is_user_facing());
        assert!(!Error::Timeout { timeout_ms: 10 }.is_user_facing());
    }
}
