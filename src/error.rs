//! Custom error types and handling
//!
//! This module defines the client's error taxonomy. Every error is
//! recoverable by user action (retry, resubmission or re-joining), so
//! nothing here is treated as fatal to the process.

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Local input errors (no request is made)
    #[error("Validation error: {0}")]
    Validation(String),

    // Backend errors
    #[error("Fetch failed: {0}")]
    TransientFetch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    // Session errors
    #[error("Session required: {0}")]
    SessionRequired(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    // Tracker lifecycle
    #[error("Superseded by a newer submission")]
    Superseded,

    #[error("Submission cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TransientFetch(_) => "TRANSIENT_FETCH_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::SessionRequired(_) => "SESSION_REQUIRED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Superseded => "SUPERSEDED",
            Self::Cancelled => "CANCELLED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether repeating the same action later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFetch(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::TransientFetch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation("x".into()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::TransientFetch("x".into()).error_code(),
            "TRANSIENT_FETCH_ERROR"
        );
        assert_eq!(AppError::Superseded.error_code(), "SUPERSEDED");
        assert_eq!(AppError::Cancelled.error_code(), "CANCELLED");
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::TransientFetch("down".into()).is_retryable());
        assert!(AppError::Timeout("slow".into()).is_retryable());
        assert!(!AppError::Validation("bad".into()).is_retryable());
        assert!(!AppError::NotFound("gone".into()).is_retryable());
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Decode(_)));
    }
}
