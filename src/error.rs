//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before the backend answered
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Sign-in rejected (bad credentials or unverified account)
    #[error("Login failed: {0}")]
    AuthFailed(String),

    /// No usable session (never signed in, signed out or expired)
    #[error("Not signed in")]
    NotAuthenticated,

    /// Principal signed in through the wrong portal
    #[error("Wrong portal: {0}")]
    WrongPortal(String),

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Excel export error
    #[error("Export error: {0}")]
    Export(String),

    /// Validation error, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error with message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a backend rejection error
    pub fn backend(status: u16, msg: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: msg.into(),
        }
    }

    /// Whether this error means the user must sign in again.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::AuthFailed(_) | Self::NotAuthenticated => true,
            Self::Backend { status, .. } => *status == 401,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        assert!(AppError::NotAuthenticated.is_auth());
        assert!(AppError::AuthFailed("bad".into()).is_auth());
        assert!(AppError::backend(401, "JWT expired").is_auth());
        assert!(!AppError::backend(500, "boom").is_auth());
        assert!(!AppError::validation("amount").is_auth());
    }

    #[test]
    fn test_display_backend() {
        let err = AppError::backend(409, "duplicate key");
        assert_eq!(err.to_string(), "Backend error (409): duplicate key");
    }
}
