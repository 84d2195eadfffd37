//! Error types for Guardian
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation at the binary boundary.

use thiserror::Error;

/// Main error type for Guardian operations
#[derive(Error, Debug)]
pub enum GuardianError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be written
    #[error("Configuration write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Caller supplied an invalid value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// State file lock could not be acquired
    #[error("Lock error: {0}")]
    Lock(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Guardian operations
pub type Result<T> = std::result::Result<T, GuardianError>;

/// Convert anyhow::Error to GuardianError
impl From<anyhow::Error> for GuardianError {
    fn from(err: anyhow::Error) -> Self {
        GuardianError::Other(err.to_string())
    }
}

impl GuardianError {
    /// Whether the error was caused by the caller rather than the environment
    pub fn is_caller_error(&self) -> bool {
        matches!(self, GuardianError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GuardianError::InvalidInput("target must be in [0, 1]".to_string());
        assert_eq!(err.to_string(), "Invalid input: target must be in [0, 1]");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: GuardianError = json_err.into();
        assert!(matches!(err, GuardianError::Serialization(_)));
        assert!(!err.is_caller_error());
    }
}
