//! Unified error types for adrole
//!
//! Library-level errors shared by the engine and the workbook tooling.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for adrole
#[derive(Debug, Error)]
pub enum CoreError {
    /// Serialization/Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input data failed schema or relationship validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input/state
    #[error("Invalid: {0}")]
    Invalid(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        CoreError::Serialization(msg.into())
    }

    /// Create a validation error from the collected messages
    pub fn validation(errors: Vec<String>) -> Self {
        CoreError::Validation(errors)
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        CoreError::Configuration(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Create an invalid error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        CoreError::Invalid(msg.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
