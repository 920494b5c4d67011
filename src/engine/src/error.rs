//! Error types for the role engine

use thiserror::Error;

/// Role engine errors
///
/// Data-shape problems never surface here; resolution degrades to smaller
/// result sets instead. Only a broken engine configuration is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Invalid engine configuration
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
