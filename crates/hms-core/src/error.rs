//! Error types for HMS backends

use thiserror::Error;

/// Core error type for backend operations
#[derive(Error, Debug)]
pub enum HmsError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl HmsError {
    /// Whether the error means the backend could not be reached at all,
    /// as opposed to the backend rejecting a statement.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HmsError::Connection(_) | HmsError::Io(_))
    }
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, HmsError>;
