//! Common error types for Marksync.

use thiserror::Error;

/// Top-level error type for Marksync operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote transport operation failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local bookmark store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
