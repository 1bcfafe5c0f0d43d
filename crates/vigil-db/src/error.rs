//! Listing store error types.

use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create the store.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Failed to decode a stored value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Record with the provided identifier not found.
    #[error("{0}")]
    NotFoundWithMessage(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during store operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
