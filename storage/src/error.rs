//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use chanbot_core::ChanbotError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<StorageError> for ChanbotError {
    fn from(e: StorageError) -> Self {
        ChanbotError::Storage(e.to_string())
    }
}
