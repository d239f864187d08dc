//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap rusqlite errors and convert
//! them to the backend-agnostic [`StoreError`] defined in
//! `samplehub_resilience`.

use samplehub_resilience::StoreError;
use thiserror::Error;

/// Type alias for Result using [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage-specific errors that wrap rusqlite and filesystem types.
///
/// These errors are internal to the storage layer and are converted to
/// [`StoreError`] before being returned through the `KeyValueStore` trait.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) | StorageError::MigrationFailed(e) => {
                StoreError::Unavailable(e)
            }
            StorageError::Io(e) => StoreError::Unavailable(e.to_string()),
            StorageError::QueryFailed(e) => StoreError::OperationFailed(e.to_string()),
        }
    }
}

/// Extension trait for converting rusqlite Results to store Results.
pub trait IntoStore<T> {
    fn into_store(self) -> std::result::Result<T, StoreError>;
}

impl<T> IntoStore<T> for std::result::Result<T, rusqlite::Error> {
    fn into_store(self) -> std::result::Result<T, StoreError> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
