//! Storage error types for the API storage backends.

use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Unique constraint violated
    #[error("{entity_type} already exists: {key}")]
    Conflict { entity_type: String, key: String },
    /// Database connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn note_not_found(id: i32) -> Self {
        StorageError::NotFound {
            entity_type: "note".to_string(),
            entity_id: id.to_string(),
        }
    }
}
