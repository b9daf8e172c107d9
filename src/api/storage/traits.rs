//! Storage trait definitions for the API storage backends.

use super::StorageError;
use crate::models::{Note, NoteIn, UserRecord};

/// Storage backend trait for notes and users.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Insert a note and return it with its assigned id
    async fn create_note(&self, note: NoteIn) -> Result<Note, StorageError>;

    /// Replace the contents of a note. `None` when the id does not exist.
    async fn update_note(&self, id: i32, note: NoteIn) -> Result<Option<Note>, StorageError>;

    /// Page through notes in id order
    async fn list_notes(&self, skip: i64, take: i64) -> Result<Vec<Note>, StorageError>;

    /// Get note by ID
    async fn get_note(&self, id: i32) -> Result<Option<Note>, StorageError>;

    /// Delete a note, returning whether a row was removed
    async fn delete_note(&self, id: i32) -> Result<bool, StorageError>;

    /// Create a user. Fails with `Conflict` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StorageError>;

    /// Get user by username
    async fn get_user_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, StorageError>;

    /// Verify the backend is reachable
    async fn health_check(&self) -> Result<(), StorageError>;

    /// Release connections. Default is a no-op.
    async fn close(&self) {}
}
