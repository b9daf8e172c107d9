//! In-process storage backend.
//!
//! Keeps notes and users in ordered maps behind an async lock. Ids are handed
//! out from a counter and never reused, matching a SERIAL column.

use super::{StorageBackend, StorageError};
use crate::models::{Note, NoteIn, UserRecord};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    notes: BTreeMap<i32, Note>,
    users: BTreeMap<i32, UserRecord>,
    next_note_id: i32,
    next_user_id: i32,
}

/// Memory storage backend, used in tests and with `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStorageBackend {
    tables: RwLock<Tables>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn create_note(&self, note: NoteIn) -> Result<Note, StorageError> {
        let mut tables = self.tables.write().await;
        tables.next_note_id += 1;
        let created = Note::from_input(tables.next_note_id, note);
        tables.notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_note(&self, id: i32, note: NoteIn) -> Result<Option<Note>, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables.notes.get_mut(&id).map(|existing| {
            *existing = Note::from_input(id, note);
            existing.clone()
        }))
    }

    async fn list_notes(&self, skip: i64, take: i64) -> Result<Vec<Note>, StorageError> {
        let skip = usize::try_from(skip).map_err(|_| StorageError::Other("negative offset".into()))?;
        let take = usize::try_from(take).map_err(|_| StorageError::Other("negative limit".into()))?;
        let tables = self.tables.read().await;
        Ok(tables.notes.values().skip(skip).take(take).cloned().collect())
    }

    async fn get_note(&self, id: i32) -> Result<Option<Note>, StorageError> {
        Ok(self.tables.read().await.notes.get(&id).cloned())
    }

    async fn delete_note(&self, id: i32) -> Result<bool, StorageError> {
        Ok(self.tables.write().await.notes.remove(&id).is_some())
    }

    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StorageError::Conflict {
                entity_type: "user".to_string(),
                key: username.to_string(),
            });
        }
        tables.next_user_id += 1;
        let record = UserRecord {
            id: tables.next_user_id,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
