//! Note operations over a storage backend and a read-through cache.

use super::cache_service::{NoopCache, SharedNoteCache};
use crate::models::{Note, NoteIn};
use crate::storage::{StorageBackend, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Per-note write counters. A read only populates the cache when no update or
/// delete of the same id completed while it was in flight.
///
/// Entries are never removed: resetting a counter would let a read that
/// started before the reset match it again.
#[derive(Debug, Default)]
struct WriteGenerations(Mutex<HashMap<i32, u64>>);

impl WriteGenerations {
    fn lock(&self) -> MutexGuard<'_, HashMap<i32, u64>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self, id: i32) -> u64 {
        self.lock().get(&id).copied().unwrap_or(0)
    }

    fn bump(&self, id: i32) -> u64 {
        let mut generations = self.lock();
        let generation = generations.entry(id).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[derive(Clone)]
pub struct NoteService {
    storage: Arc<dyn StorageBackend>,
    cache: SharedNoteCache,
    generations: Arc<WriteGenerations>,
}

impl NoteService {
    pub fn new(storage: Arc<dyn StorageBackend>, cache: SharedNoteCache) -> Self {
        Self {
            storage,
            cache,
            generations: Arc::default(),
        }
    }

    /// Service without caching.
    pub fn uncached(storage: Arc<dyn StorageBackend>) -> Self {
        Self::new(storage, Arc::new(NoopCache))
    }

    pub async fn create(&self, input: NoteIn) -> Result<Note, StorageError> {
        let note = self.storage.create_note(input).await?;
        info!("Created note {}", note.id);
        Ok(note)
    }

    /// Replace a note's contents. Fails with `NotFound` for unknown ids.
    pub async fn update(&self, id: i32, input: NoteIn) -> Result<Note, StorageError> {
        let note = self
            .storage
            .update_note(id, input)
            .await?
            .ok_or_else(|| StorageError::note_not_found(id))?;
        let generation = self.generations.bump(id);
        if let Err(e) = self.cache.put(&note).await {
            warn!("Failed to refresh cached note {}: {}", id, e);
            self.forget(id).await;
        } else if self.generations.current(id) != generation {
            // A later write may have been cached before ours
            self.forget(id).await;
        }
        info!("Updated note {}", id);
        Ok(note)
    }

    pub async fn list(&self, skip: i64, take: i64) -> Result<Vec<Note>, StorageError> {
        self.storage.list_notes(skip, take).await
    }

    pub async fn get(&self, id: i32) -> Result<Note, StorageError> {
        match self.cache.get(id).await {
            Ok(Some(note)) => {
                debug!("Cache hit for note {}", id);
                return Ok(note);
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup for note {} failed: {}", id, e),
        }

        let seen = self.generations.current(id);
        let note = self.storage.get_note(id).await?.ok_or_else(|| {
            warn!("No data found for ID: {}", id);
            StorageError::note_not_found(id)
        })?;

        if self.generations.current(id) != seen {
            debug!("Note {} changed during read, not caching", id);
            return Ok(note);
        }
        if let Err(e) = self.cache.put(&note).await {
            warn!("Failed to cache note {}: {}", id, e);
        } else if self.generations.current(id) != seen {
            self.forget(id).await;
        }
        Ok(note)
    }

    /// Delete a note. Deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: i32) -> Result<(), StorageError> {
        let removed = self.storage.delete_note(id).await?;
        self.generations.bump(id);
        self.forget(id).await;
        if removed {
            info!("Deleted note {}", id);
        } else {
            debug!("Delete requested for missing note {}", id);
        }
        Ok(())
    }

    async fn forget(&self, id: i32) {
        if let Err(e) = self.cache.invalidate(id).await {
            warn!("Failed to invalidate cached note {}: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache_service::{MemoryNoteCache, NoteCache};
    use crate::models::UserRecord;
    use crate::storage::MemoryStorageBackend;
    use std::time::Duration;

    /// Memory storage whose note reads stall after fetching the row.
    struct SlowRead {
        inner: MemoryStorageBackend,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl StorageBackend for SlowRead {
        async fn create_note(&self, note: NoteIn) -> Result<Note, StorageError> {
            self.inner.create_note(note).await
        }

        async fn update_note(&self, id: i32, note: NoteIn) -> Result<Option<Note>, StorageError> {
            self.inner.update_note(id, note).await
        }

        async fn list_notes(&self, skip: i64, take: i64) -> Result<Vec<Note>, StorageError> {
            self.inner.list_notes(skip, take).await
        }

        async fn get_note(&self, id: i32) -> Result<Option<Note>, StorageError> {
            let note = self.inner.get_note(id).await;
            tokio::time::sleep(self.delay).await;
            note
        }

        async fn delete_note(&self, id: i32) -> Result<bool, StorageError> {
            self.inner.delete_note(id).await
        }

        async fn create_user(
            &self,
            username: &str,
            hashed_password: &str,
        ) -> Result<UserRecord, StorageError> {
            self.inner.create_user(username, hashed_password).await
        }

        async fn get_user_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserRecord>, StorageError> {
            self.inner.get_user_by_username(username).await
        }

        async fn health_check(&self) -> Result<(), StorageError> {
            self.inner.health_check().await
        }
    }

    fn slow_service() -> (NoteService, Arc<MemoryNoteCache>) {
        let storage = Arc::new(SlowRead {
            inner: MemoryStorageBackend::new(),
            delay: Duration::from_millis(100),
        });
        let cache = Arc::new(MemoryNoteCache::new(Duration::from_secs(60)));
        (NoteService::new(storage, cache.clone()), cache)
    }

    fn input(text: &str, completed: bool) -> NoteIn {
        NoteIn {
            text: text.to_string(),
            completed,
        }
    }

    fn service_with_cache() -> (NoteService, Arc<MemoryStorageBackend>, Arc<MemoryNoteCache>) {
        let storage = Arc::new(MemoryStorageBackend::new());
        let cache = Arc::new(MemoryNoteCache::new(Duration::from_secs(60)));
        let service = NoteService::new(storage.clone(), cache.clone());
        (service, storage, cache)
    }

    #[tokio::test]
    async fn test_get_populates_cache() {
        let (service, _storage, cache) = service_with_cache();
        let note = service.create(input("buy milk", false)).await.unwrap();
        assert_eq!(cache.get(note.id).await.unwrap(), None);

        assert_eq!(service.get(note.id).await.unwrap(), note);
        assert_eq!(cache.get(note.id).await.unwrap(), Some(note));
    }

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let (service, _storage, cache) = service_with_cache();
        let note = service.create(input("draft", false)).await.unwrap();
        service.get(note.id).await.unwrap();

        let updated = service.update(note.id, input("final", true)).await.unwrap();
        assert_eq!(cache.get(note.id).await.unwrap(), Some(updated.clone()));
        assert_eq!(service.get(note.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let (service, _storage, cache) = service_with_cache();
        let note = service.create(input("temp", false)).await.unwrap();
        service.get(note.id).await.unwrap();

        service.delete(note.id).await.unwrap();
        assert_eq!(cache.get(note.id).await.unwrap(), None);
        assert_eq!(
            service.get(note.id).await,
            Err(StorageError::note_not_found(note.id))
        );
    }

    #[tokio::test]
    async fn test_delete_during_read_is_not_recached() {
        let (service, cache) = slow_service();
        let note = service.create(input("t", false)).await.unwrap();

        let reader = {
            let service = service.clone();
            tokio::spawn(async move { service.get(note.id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        service.delete(note.id).await.unwrap();

        assert_eq!(reader.await.unwrap().unwrap(), note);
        assert_eq!(cache.get(note.id).await.unwrap(), None);
        assert_eq!(
            service.get(note.id).await,
            Err(StorageError::note_not_found(note.id))
        );
    }

    #[tokio::test]
    async fn test_update_during_read_keeps_new_contents() {
        let (service, cache) = slow_service();
        let note = service.create(input("old", false)).await.unwrap();

        let reader = {
            let service = service.clone();
            tokio::spawn(async move { service.get(note.id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let updated = service.update(note.id, input("new", true)).await.unwrap();

        assert_eq!(reader.await.unwrap().unwrap().text, "old");
        assert_eq!(cache.get(note.id).await.unwrap(), Some(updated.clone()));
        assert_eq!(service.get(note.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_note_is_not_found() {
        let service = NoteService::uncached(Arc::new(MemoryStorageBackend::new()));
        assert_eq!(
            service.update(9, input("x", false)).await,
            Err(StorageError::note_not_found(9))
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = NoteService::uncached(Arc::new(MemoryStorageBackend::new()));
        assert!(service.delete(1).await.is_ok());
        assert!(service.delete(1).await.is_ok());
    }
}
