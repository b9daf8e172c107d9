//! Read-through cache for single notes.
//!
//! Three backends share the [`NoteCache`] trait: a no-op, an in-process map
//! with a TTL, and Redis. Notes are stored as JSON under `note:{id}`.

use crate::config::{CacheKind, RedisConfig};
use crate::models::Note;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cache key for a note.
pub fn note_key(id: i32) -> String {
    format!("note:{}", id)
}

#[async_trait]
pub trait NoteCache: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Note>, CacheError>;
    async fn put(&self, note: &Note) -> Result<(), CacheError>;
    async fn invalidate(&self, id: i32) -> Result<(), CacheError>;
}

pub type SharedNoteCache = Arc<dyn NoteCache>;

/// Cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl NoteCache for NoopCache {
    async fn get(&self, _id: i32) -> Result<Option<Note>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _note: &Note) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _id: i32) -> Result<(), CacheError> {
        Ok(())
    }
}

/// In-process cache with a per-entry TTL.
pub struct MemoryNoteCache {
    ttl: Duration,
    entries: RwLock<HashMap<i32, (Note, Instant)>>,
}

impl MemoryNoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl NoteCache for MemoryNoteCache {
    async fn get(&self, id: i32) -> Result<Option<Note>, CacheError> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(&id) {
                Some((note, stored_at)) if stored_at.elapsed() < self.ttl => {
                    return Ok(Some(note.clone()));
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().await.remove(&id);
        }
        Ok(None)
    }

    async fn put(&self, note: &Note) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(note.id, (note.clone(), Instant::now()));
        Ok(())
    }

    async fn invalidate(&self, id: i32) -> Result<(), CacheError> {
        self.entries.write().await.remove(&id);
        Ok(())
    }
}

/// Redis-backed cache.
pub struct RedisNoteCache {
    manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisNoteCache {
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        info!(
            "Connecting to Redis at {}:{} (tls: {})",
            config.host, config.port, config.use_tls
        );
        let client = redis::Client::open(config.url())?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager,
            ttl_seconds: config.ttl_seconds,
        })
    }
}

#[async_trait]
impl NoteCache for RedisNoteCache {
    async fn get(&self, id: i32) -> Result<Option<Note>, CacheError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(note_key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, note: &Note) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let json = serde_json::to_string(note)?;
        conn.set_ex::<_, _, ()>(note_key(note.id), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, id: i32) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(note_key(id)).await?;
        Ok(())
    }
}

/// Build the cache selected by configuration. An unreachable Redis degrades
/// to no caching rather than preventing startup.
pub async fn build_cache(kind: CacheKind, redis: &RedisConfig) -> SharedNoteCache {
    match kind {
        CacheKind::None => Arc::new(NoopCache),
        CacheKind::Memory => {
            info!("Using in-memory note cache (ttl {}s)", redis.ttl_seconds);
            Arc::new(MemoryNoteCache::new(Duration::from_secs(redis.ttl_seconds)))
        }
        CacheKind::Redis => match RedisNoteCache::connect(redis).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!("Failed to connect to Redis: {}. Continuing without cache.", e);
                Arc::new(NoopCache)
            }
        },
    }
}
