//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state: the
//! storage backend, the note service, and the authentication services.

use crate::config::{AppConfig, StorageKind};
use crate::services::cache_service::build_cache;
use crate::services::{
    JwtService, NoopCache, NoteService, PasswordService, SharedJwtService, SharedNoteCache,
};
use crate::storage::{MemoryStorageBackend, PostgresStorageBackend, StorageBackend};
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for notes and users
    pub storage: Arc<dyn StorageBackend>,
    /// Note operations (storage + cache)
    pub notes: NoteService,
    /// Token issuing and validation
    pub jwt_service: SharedJwtService,
    /// Password hashing
    pub passwords: PasswordService,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        cache: SharedNoteCache,
        jwt_service: JwtService,
        passwords: PasswordService,
    ) -> Self {
        Self {
            notes: NoteService::new(storage.clone(), cache),
            storage,
            jwt_service: Arc::new(jwt_service),
            passwords,
        }
    }

    /// Uncached state over a fresh memory backend.
    pub fn in_memory(jwt_service: JwtService, passwords: PasswordService) -> Self {
        Self::new(
            Arc::new(MemoryStorageBackend::new()),
            Arc::new(NoopCache),
            jwt_service,
            passwords,
        )
    }

    /// Build the state described by `config`: connect storage (running
    /// migrations for PostgreSQL) and the note cache.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let jwt_service = JwtService::from_config(config)?;

        let storage: Arc<dyn StorageBackend> = match config.storage {
            StorageKind::Postgres => {
                Arc::new(PostgresStorageBackend::connect(&config.database).await?)
            }
            StorageKind::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStorageBackend::new())
            }
        };

        let cache = build_cache(config.cache, &config.redis).await;

        Ok(Self::new(storage, cache, jwt_service, PasswordService::new()))
    }

    /// Release storage connections.
    pub async fn shutdown(&self) {
        self.storage.close().await;
    }
}

impl FromRef<AppState> for NoteService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notes.clone()
    }
}

impl FromRef<AppState> for SharedJwtService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt_service.clone()
    }
}
