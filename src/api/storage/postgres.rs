//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the StorageBackend trait.

use super::{StorageBackend, StorageError};
use crate::config::DatabaseConfig;
use crate::models::{Note, NoteIn, UserRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

/// PostgreSQL storage backend implementation.
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a bounded pool and bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        info!(
            "Connecting to PostgreSQL at {} (pool size {})",
            config.redacted_url(),
            config.pool_size
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url())
            .await
            .map_err(|e| {
                StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;
        info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::ConnectionError(e.to_string())
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn create_note(&self, note: NoteIn) -> Result<Note, StorageError> {
        let created = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (text, completed)
            VALUES ($1, $2)
            RETURNING id, text, completed
            "#,
        )
        .bind(&note.text)
        .bind(note.completed)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        debug!("Inserted note {}", created.id);
        Ok(created)
    }

    async fn update_note(&self, id: i32, note: NoteIn) -> Result<Option<Note>, StorageError> {
        sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET text = $1, completed = $2
            WHERE id = $3
            RETURNING id, text, completed
            "#,
        )
        .bind(&note.text)
        .bind(note.completed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn list_notes(&self, skip: i64, take: i64) -> Result<Vec<Note>, StorageError> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, text, completed
            FROM notes
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_note(&self, id: i32) -> Result<Option<Note>, StorageError> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, text, completed
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn delete_note(&self, id: i32) -> Result<bool, StorageError> {
        let rows_affected = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StorageError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, hashed_password)
            VALUES ($1, $2)
            RETURNING id, username, hashed_password
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return StorageError::Conflict {
                        entity_type: "user".to_string(),
                        key: username.to_string(),
                    };
                }
            }
            db_error(e)
        })
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, hashed_password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(db_error)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
