use crate::object_id::ObjectId;
use crate::store::{parse_key, DocumentStore, StoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// PostgreSQL-backed document store
///
/// Each operation checks a connection out of the shared pool for the single
/// statement it runs and hands it back when the statement completes.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and create the collection table if missing
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self::from_pool(pool);
        store.init_schema().await?;

        info!("Connected to database (max {} connections)", max_connections);
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the collection table (safe to run always)
    ///
    /// Values are kept as raw UTF-8 bytes so strings containing NUL survive.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS dkv (
                id CHAR(24) PRIMARY KEY,
                data BYTEA NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create dkv table")?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn put(&self, value: &str) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();

        sqlx::query("INSERT INTO dkv (id, data) VALUES ($1, $2)")
            .bind(id.to_hex())
            .bind(value.as_bytes())
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        // Malformed keys never reach the database
        let id = parse_key(key)?;

        let data: Option<Vec<u8>> = sqlx::query_scalar("SELECT data FROM dkv WHERE id = $1")
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;

        let bytes = data.ok_or(StoreError::NotFound)?;
        String::from_utf8(bytes)
            .map_err(|e| StoreError::Backend(format!("record {} is not UTF-8: {}", id, e)))
    }
}
