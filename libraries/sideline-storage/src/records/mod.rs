//! Serialized records keyed by name
//!
//! The library record and the toggle flags are stored as JSON text. This
//! module does not interpret the text; malformed content is the caller's
//! concern (the library falls back to an empty scaffold).

use async_trait::async_trait;
use sideline_core::RecordStore;
use sqlx::SqlitePool;

use crate::error::Result;

/// Key of the library metadata record
pub const LIBRARY_KEY: &str = "library";

/// Key of the toggles record
pub const TOGGLES_KEY: &str = "toggles";

/// Read the record stored under `key`
pub async fn read(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM records WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Create or replace the record stored under `key`
pub async fn write(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO records (key, value, updated_at)
         VALUES (?, ?, ?)
         ON CONFLICT(key)
         DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// `RecordStore` backed by the `records` table
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Wrap a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn read(&self, key: &str) -> sideline_core::Result<Option<String>> {
        Ok(read(&self.pool, key).await?)
    }

    async fn write(&self, key: &str, value: &str) -> sideline_core::Result<()> {
        write(&self.pool, key, value).await?;
        Ok(())
    }
}
