//! Clip bytes keyed by blob reference
//!
//! Writes are upserts, so re-importing a bundle under the same IDs simply
//! replaces the stored bytes.

use async_trait::async_trait;
use sideline_core::{BlobId, BlobStore};
use sqlx::SqlitePool;

use crate::error::Result;

/// Store bytes under `id`, replacing any previous bytes
pub async fn put(pool: &SqlitePool, id: &str, bytes: &[u8]) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO blobs (id, bytes, stored_at)
         VALUES (?, ?, ?)
         ON CONFLICT(id)
         DO UPDATE SET
            bytes = excluded.bytes,
            stored_at = excluded.stored_at",
    )
    .bind(id)
    .bind(bytes)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch bytes for `id`
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Vec<u8>>> {
    let bytes = sqlx::query_scalar::<_, Vec<u8>>("SELECT bytes FROM blobs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(bytes)
}

/// All blobs ordered by ID
pub async fn list(pool: &SqlitePool) -> Result<Vec<(String, Vec<u8>)>> {
    let rows = sqlx::query_as::<_, (String, Vec<u8>)>("SELECT id, bytes FROM blobs ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Delete a blob, returning whether it existed
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM blobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `BlobStore` backed by the `blobs` table
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    /// Wrap a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Remove a blob
    ///
    /// Tiles referencing it are left in place and will hydrate as inactive.
    pub async fn remove(&self, id: &BlobId) -> sideline_core::Result<bool> {
        Ok(delete(&self.pool, id.as_str()).await?)
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn put(&self, id: &BlobId, bytes: Vec<u8>) -> sideline_core::Result<()> {
        put(&self.pool, id.as_str(), &bytes).await?;
        Ok(())
    }

    async fn get(&self, id: &BlobId) -> sideline_core::Result<Option<Vec<u8>>> {
        Ok(get(&self.pool, id.as_str()).await?)
    }

    async fn list(&self) -> sideline_core::Result<Vec<(BlobId, Vec<u8>)>> {
        Ok(list(&self.pool)
            .await?
            .into_iter()
            .map(|(id, bytes)| (BlobId::new(id), bytes))
            .collect())
    }
}
