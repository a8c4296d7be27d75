//! In-memory stores
//!
//! Same contracts as the SQLite stores, without durability. Used for
//! throwaway sessions and as test doubles.

use async_trait::async_trait;
use sideline_core::{BlobId, BlobStore, RecordStore};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// `BlobStore` kept in a map
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<BTreeMap<BlobId, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a blob, returning whether it existed
    pub async fn remove(&self, id: &BlobId) -> bool {
        self.blobs.write().await.remove(id).is_some()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, id: &BlobId, bytes: Vec<u8>) -> sideline_core::Result<()> {
        self.blobs.write().await.insert(id.clone(), bytes);
        Ok(())
    }

    async fn get(&self, id: &BlobId) -> sideline_core::Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(id).cloned())
    }

    async fn list(&self) -> sideline_core::Result<Vec<(BlobId, Vec<u8>)>> {
        Ok(self
            .blobs
            .read()
            .await
            .iter()
            .map(|(id, bytes)| (id.clone(), bytes.clone()))
            .collect())
    }
}

/// `RecordStore` kept in a map
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one record
    pub fn with_record(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut records = HashMap::new();
        records.insert(key.into(), value.into());
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn read(&self, key: &str) -> sideline_core::Result<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> sideline_core::Result<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blob_put_get_list() {
        let store = MemoryBlobStore::new();
        store.put(&BlobId::new("b"), vec![2]).await.unwrap();
        store.put(&BlobId::new("a"), vec![1]).await.unwrap();

        assert_eq!(store.get(&BlobId::new("a")).await.unwrap(), Some(vec![1]));
        assert_eq!(store.get(&BlobId::new("zz")).await.unwrap(), None);

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn blob_last_write_wins() {
        let store = MemoryBlobStore::new();
        let id = BlobId::new("kick");
        store.put(&id, vec![1]).await.unwrap();
        store.put(&id, vec![9, 9]).await.unwrap();

        assert_eq!(store.get(&id).await.unwrap(), Some(vec![9, 9]));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn record_write_replaces() {
        let store = MemoryRecordStore::with_record("library", "{}");
        store.write("library", "{\"letters\":{}}").await.unwrap();

        assert_eq!(
            store.read("library").await.unwrap().as_deref(),
            Some("{\"letters\":{}}")
        );
        assert_eq!(store.read("toggles").await.unwrap(), None);
    }
}
