//! Storage and provider seams
//!
//! The library and hydration layers only talk to persistence through these
//! traits, so the SQLite backend and the in-memory backend are interchangeable.

use crate::error::Result;
use crate::types::BlobId;
use async_trait::async_trait;

/// Binary store for audio clip bytes
///
/// Entries are independent of the library record. Tiles reference them
/// weakly through `Tile::blob_ref`, so removing a blob never removes a tile.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `id` (last write wins)
    async fn put(&self, id: &BlobId, bytes: Vec<u8>) -> Result<()>;

    /// Fetch bytes for `id`, `Ok(None)` if no such blob exists
    async fn get(&self, id: &BlobId) -> Result<Option<Vec<u8>>>;

    /// Enumerate every stored blob, ordered by id
    async fn list(&self) -> Result<Vec<(BlobId, Vec<u8>)>>;
}

/// Durable key/value store for serialized records
///
/// The library record and the toggle flags each live under their own key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the raw record stored under `key`
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the record stored under `key`
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Streaming provider that plays remote tiles
///
/// The engine knows nothing about the provider's transport or
/// authentication; it only hands over the reference and start offset.
pub trait RemoteProvider: Send + Sync {
    /// Start playback of `reference` at `start_offset_seconds`
    fn play(&self, reference: &str, start_offset_seconds: f64) -> Result<()>;
}
