/// ID types for Sideline entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tile identifier
///
/// Assigned once when the tile is created and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// Create a tile ID from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random tile ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Blob store key
///
/// Opaque to everything except the blob store. Archive bundles key their
/// binary entries by this same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    /// Create a blob ID from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random blob ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&TileId> for BlobId {
    fn from(id: &TileId) -> Self {
        Self(id.0.clone())
    }
}

/// Key of a hydrated, decoded clip held by the playback engine
///
/// Handles are session-local: they are never persisted and become invalid
/// once the engine releases the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipHandle(u64);

impl ClipHandle {
    /// Wrap a raw handle value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tile_ids_are_distinct() {
        let a = TileId::generate();
        let b = TileId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn blob_id_from_tile_id_keeps_value() {
        let tile = TileId::new("abc");
        assert_eq!(BlobId::from(&tile).as_str(), "abc");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&TileId::new("t-1")).unwrap();
        assert_eq!(json, "\"t-1\"");
    }
}
