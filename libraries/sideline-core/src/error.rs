/// Core error types for Sideline
use thiserror::Error;

use crate::types::{BlobId, TileId};

/// Result type alias using `SidelineError`
pub type Result<T> = std::result::Result<T, SidelineError>;

/// Core error type for Sideline
#[derive(Error, Debug)]
pub enum SidelineError {
    /// A tile was added while no category is selected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Hydration could not find the bytes behind a tile's blob reference
    #[error("Blob {blob} missing for tile {tile}")]
    BlobMissing {
        /// Tile whose hydration failed
        tile: TileId,
        /// Blob reference that could not be resolved
        blob: BlobId,
    },

    /// No tile title matched a search query
    #[error("No tile matches \"{0}\"")]
    SearchMiss(String),

    /// Storage-related errors (record or blob persistence)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored bytes could not be decoded into audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// Remote provider rejected a delegated play
    #[error("Remote provider error: {0}")]
    Remote(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SidelineError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a remote provider error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
