//! Sideline Core
//!
//! Platform-agnostic core types, traits, and error handling for the Sideline
//! soundboard.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Library`, `Tile`, `Letter`, `Selection`, `Toggles`
//! - **Core Traits**: `BlobStore`, `RecordStore`, `RemoteProvider`
//! - **Error Handling**: Unified `SidelineError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use sideline_core::types::{Letter, Library, Tile};
//!
//! let mut library = Library::new();
//! library
//!     .bucket_mut(Letter::A)
//!     .categories
//!     .insert("Basketball".to_string(), vec![Tile::local_file("buzzer.wav")]);
//!
//! let hit = library.find_title("BUZZ").expect("title should match");
//! assert_eq!(hit.category, "Basketball");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SidelineError};
pub use traits::{BlobStore, RecordStore, RemoteProvider};

pub use types::{
    BlobId, ClipHandle, Letter, LetterBucket, Library, LibraryRecord, NewTile, Selection,
    SourceKind, Tile, TileId, TileLocation, ToggleFlag, Toggles,
};
