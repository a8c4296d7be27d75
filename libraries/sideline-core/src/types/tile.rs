/// Tile domain type
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{BlobId, ClipHandle, TileId};

/// Where a tile's audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// Clip bytes live in the blob store
    LocalFile,

    /// Track is played by an external streaming provider
    Remote,
}

/// One playable entry of the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Unique tile identifier
    pub id: TileId,

    /// Display title
    pub title: String,

    /// Local clip or remote reference
    pub source_kind: SourceKind,

    /// Blob store key, present iff `source_kind` is `LocalFile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_ref: Option<BlobId>,

    /// Provider reference, present iff `source_kind` is `Remote`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ref: Option<String>,

    /// Display colour hint (CSS `hsl(...)` string)
    pub color: String,

    /// Playback start position in seconds
    #[serde(default)]
    pub start_offset_seconds: f64,

    /// Linear gain in `0.0..=1.0`
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Set when hydration could not resolve the blob
    #[serde(default)]
    pub inactive: bool,

    /// Decoded clip, present only after successful hydration
    #[serde(skip)]
    pub resolved: Option<ClipHandle>,
}

fn default_volume() -> f32 {
    1.0
}

impl Tile {
    /// Create a local-file tile from the name of the imported file
    ///
    /// The title is the file name without its last extension. The blob
    /// reference reuses the tile ID, so the bytes must be stored under
    /// `tile.blob_ref` before hydration.
    pub fn local_file(file_name: &str) -> Self {
        let id = TileId::generate();
        let blob = BlobId::from(&id);
        Self {
            id,
            title: title_from_file_name(file_name),
            source_kind: SourceKind::LocalFile,
            blob_ref: Some(blob),
            remote_ref: None,
            color: random_color(),
            start_offset_seconds: 0.0,
            volume: default_volume(),
            inactive: false,
            resolved: None,
        }
    }

    /// Create a remote tile delegating playback to a streaming provider
    pub fn remote(title: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            id: TileId::generate(),
            title: title.into(),
            source_kind: SourceKind::Remote,
            blob_ref: None,
            remote_ref: Some(reference.into()),
            color: random_color(),
            start_offset_seconds: 0.0,
            volume: default_volume(),
            inactive: false,
            resolved: None,
        }
    }

    /// Set the start offset (negative and non-finite values become 0)
    pub fn with_start_offset(mut self, seconds: f64) -> Self {
        self.start_offset_seconds = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Set the gain, clamped to `0.0..=1.0`
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            default_volume()
        };
        self
    }

    /// Whether this tile's bytes must be resolved through the blob store
    pub fn needs_hydration(&self) -> bool {
        self.source_kind == SourceKind::LocalFile && self.resolved.is_none()
    }
}

/// Metadata for a tile about to be added to the active category
#[derive(Debug, Clone)]
pub enum NewTile {
    /// An imported audio file
    LocalFile {
        /// Original file name, used to derive the title
        file_name: String,
        /// Raw file bytes, stored in the blob store
        bytes: Vec<u8>,
    },

    /// A reference to a streaming provider's track
    Remote {
        /// Display title
        title: String,
        /// Provider-specific reference (URI, catalog ID, ...)
        reference: String,
    },
}

/// Strip the last extension from a file name
///
/// Dot-files and names without an extension are returned unchanged.
pub(crate) fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name[..idx].to_string(),
        _ => file_name.to_string(),
    }
}

fn random_color() -> String {
    let hue: u16 = rand::thread_rng().gen_range(0..360);
    format!("hsl({hue},70%,50%)")
}
