//! Error types for the playback engine

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Stored bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decoded stream contained no audio frames
    #[error("Clip contains no audio")]
    EmptyClip,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<PlaybackError> for sideline_core::SidelineError {
    fn from(err: PlaybackError) -> Self {
        sideline_core::SidelineError::decode(err.to_string())
    }
}
