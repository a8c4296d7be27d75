//! Engine events
//!
//! The engine never calls back into the presentation layer. It buffers what
//! happened and the driver drains the buffer after each render or command.

use crate::types::{LevelReading, ProgressReport, VoiceId};
use sideline_core::{ClipHandle, TileId};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A local voice started and took focus
    VoiceStarted {
        /// New voice
        voice: VoiceId,
        /// Tile it plays
        tile: TileId,
    },

    /// A voice reached the end of its clip
    VoiceEnded {
        /// Finished voice
        voice: VoiceId,
        /// Tile it played
        tile: TileId,
    },

    /// Every active voice was stopped
    VoicesStopped {
        /// How many voices were active
        count: usize,
    },

    /// A remote tile was handed to the provider
    RemoteDelegated {
        /// Delegated tile
        tile: TileId,
    },

    /// A fade reached zero gain and paused its voice
    FadeCompleted {
        /// Faded voice
        voice: VoiceId,
    },

    /// Playback rate of a voice changed
    RateChanged {
        /// Affected voice
        voice: VoiceId,
        /// New rate
        rate: f32,
    },

    /// Periodic progress of the focused voice
    Progress(ProgressReport),

    /// Periodic level of the mixed signal
    Level(LevelReading),

    /// A clip was released and its voices stopped
    ClipReleased {
        /// Released handle
        handle: ClipHandle,
    },
}
