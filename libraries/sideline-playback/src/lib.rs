//! Sideline - Playback Engine
//!
//! Multi-voice clip mixer for the soundboard.
//!
//! This crate provides:
//! - Clip decoding (Symphonia) into fully buffered stereo clips
//! - Ownership of hydrated clips behind [`ClipHandle`](sideline_core::ClipHandle)s
//! - Single and multi play, looping, start offsets, per-tile gain
//! - Stepped linear fade-outs and auto-fade policies
//! - Temporary rate boost ("rapid") with an independent restore
//! - A shared level meter and periodic progress reports
//!
//! # Architecture
//!
//! The engine has no audio backend of its own. A platform pulls samples
//! through [`PlaybackEngine::process_audio`]; headless drivers call
//! [`PlaybackEngine::advance`] instead. Timers live on the sample clock, so
//! behavior is identical whichever drives it.
//!
//! # Example
//!
//! ```rust
//! use sideline_core::{Tile, Toggles};
//! use sideline_playback::{DecodedClip, PlaybackEngine};
//! use std::time::Duration;
//!
//! let mut engine = PlaybackEngine::default();
//! let mut tile = Tile::local_file("airhorn.wav");
//! tile.resolved = Some(engine.register_clip(DecodedClip::from_mono(&[0.2; 48_000], 48_000)));
//!
//! let voice = engine.play(&tile, &Toggles::default()).voice();
//! assert!(voice.is_some());
//!
//! engine.advance(Duration::from_millis(250));
//! assert_eq!(engine.progress().elapsed_label(), "00:00");
//!
//! engine.stop_all();
//! assert_eq!(engine.active_count(), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clip;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod events;
mod fade;
pub mod meter;
pub mod registry;
pub mod types;
pub mod voice;

pub use clip::DecodedClip;
pub use decoder::{ClipDecoder, SymphoniaClipDecoder};
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::EngineEvent;
pub use meter::LevelMeter;
pub use registry::ClipRegistry;
pub use types::{
    format_clock, EngineSettings, LevelReading, PlayOutcome, ProgressReport, VoiceId, VoiceState,
    UNKNOWN_TIME,
};
pub use voice::Voice;
