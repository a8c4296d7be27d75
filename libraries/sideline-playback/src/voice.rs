//! One playing instance of a clip

use crate::clip::DecodedClip;
use crate::types::{ProgressReport, VoiceId, VoiceState};
use sideline_core::{ClipHandle, TileId};
use std::sync::Arc;
use std::time::Duration;

/// A clip being played
#[derive(Debug)]
pub struct Voice {
    pub(crate) id: VoiceId,
    pub(crate) tile: TileId,
    pub(crate) handle: ClipHandle,
    clip: Arc<DecodedClip>,
    /// Read position in clip frames
    position: f64,
    /// Cue point in clip frames
    start_frame: f64,
    pub(crate) gain: f32,
    pub(crate) rate: f32,
    looping: bool,
    /// Whether ending should fade out the remaining voice
    pub(crate) auto_fade_on_end: bool,
    pub(crate) state: VoiceState,
    /// Clip frames advanced per output frame at rate 1.0
    step: f64,
}

/// Per-play options, captured from the toggles when the voice starts
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoiceOptions {
    pub gain: f32,
    pub looping: bool,
    pub auto_fade_on_end: bool,
    pub start_offset_seconds: f64,
}

impl Voice {
    pub(crate) fn new(
        id: VoiceId,
        tile: TileId,
        handle: ClipHandle,
        clip: Arc<DecodedClip>,
        output_rate: u32,
        options: VoiceOptions,
    ) -> Self {
        let step = if output_rate == 0 {
            1.0
        } else {
            f64::from(clip.sample_rate()) / f64::from(output_rate)
        };

        let requested = options.start_offset_seconds * f64::from(clip.sample_rate());
        let in_range = requested.is_finite() && requested >= 0.0 && requested < clip.frames() as f64;
        let start_frame = if in_range {
            requested
        } else {
            if options.start_offset_seconds > 0.0 {
                tracing::warn!(
                    tile = %tile,
                    offset = options.start_offset_seconds,
                    "start offset past end of clip, starting from 0"
                );
            }
            0.0
        };

        Self {
            id,
            tile,
            handle,
            clip,
            position: start_frame,
            start_frame,
            gain: options.gain,
            rate: 1.0,
            looping: options.looping,
            auto_fade_on_end: options.auto_fade_on_end,
            state: VoiceState::Idle,
            step,
        }
    }

    /// Voice ID
    pub fn id(&self) -> VoiceId {
        self.id
    }

    /// Tile being played
    pub fn tile(&self) -> &TileId {
        &self.tile
    }

    /// Current lifecycle state
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Current linear gain
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Current playback rate
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Whether the voice loops
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub(crate) fn start(&mut self) {
        if self.state == VoiceState::Idle {
            self.state = VoiceState::Playing;
        }
    }

    /// Flip Playing ⇄ Paused; returns whether the voice is now paused
    pub(crate) fn toggle_pause(&mut self) -> bool {
        match self.state {
            VoiceState::Playing => self.state = VoiceState::Paused,
            VoiceState::Paused => self.state = VoiceState::Playing,
            _ => {}
        }
        self.state == VoiceState::Paused
    }

    pub(crate) fn pause(&mut self) {
        if self.state == VoiceState::Playing {
            self.state = VoiceState::Paused;
        }
    }

    /// Pause and rewind to the clip start
    pub(crate) fn stop(&mut self) {
        self.state = VoiceState::Stopped;
        self.position = 0.0;
    }

    /// Seek back to the tile's start offset
    pub(crate) fn cue(&mut self) {
        self.position = self.start_frame;
    }

    pub(crate) fn is_finished(&self) -> bool {
        matches!(self.state, VoiceState::Ended | VoiceState::Stopped)
    }

    /// Position within the clip
    pub fn elapsed(&self) -> Duration {
        if self.clip.sample_rate() == 0 {
            return Duration::ZERO;
        }
        let nanos = self.position.max(0.0) * 1e9 / f64::from(self.clip.sample_rate());
        Duration::from_nanos(nanos.round() as u64)
    }

    pub(crate) fn progress(&self) -> ProgressReport {
        ProgressReport {
            elapsed: self.elapsed(),
            duration: self.clip.duration(),
        }
    }

    /// Mix this voice into interleaved stereo buffers
    ///
    /// `out` always receives the voice; `tap` receives it too when the voice
    /// is attached to the meter.
    pub(crate) fn render(&mut self, out: &mut [f32], mut tap: Option<&mut [f32]>) {
        if self.state != VoiceState::Playing {
            return;
        }

        let frames = self.clip.frames() as f64;
        let advance = self.step * f64::from(self.rate);

        for (i, frame) in out.chunks_exact_mut(2).enumerate() {
            if self.position >= frames {
                if self.looping && frames > 0.0 {
                    self.position %= frames;
                } else {
                    self.state = VoiceState::Ended;
                    return;
                }
            }

            let (l, r) = self.clip.frame_at(self.position);
            let (l, r) = (l * self.gain, r * self.gain);
            frame[0] += l;
            frame[1] += r;
            if let Some(tap) = tap.as_deref_mut() {
                tap[i * 2] += l;
                tap[i * 2 + 1] += r;
            }

            self.position += advance;
        }

        if self.position >= frames && !self.looping {
            self.state = VoiceState::Ended;
        }
    }
}
