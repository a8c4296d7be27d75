//! Shared level meter
//!
//! One analysis window is shared by the whole session. Voices are attached
//! to it when they start; attaching twice is a no-op.

use crate::types::{LevelReading, VoiceId};
use std::collections::{HashSet, VecDeque};

/// RMS level meter over the most recent mixed frames
#[derive(Debug)]
pub struct LevelMeter {
    attached: HashSet<VoiceId>,
    window: VecDeque<(f32, f32)>,
    capacity: usize,
}

impl LevelMeter {
    /// Meter keeping the last `capacity` frames
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            attached: HashSet::new(),
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Route a voice into the meter
    ///
    /// Returns `false` if the voice was already attached.
    pub fn attach(&mut self, voice: VoiceId) -> bool {
        self.attached.insert(voice)
    }

    /// Remove a voice from the meter
    pub fn detach(&mut self, voice: VoiceId) -> bool {
        self.attached.remove(&voice)
    }

    /// Whether a voice feeds the meter
    pub fn is_attached(&self, voice: VoiceId) -> bool {
        self.attached.contains(&voice)
    }

    /// Number of attached voices
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Push interleaved stereo frames into the window
    pub fn push(&mut self, interleaved: &[f32]) {
        for frame in interleaved.chunks_exact(2) {
            if self.window.len() == self.capacity {
                self.window.pop_front();
            }
            self.window.push_back((frame[0], frame[1]));
        }
    }

    /// RMS of each channel over the window
    pub fn reading(&self) -> LevelReading {
        if self.window.is_empty() {
            return LevelReading::default();
        }
        let n = self.window.len() as f32;
        let (l, r) = self
            .window
            .iter()
            .fold((0.0_f32, 0.0_f32), |(l, r), &(a, b)| (l + a * a, r + b * b));
        LevelReading {
            left: (l / n).sqrt(),
            right: (r / n).sqrt(),
        }
    }

    /// Forget the window contents and every attachment
    pub fn clear(&mut self) {
        self.attached.clear();
        self.window.clear();
    }
}
