//! Stepped linear fade-outs
//!
//! A fade is a fixed number of gain steps spread evenly over its duration.
//! Each step is a frame deadline on the engine clock, so the last step lands
//! exactly on `start + duration` regardless of the render block size.

use crate::types::VoiceId;

/// A fade-out in progress on one voice
#[derive(Debug, Clone)]
pub(crate) struct FadeJob {
    pub voice: VoiceId,
    start_gain: f32,
    steps: u32,
    taken: u32,
    started_at: u64,
    total_frames: u64,
}

/// What a fired step did
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FadeStep {
    /// Gain lowered, more steps to come
    Lowered(f32),
    /// Gain reached exactly zero
    Finished,
}

impl FadeJob {
    pub fn new(voice: VoiceId, start_gain: f32, steps: u32, now: u64, total_frames: u64) -> Self {
        Self {
            voice,
            start_gain,
            steps: steps.max(1),
            taken: 0,
            started_at: now,
            total_frames,
        }
    }

    /// Clock frame at which the next step is due
    pub fn due(&self) -> u64 {
        let k = u64::from(self.taken + 1);
        self.started_at + self.total_frames * k / u64::from(self.steps)
    }

    /// Take one step
    pub fn step(&mut self) -> FadeStep {
        self.taken += 1;
        if self.taken >= self.steps {
            return FadeStep::Finished;
        }
        let remaining = (self.steps - self.taken) as f32;
        FadeStep::Lowered(self.start_gain * remaining / self.steps as f32)
    }
}
