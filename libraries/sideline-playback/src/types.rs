//! Core types for the playback engine

use std::fmt;
use std::time::Duration;

/// Identifier of one playing instance of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub(crate) u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// Lifecycle of a voice
///
/// `Idle → Playing → {Paused ⇄ Playing} → Ended/Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Created, not started yet
    Idle,

    /// Producing audio
    Playing,

    /// Holding position, producing silence
    Paused,

    /// Reached the end of a non-looping clip
    Ended,

    /// Stopped by a command or a released clip
    Stopped,
}

/// Result of asking the engine to play a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new local voice started and is now focused
    Started(VoiceId),

    /// Playback was handed to the remote provider
    Delegated,

    /// Nothing happened (inactive, unresolved, or no provider)
    Skipped,
}

impl PlayOutcome {
    /// Voice started by this play, if any
    pub fn voice(self) -> Option<VoiceId> {
        match self {
            PlayOutcome::Started(id) => Some(id),
            PlayOutcome::Delegated | PlayOutcome::Skipped => None,
        }
    }
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Number of gain steps in a fade-out
    pub fade_steps: u32,

    /// Interval between level/progress samples
    pub meter_interval: Duration,

    /// Frames kept by the level meter's analysis window
    pub meter_window_frames: usize,

    /// Fade applied to the previous voice when a new one starts
    pub autofade_on_play: Duration,

    /// Fade applied to the remaining voice when another one ends
    pub autofade_on_end: Duration,

    /// Playback rate while "rapid" is engaged
    pub rapid_rate: f32,

    /// How long "rapid" lasts before the rate is restored
    pub rapid_window: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            fade_steps: 20,
            meter_interval: Duration::from_millis(100),
            meter_window_frames: 2048,
            autofade_on_play: Duration::from_millis(1500),
            autofade_on_end: Duration::from_millis(2000),
            rapid_rate: 2.0,
            rapid_window: Duration::from_secs(3),
        }
    }
}

impl EngineSettings {
    /// Convert a duration to output frames (rounded)
    pub(crate) fn frames(&self, duration: Duration) -> u64 {
        (duration.as_secs_f64() * f64::from(self.sample_rate)).round() as u64
    }
}

/// Sentinel shown when remaining time is unknown
pub const UNKNOWN_TIME: &str = "--:--";

/// Elapsed/remaining time of the focused voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    /// Time played since the clip start
    pub elapsed: Duration,

    /// Clip duration, `None` when unknown
    pub duration: Option<Duration>,
}

impl ProgressReport {
    /// Neutral report shown when nothing is playing
    pub fn idle() -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: None,
        }
    }

    /// Remaining time, `None` when the duration is unknown
    pub fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|total| total.saturating_sub(self.elapsed))
    }

    /// Completion percentage in `0.0..=100.0`, `None` when the duration is unknown
    pub fn percent(&self) -> Option<f32> {
        self.duration.filter(|d| !d.is_zero()).map(|total| {
            ((self.elapsed.as_secs_f64() / total.as_secs_f64()) * 100.0).clamp(0.0, 100.0) as f32
        })
    }

    /// Elapsed time as `MM:SS`
    pub fn elapsed_label(&self) -> String {
        format_clock(self.elapsed.as_secs_f64())
    }

    /// Remaining time as `MM:SS`, or the unknown sentinel
    pub fn remaining_label(&self) -> String {
        self.remaining()
            .map_or_else(|| UNKNOWN_TIME.to_string(), |r| format_clock(r.as_secs_f64()))
    }
}

/// Stereo level estimate of the mixed signal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelReading {
    /// Left channel RMS
    pub left: f32,
    /// Right channel RMS
    pub right: f32,
}

/// Format seconds as `MM:SS`
///
/// Non-finite or negative input yields the unknown sentinel.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return UNKNOWN_TIME.to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
