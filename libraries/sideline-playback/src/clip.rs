//! Decoded clip data
//!
//! Soundboard clips are short, so hydration decodes them fully into memory.
//! Samples are interleaved stereo f32 in [-1.0, 1.0].

use std::time::Duration;

/// Fully decoded clip, shared by every voice playing it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedClip {
    /// Wrap interleaved stereo samples
    ///
    /// A trailing half frame is dropped.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32) -> Self {
        if samples.len() % 2 != 0 {
            samples.pop();
        }
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duplicate mono samples into both channels
    pub fn from_mono(samples: &[f32], sample_rate: u32) -> Self {
        let stereo = samples.iter().flat_map(|&s| [s, s]).collect();
        Self::new(stereo, sample_rate)
    }

    /// Native sample rate of the clip
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Clip length, `None` when it cannot be determined
    pub fn duration(&self) -> Option<Duration> {
        if self.sample_rate == 0 || self.frames() == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.frames() as f64 / f64::from(self.sample_rate),
        ))
    }

    /// Samples of one frame; silence past the end
    #[inline]
    pub fn frame(&self, index: usize) -> (f32, f32) {
        match self.samples.get(index * 2..index * 2 + 2) {
            Some(pair) => (pair[0], pair[1]),
            None => (0.0, 0.0),
        }
    }

    /// Linearly interpolated frame at a fractional position
    #[inline]
    pub fn frame_at(&self, position: f64) -> (f32, f32) {
        let index = position.floor() as usize;
        let frac = (position - position.floor()) as f32;
        let (l0, r0) = self.frame(index);
        if frac == 0.0 || index + 1 >= self.frames() {
            return (l0, r0);
        }
        let (l1, r1) = self.frame(index + 1);
        (l0 + (l1 - l0) * frac, r0 + (r1 - r0) * frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_sample_count_is_truncated() {
        let clip = DecodedClip::new(vec![0.1, 0.2, 0.3], 8000);
        assert_eq!(clip.frames(), 1);
        assert_eq!(clip.frame(0), (0.1, 0.2));
        assert_eq!(clip.frame(1), (0.0, 0.0));
    }

    #[test]
    fn duration_from_frames() {
        let clip = DecodedClip::from_mono(&vec![0.0; 44_100], 44_100);
        assert_eq!(clip.duration(), Some(Duration::from_secs(1)));
        assert_eq!(DecodedClip::new(Vec::new(), 44_100).duration(), None);
    }

    #[test]
    fn interpolates_between_frames() {
        let clip = DecodedClip::from_mono(&[0.0, 1.0], 8000);
        let (l, r) = clip.frame_at(0.25);
        assert!((l - 0.25).abs() < 1e-6);
        assert!((r - 0.25).abs() < 1e-6);
        assert_eq!(clip.frame_at(1.5), (1.0, 1.0));
    }
}
