/// Clip decoder implementation using Symphonia
use crate::clip::DecodedClip;
use crate::error::{PlaybackError, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Turns stored clip bytes into playable audio
///
/// Hydration runs decoders off the command path, so implementations must be
/// shareable across tasks.
pub trait ClipDecoder: Send + Sync {
    /// Decode a complete in-memory file
    fn decode(&self, bytes: Vec<u8>) -> Result<DecodedClip>;
}

/// Decoder using Symphonia
///
/// Supports: WAV, MP3, FLAC, OGG/Vorbis, AAC/MP4. The container is detected
/// by probing, since blobs carry no file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaClipDecoder;

impl SymphoniaClipDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

impl ClipDecoder for SymphoniaClipDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<DecodedClip> {
        let mss = MediaSourceStream::new(
            Box::new(Cursor::new(bytes)),
            MediaSourceStreamOptions::default(),
        );

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::Decode(format!("Failed to probe clip: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| PlaybackError::Decode("No audio tracks found".to_string()))?;
        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(PlaybackError::Decode(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    append_as_stereo(buffer.samples(), channels, &mut samples);
                }
                // Corrupt packets are skipped, matching player behavior
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!(error = msg, "skipping undecodable packet");
                }
                Err(e) => return Err(PlaybackError::Decode(e.to_string())),
            }
        }

        if samples.is_empty() {
            return Err(PlaybackError::EmptyClip);
        }

        let clip = DecodedClip::new(samples, sample_rate);
        debug!(frames = clip.frames(), sample_rate, "decoded clip");
        Ok(clip)
    }
}

/// Append interleaved samples as stereo
///
/// Mono is duplicated; channels beyond the first two are dropped.
fn append_as_stereo(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    match channels {
        0 => {}
        1 => out.extend(interleaved.iter().flat_map(|&s| {
            let s = s.clamp(-1.0, 1.0);
            [s, s]
        })),
        _ => {
            for frame in interleaved.chunks_exact(channels) {
                out.push(frame[0].clamp(-1.0, 1.0));
                out.push(frame[1].clamp(-1.0, 1.0));
            }
        }
    }
}
