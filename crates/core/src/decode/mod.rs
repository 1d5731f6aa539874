use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Undecoded audio as handed in by the caller: raw container bytes plus an
/// optional file-extension hint for format probing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioInput {
    pub bytes: Bytes,
    pub extension_hint: Option<String>,
}

/// A decoded mono clip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmClip {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::from_secs(0);
        }
        let micros =
            (self.samples.len() as u128 * 1_000_000u128) / u128::from(self.sample_rate);
        Duration::from_micros(micros.min(u128::from(u64::MAX)) as u64)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("unsupported or unrecognized container: {0}")]
    Unsupported(String),

    #[error("no decodable audio track")]
    NoAudioTrack,

    #[error("decode failed: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

pub trait AudioDecoder: Send + Sync {
    fn decode_clip(&self, input: AudioInput) -> BoxFuture<'_, Result<PcmClip>>;
}

/// In-process decoder over symphonia's probe and codec registries.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaAudioDecoder;

impl SymphoniaAudioDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_all(input: AudioInput) -> Result<PcmClip> {
        let source = Cursor::new(input.bytes.to_vec());
        let stream = MediaSourceStream::new(Box::new(source), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = &input.extension_hint {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut sample_rate = 0u32;
        let mut channels = 0u16;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stopping at unreadable packet");
                    break;
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    if sample_buf.is_none() {
                        let spec = *decoded.spec();
                        sample_rate = spec.rate;
                        channels = spec.channels.count() as u16;
                        sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                    }
                    if let Some(buf) = &mut sample_buf {
                        buf.copy_interleaved_ref(decoded);
                        interleaved.extend_from_slice(buf.samples());
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // Recoverable: skip the corrupt packet and keep going.
                    tracing::warn!(error = %e, "skipping undecodable packet");
                }
                Err(e) => return Err(DecodeError::Malformed(e.to_string())),
            }
        }

        if sample_rate == 0 || channels == 0 {
            return Err(DecodeError::NoAudioTrack);
        }

        Ok(PcmClip {
            samples: downmix_to_mono(&interleaved, channels),
            sample_rate,
        })
    }
}

impl AudioDecoder for SymphoniaAudioDecoder {
    fn decode_clip(&self, input: AudioInput) -> BoxFuture<'_, Result<PcmClip>> {
        async move { Self::decode_all(input) }.boxed()
    }
}

/// Average interleaved channels down to one.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels == 0 {
        return Vec::new();
    }
    if channels == 1 {
        return interleaved.to_vec();
    }
    let step = usize::from(channels);
    interleaved
        .chunks_exact(step)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 16-bit PCM mono WAV container around the given samples.
    fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Bytes {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        Bytes::from(out)
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        let mono = downmix_to_mono(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn downmix_passes_mono_through() {
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
        assert!(downmix_to_mono(&[0.1, 0.2], 0).is_empty());
    }

    #[test]
    fn duration_counts_mono_samples() {
        let clip = PcmClip {
            samples: vec![0.0; 16_000],
            sample_rate: 16_000,
        };
        assert_eq!(clip.duration(), Duration::from_secs(1));
        let empty = PcmClip {
            samples: Vec::new(),
            sample_rate: 0,
        };
        assert_eq!(empty.duration(), Duration::from_secs(0));
    }

    #[test]
    fn wav_round_trip_decodes_mono_pcm() {
        let samples: Vec<i16> = (0..256).map(|i| if i % 2 == 0 { 16_384 } else { -16_384 }).collect();
        let input = AudioInput {
            bytes: wav_bytes(16_000, &samples),
            extension_hint: Some("wav".to_owned()),
        };
        let clip = futures::executor::block_on(SymphoniaAudioDecoder::new().decode_clip(input))
            .expect("decodes");
        assert_eq!(clip.sample_rate, 16_000);
        assert_eq!(clip.samples.len(), 256);
        assert!((clip.samples[0] - 0.5).abs() < 1e-3, "sample {}", clip.samples[0]);
        assert!((clip.samples[1] + 0.5).abs() < 1e-3, "sample {}", clip.samples[1]);
    }

    #[test]
    fn garbage_bytes_are_rejected_not_panicked() {
        let input = AudioInput {
            bytes: Bytes::from_static(b"definitely not audio"),
            extension_hint: None,
        };
        let result = futures::executor::block_on(SymphoniaAudioDecoder::new().decode_clip(input));
        assert!(result.is_err());
    }
}
