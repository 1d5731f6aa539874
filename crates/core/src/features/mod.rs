//! Acoustic feature extraction over fixed overlapping frames.
//!
//! Every feature degrades to its default independently: a failed
//! sub-computation zeroes its own field and extraction continues, so the
//! extractor as a whole never fails.

mod energy;
mod pitch;
mod spectral;
mod tempo;
mod temporal;

use serde::{Deserialize, Serialize};

/// Analysis frame length in samples (~64ms at 16kHz).
pub(crate) const FRAME_SIZE: usize = 1024;

/// Hop between frames (50% overlap).
pub(crate) const HOP_SIZE: usize = 512;

/// Named acoustic features for one clip.
///
/// Fields that could not be computed hold 0.0. For `pitch_mean` and `tempo`
/// a zero reads as "undetermined", not as a measured zero.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    pub energy: f32,
    pub pitch_mean: f32,
    pub pitch_std: f32,
    pub tempo: f32,
    pub spectral_centroid: f32,
    pub zero_crossing_rate: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the full vector from a decoded mono signal.
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> FeatureVector {
        if samples.is_empty() || sample_rate == 0 {
            return FeatureVector::default();
        }
        let (pitch_mean, pitch_std) =
            pitch::voiced_stats(samples, sample_rate).unwrap_or((0.0, 0.0));
        FeatureVector {
            energy: energy::mean_rms(samples),
            pitch_mean,
            pitch_std,
            tempo: tempo::estimate_bpm(samples, sample_rate).unwrap_or(0.0),
            spectral_centroid: spectral::mean_centroid(samples, sample_rate).unwrap_or(0.0),
            zero_crossing_rate: temporal::zero_crossing_rate(samples),
        }
    }
}

/// Overlapping analysis frames; clips shorter than one frame are analyzed
/// as a single frame.
pub(crate) fn frames(samples: &[f32]) -> Box<dyn Iterator<Item = &[f32]> + '_> {
    if samples.len() < FRAME_SIZE {
        Box::new(std::iter::once(samples))
    } else {
        Box::new(samples.windows(FRAME_SIZE).step_by(HOP_SIZE))
    }
}
