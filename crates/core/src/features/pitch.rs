use super::{FRAME_SIZE, HOP_SIZE};
use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

/// Human vocal range bounds in Hz; per-frame estimates outside are treated
/// as unvoiced.
const MIN_PITCH_HZ: f32 = 50.0;
const MAX_PITCH_HZ: f32 = 500.0;

const POWER_THRESHOLD: f32 = 0.8;
const CLARITY_THRESHOLD: f32 = 0.5;

/// Mean and population standard deviation of per-frame F0 over voiced
/// frames. `None` when no frame carries a detectable pitch.
pub(crate) fn voiced_stats(samples: &[f32], sample_rate: u32) -> Option<(f32, f32)> {
    if samples.len() < FRAME_SIZE || sample_rate == 0 {
        return None;
    }

    let mut detector = McLeodDetector::new(FRAME_SIZE, FRAME_SIZE / 2);
    let mut pitches = Vec::new();
    let mut start = 0usize;
    while start + FRAME_SIZE <= samples.len() {
        let frame = &samples[start..start + FRAME_SIZE];
        if let Some(pitch) = detector.get_pitch(
            frame,
            sample_rate as usize,
            POWER_THRESHOLD,
            CLARITY_THRESHOLD,
        ) {
            if (MIN_PITCH_HZ..=MAX_PITCH_HZ).contains(&pitch.frequency) {
                pitches.push(pitch.frequency);
            }
        }
        start += HOP_SIZE;
    }

    if pitches.is_empty() {
        return None;
    }
    let mean = pitches.iter().sum::<f32>() / pitches.len() as f32;
    let variance =
        pitches.iter().map(|p| (p - mean).powi(2)).sum::<f32>() / pitches.len() as f32;
    Some((mean, variance.sqrt()))
}
