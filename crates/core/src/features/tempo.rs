use super::{energy, HOP_SIZE};

/// Search bounds for the dominant beat rate.
const MIN_BPM: f32 = 40.0;
const MAX_BPM: f32 = 208.0;

/// Envelopes whose total flux falls below this are considered beatless.
const FLUX_EPSILON: f32 = 1e-6;

/// Dominant beat rate in BPM from the autocorrelation of the
/// onset-strength envelope. `None` when the envelope is flat or the clip is
/// too short to cover the slowest period of interest.
pub(crate) fn estimate_bpm(samples: &[f32], sample_rate: u32) -> Option<f32> {
    let envelope = energy::rms_envelope(samples);
    if envelope.len() < 4 {
        return None;
    }

    // Rises in short-time energy mark onsets; falls carry no beat evidence.
    let flux: Vec<f32> = envelope
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();
    if flux.iter().sum::<f32>() <= FLUX_EPSILON {
        return None;
    }

    let envelope_rate = sample_rate as f32 / HOP_SIZE as f32;
    let lag_min = ((60.0 * envelope_rate / MAX_BPM).round() as usize).max(1);
    let lag_max =
        ((60.0 * envelope_rate / MIN_BPM).round() as usize).min(flux.len().saturating_sub(1));
    if lag_min >= lag_max {
        return None;
    }

    // Unnormalized autocorrelation: longer lags see fewer product terms, so
    // the base period wins over its multiples.
    let mut best_lag = 0usize;
    let mut best_score = 0.0f32;
    for lag in lag_min..=lag_max {
        let score: f32 = flux[lag..].iter().zip(flux.iter()).map(|(a, b)| a * b).sum();
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }
    if best_lag == 0 {
        return None;
    }
    Some(60.0 * envelope_rate / best_lag as f32)
}
