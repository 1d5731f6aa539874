use super::{frames, FRAME_SIZE, HOP_SIZE};

/// Mean of the short-time RMS amplitude across frames.
pub(crate) fn mean_rms(samples: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for frame in frames(samples) {
        sum += rms(frame);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Short-time RMS series over full frames only; the onset envelope input
/// for tempo estimation.
pub(crate) fn rms_envelope(samples: &[f32]) -> Vec<f32> {
    if samples.len() < FRAME_SIZE {
        return Vec::new();
    }
    samples
        .windows(FRAME_SIZE)
        .step_by(HOP_SIZE)
        .map(rms)
        .collect()
}

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let power = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    power.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testsignal;

    #[test]
    fn silence_has_zero_energy() {
        assert_eq!(mean_rms(&vec![0.0; 8000]), 0.0);
        assert_eq!(mean_rms(&[]), 0.0);
    }

    #[test]
    fn sine_energy_matches_analytic_rms() {
        // RMS of a sine with amplitude 0.5 is 0.5 / sqrt(2).
        let samples = testsignal::sine(220.0, 16_000, 500);
        let energy = mean_rms(&samples);
        assert!((energy - 0.3535).abs() < 0.02, "energy {energy}");
    }

    #[test]
    fn short_clip_is_one_frame() {
        let energy = mean_rms(&[0.5; 100]);
        assert!((energy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn envelope_is_empty_below_one_frame() {
        assert!(rms_envelope(&[0.1; 1023]).is_empty());
        assert_eq!(rms_envelope(&[0.0; 2048]).len(), 3);
    }
}
