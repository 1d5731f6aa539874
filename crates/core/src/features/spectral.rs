use super::{FRAME_SIZE, HOP_SIZE};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Frames whose total spectral magnitude falls below this are skipped.
const SILENCE_EPSILON: f32 = 1e-6;

/// Mean across frames of the amplitude-weighted mean frequency of the
/// short-time spectrum. `None` when every frame is near-silent.
pub(crate) fn mean_centroid(samples: &[f32], sample_rate: u32) -> Option<f32> {
    if samples.is_empty() || sample_rate == 0 {
        return None;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);
    let bin_hz = sample_rate as f32 / FRAME_SIZE as f32;

    let mut sum = 0.0f32;
    let mut contributing = 0usize;
    let mut start = 0usize;
    loop {
        let end = (start + FRAME_SIZE).min(samples.len());
        let frame = &samples[start..end];

        // Hann window against spectral leakage; short final frames are
        // zero-padded up to the FFT size.
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .enumerate()
            .map(|(i, &s)| Complex::new(s * hann(i, frame.len()), 0.0))
            .collect();
        buffer.resize(FRAME_SIZE, Complex::new(0.0, 0.0));
        fft.process(&mut buffer);

        let mut weighted = 0.0f32;
        let mut total = 0.0f32;
        for (bin, value) in buffer.iter().take(FRAME_SIZE / 2).enumerate() {
            let magnitude = value.norm();
            weighted += bin as f32 * bin_hz * magnitude;
            total += magnitude;
        }
        if total > SILENCE_EPSILON {
            sum += weighted / total;
            contributing += 1;
        }

        if end == samples.len() {
            break;
        }
        start += HOP_SIZE;
    }

    (contributing > 0).then(|| sum / contributing as f32)
}

fn hann(i: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }
    0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos()
}
