//! Time-domain descriptors: zero-crossing rate and RMS energy

use crate::transform::{num_frames, HOP_LENGTH, N_FFT};

/// Magnitudes at or below this count as zero, and zero counts as positive
const ZERO_THRESHOLD: f32 = 1e-10;

/// Mean over centered frames of the fraction of sign changes per frame.
///
/// Frames are padded by repeating the edge samples.
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let pad = N_FFT / 2;
    let first = samples[0];
    let last = samples[samples.len() - 1];
    let padded: Vec<f32> = std::iter::repeat(first)
        .take(pad)
        .chain(samples.iter().copied())
        .chain(std::iter::repeat(last).take(pad))
        .collect();

    let negative: Vec<bool> = padded.iter().map(|&x| x < -ZERO_THRESHOLD).collect();

    let frames = num_frames(samples.len());
    let total: f64 = (0..frames)
        .map(|frame_idx| {
            let frame = &negative[frame_idx * HOP_LENGTH..frame_idx * HOP_LENGTH + N_FFT];
            let crossings = frame.windows(2).filter(|w| w[0] != w[1]).count();
            crossings as f64 / N_FFT as f64
        })
        .sum();

    (total / frames as f64) as f32
}

/// Mean over centered, zero-padded frames of the per-frame RMS amplitude
pub fn rms(samples: &[f32]) -> f32 {
    let pad = N_FFT / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let frames = num_frames(samples.len());
    let total: f64 = (0..frames)
        .map(|frame_idx| {
            let frame = &padded[frame_idx * HOP_LENGTH..frame_idx * HOP_LENGTH + N_FFT];
            let energy: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
            (energy / N_FFT as f64).sqrt()
        })
        .sum();

    (total / frames as f64) as f32
}
