//! Phase-vocoder time scaling in the STFT domain

use crate::transform::{Spectrogram, HOP_LENGTH, N_FFT};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Resample a spectrogram along time by `rate` (> 1 is faster/shorter).
///
/// Magnitudes are linearly interpolated between neighbouring frames; phases
/// are accumulated from the measured per-bin phase advance so partials stay
/// coherent.
pub fn phase_vocoder(spectrogram: &Spectrogram, rate: f64) -> Spectrogram {
    let num_frames = spectrogram.num_frames;
    let num_bins = spectrogram.num_bins;
    if num_frames == 0 {
        return Spectrogram::new(Vec::new());
    }

    // Expected phase advance per hop for each bin
    let phi_advance: Vec<f64> = (0..num_bins)
        .map(|k| 2.0 * PI * HOP_LENGTH as f64 * k as f64 / N_FFT as f64)
        .collect();

    let zero = vec![Complex::new(0.0f32, 0.0); num_bins];

    let mut phase_acc: Vec<f64> = spectrogram.frames[0]
        .iter()
        .map(|c| c.arg() as f64)
        .collect();

    let output_frames = (num_frames as f64 / rate).ceil() as usize;
    let mut frames = Vec::with_capacity(output_frames);

    for step in (0..output_frames).map(|t| t as f64 * rate) {
        if step >= num_frames as f64 {
            break;
        }
        let left = column(spectrogram, &zero, step as usize);
        let right = column(spectrogram, &zero, step as usize + 1);
        let alpha = step.fract();

        let mut frame = Vec::with_capacity(num_bins);
        for k in 0..num_bins {
            let mag = (1.0 - alpha) * left[k].norm() as f64 + alpha * right[k].norm() as f64;
            frame.push(Complex::from_polar(mag as f32, phase_acc[k] as f32));

            let mut dphase = right[k].arg() as f64 - left[k].arg() as f64 - phi_advance[k];
            dphase -= 2.0 * PI * (dphase / (2.0 * PI)).round();
            phase_acc[k] = (phase_acc[k] + phi_advance[k] + dphase).rem_euclid(2.0 * PI);
        }
        frames.push(frame);
    }

    Spectrogram::new(frames)
}

/// Frame `idx`, or silence past the end
fn column<'a>(
    spectrogram: &'a Spectrogram,
    zero: &'a [Complex<f32>],
    idx: usize,
) -> &'a [Complex<f32>] {
    spectrogram.frames.get(idx).map_or(zero, |f| &f[..])
}
