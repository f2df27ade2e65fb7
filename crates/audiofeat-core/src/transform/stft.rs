//! Centered STFT and its overlap-add inverse

use super::{HOP_LENGTH, N_BINS, N_FFT};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Complex short-time spectrum
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Complex bins [time_frame][frequency_bin]
    pub frames: Vec<Vec<Complex<f32>>>,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins
    pub num_bins: usize,
}

impl Spectrogram {
    pub fn new(frames: Vec<Vec<Complex<f32>>>) -> Self {
        let num_frames = frames.len();
        Self {
            frames,
            num_frames,
            num_bins: N_BINS,
        }
    }

    /// Squared magnitude per frame and bin
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm_sqr()).collect())
            .collect()
    }
}

/// Periodic Hann window
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / size as f32).cos())
        .collect()
}

/// Forward and inverse STFT with pre-planned FFTs
pub struct StftProcessor {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl std::fmt::Debug for StftProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StftProcessor")
            .field("n_fft", &N_FFT)
            .field("hop_length", &HOP_LENGTH)
            .finish()
    }
}

impl Default for StftProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StftProcessor {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(N_FFT),
            inverse: planner.plan_fft_inverse(N_FFT),
            window: hann_window(N_FFT),
        }
    }

    /// Compute the centered STFT (zero padding at both ends).
    ///
    /// Always yields at least one frame, so an empty signal produces a
    /// single all-zero frame.
    pub fn stft(&self, samples: &[f32]) -> Spectrogram {
        let pad = N_FFT / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let num_frames = super::num_frames(samples.len());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let mut frames = Vec::with_capacity(num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * HOP_LENGTH;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.forward.process(&mut buffer);
            frames.push(buffer[..N_BINS].to_vec());
        }

        Spectrogram::new(frames)
    }

    /// Invert a spectrogram by windowed overlap-add, trimmed or zero-padded
    /// to exactly `length` samples
    pub fn istft(&self, spectrogram: &Spectrogram, length: usize) -> Vec<f32> {
        let pad = N_FFT / 2;
        let max_frames = (length + 2 * pad).div_ceil(HOP_LENGTH);
        let num_frames = spectrogram.num_frames.min(max_frames);
        if num_frames == 0 {
            return vec![0.0; length];
        }

        let signal_len = N_FFT + HOP_LENGTH * (num_frames - 1);
        let mut output = vec![0.0f32; signal_len];
        let mut window_sum = vec![0.0f32; signal_len];
        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let scale = 1.0 / N_FFT as f32;

        for (frame_idx, frame) in spectrogram.frames.iter().take(num_frames).enumerate() {
            // Rebuild the Hermitian-symmetric full spectrum
            buffer[..N_BINS].copy_from_slice(frame);
            buffer[0].im = 0.0;
            buffer[N_FFT / 2].im = 0.0;
            for k in 1..N_FFT / 2 {
                buffer[N_FFT - k] = frame[k].conj();
            }
            self.inverse.process(&mut buffer);

            let start = frame_idx * HOP_LENGTH;
            for (i, c) in buffer.iter().enumerate() {
                let w = self.window[i];
                output[start + i] += c.re * scale * w;
                window_sum[start + i] += w * w;
            }
        }

        for (sample, &norm) in output.iter_mut().zip(&window_sum) {
            if norm > f32::MIN_POSITIVE {
                *sample /= norm;
            }
        }

        let mut trimmed: Vec<f32> = output.into_iter().skip(pad).collect();
        trimmed.resize(length, 0.0);
        trimmed
    }
}
