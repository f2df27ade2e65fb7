//! Waveform augmentation: noise injection, time stretch, time shift and
//! pitch shift
//!
//! Each transform reads a waveform and returns a new one. Random transforms
//! take the generator explicitly so callers can seed them.

mod phase_vocoder;

pub use phase_vocoder::phase_vocoder;

use crate::audio::resample_by_ratio;
use crate::error::{ExtractError, Result};
use crate::transform::StftProcessor;
use rand::Rng;

/// Peak-relative ceiling of the injected noise amplitude
pub const NOISE_SCALE: f32 = 0.035;

/// Largest time shift, in thousands of samples
pub const SHIFT_RANGE: f64 = 5.0;

/// Accepted stretch rates, inclusive
pub const MIN_STRETCH_RATE: f32 = 1.0 / 64.0;
pub const MAX_STRETCH_RATE: f32 = 64.0;

/// Largest pitch shift in either direction, in semitones
pub const MAX_PITCH_STEPS: f32 = 60.0;

/// Add Gaussian noise scaled by a random fraction of the waveform's peak.
///
/// The amplitude is `NOISE_SCALE * u * max|x|` with `u` uniform in
/// `[0, 1)`, so silent or empty input comes back unchanged.
pub fn noise<R: Rng + ?Sized>(waveform: &[f32], rng: &mut R) -> Vec<f32> {
    if waveform.is_empty() {
        return Vec::new();
    }

    let peak = waveform.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let amplitude = NOISE_SCALE * rng.gen::<f32>() * peak;
    log::debug!("Injecting noise: peak={peak:.4}, amplitude={amplitude:.6}");

    waveform
        .iter()
        .map(|&s| s + amplitude * standard_normal(rng))
        .collect()
}

/// Box-Muller draw from N(0, 1)
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // 1 - [0, 1) keeps the log argument in (0, 1]
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
}

/// Circularly rotate by a random offset drawn from `[-5000, 5000)` samples
pub fn shift<R: Rng + ?Sized>(waveform: &[f32], rng: &mut R) -> Vec<f32> {
    // `as` truncates toward zero
    let offset = (rng.gen_range(-SHIFT_RANGE..SHIFT_RANGE) * 1000.0) as i64;
    log::debug!("Shifting waveform by {offset} samples");
    rotate(waveform, offset)
}

/// Rotate right by `offset` samples (negative rotates left); samples pushed
/// off one end wrap to the other
pub fn rotate(waveform: &[f32], offset: i64) -> Vec<f32> {
    let mut rotated = waveform.to_vec();
    if !rotated.is_empty() {
        let k = offset.rem_euclid(rotated.len() as i64) as usize;
        rotated.rotate_right(k);
    }
    rotated
}

/// Time-stretch by `rate` without changing pitch.
///
/// Output length is `round(len / rate)`. Rates outside
/// `MIN_STRETCH_RATE..=MAX_STRETCH_RATE` are rejected.
pub fn stretch(waveform: &[f32], rate: f32) -> Result<Vec<f32>> {
    stretch_with(&StftProcessor::new(), waveform, rate)
}

/// [`stretch`] reusing an existing STFT processor
pub fn stretch_with(stft: &StftProcessor, waveform: &[f32], rate: f32) -> Result<Vec<f32>> {
    if !(MIN_STRETCH_RATE..=MAX_STRETCH_RATE).contains(&rate) {
        return Err(ExtractError::InvalidRate(rate));
    }
    if waveform.is_empty() {
        return Ok(Vec::new());
    }

    let rate = rate as f64;
    let output_len = (waveform.len() as f64 / rate).round() as usize;

    let spectrogram = stft.stft(waveform);
    let stretched = phase_vocoder(&spectrogram, rate);
    log::debug!(
        "Stretched {} frames to {} (rate {rate:.3})",
        spectrogram.num_frames,
        stretched.num_frames
    );

    Ok(stft.istft(&stretched, output_len))
}

/// Shift pitch by `pitch_factor` semitones, keeping the duration
pub fn pitch(waveform: &[f32], sample_rate: u32, pitch_factor: f32) -> Result<Vec<f32>> {
    pitch_with(&StftProcessor::new(), waveform, sample_rate, pitch_factor)
}

/// [`pitch`] reusing an existing STFT processor.
///
/// Stretches by `2^(-steps/12)` and resamples the result back to the
/// input length, which scales every frequency by `2^(steps/12)`.
pub fn pitch_with(
    stft: &StftProcessor,
    waveform: &[f32],
    sample_rate: u32,
    pitch_factor: f32,
) -> Result<Vec<f32>> {
    if !pitch_factor.is_finite() || pitch_factor.abs() > MAX_PITCH_STEPS {
        return Err(ExtractError::InvalidPitch(pitch_factor));
    }
    if waveform.is_empty() {
        return Ok(Vec::new());
    }

    let rate = 2.0f64.powf(-pitch_factor as f64 / 12.0);
    let stretched = stretch_with(stft, waveform, rate as f32)?;

    // Treat the stretched signal as recorded at sample_rate / rate
    log::debug!(
        "Pitch shift {pitch_factor} semitones: resampling {:.1}Hz -> {sample_rate}Hz",
        sample_rate as f64 / rate
    );
    let mut shifted = resample_by_ratio(&stretched, rate)?;
    shifted.resize(waveform.len(), 0.0);
    Ok(shifted)
}
