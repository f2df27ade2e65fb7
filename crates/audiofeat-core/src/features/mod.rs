//! Feature aggregation: waveform -> fixed-length descriptor vector
//!
//! Blocks are concatenated in a fixed order that downstream models rely on:
//!
//! | offset | length | block                          |
//! |--------|--------|--------------------------------|
//! | 0      | 1      | zero-crossing rate             |
//! | 1      | 12     | chroma (STFT power)            |
//! | 13     | 20     | MFCC                           |
//! | 33     | 1      | RMS energy                     |
//! | 34     | 128    | mel-spectrogram (power)        |
//!
//! Every block is a mean over the same centered `N_FFT`/`HOP_LENGTH` frames.

mod spectral;
mod temporal;

pub use spectral::{dct_basis, power_to_db};
pub use temporal::{rms, zero_crossing_rate};

use crate::error::ConfigError;
use crate::transform::{chroma_filterbank, mel_filterbank, StftProcessor};

pub const N_CHROMA: usize = 12;
pub const N_MFCC: usize = 20;
pub const N_MELS: usize = 128;

pub const ZCR_OFFSET: usize = 0;
pub const CHROMA_OFFSET: usize = ZCR_OFFSET + 1;
pub const MFCC_OFFSET: usize = CHROMA_OFFSET + N_CHROMA;
pub const RMS_OFFSET: usize = MFCC_OFFSET + N_MFCC;
pub const MEL_OFFSET: usize = RMS_OFFSET + 1;

/// Length of every feature vector
pub const FEATURE_LEN: usize = MEL_OFFSET + N_MELS;

pub type FeatureVector = Vec<f32>;

/// Column names matching the feature vector layout
pub fn feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(FEATURE_LEN);
    names.push("zcr".to_string());
    names.extend((0..N_CHROMA).map(|i| format!("chroma_{i}")));
    names.extend((0..N_MFCC).map(|i| format!("mfcc_{i}")));
    names.push("rms".to_string());
    names.extend((0..N_MELS).map(|i| format!("mel_{i}")));
    names
}

/// Feature extractor with FFT plans and filter banks prepared for one
/// sample rate
#[derive(Debug)]
pub struct FeatureAggregator {
    stft: StftProcessor,
    mel_basis: Vec<Vec<f32>>,
    chroma_basis: Vec<Vec<f32>>,
    dct: Vec<Vec<f32>>,
}

impl FeatureAggregator {
    /// Fails for a zero sample rate, which has no frequency axis to build
    /// the mel and chroma filters on
    pub fn new(sample_rate: u32) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be > 0".into()));
        }
        Ok(Self {
            stft: StftProcessor::new(),
            mel_basis: mel_filterbank(sample_rate, N_MELS),
            chroma_basis: chroma_filterbank(sample_rate, N_CHROMA),
            dct: dct_basis(N_MFCC, N_MELS),
        })
    }

    pub fn stft(&self) -> &StftProcessor {
        &self.stft
    }

    /// Compute the `FEATURE_LEN` vector for a waveform.
    ///
    /// Deterministic, and total: empty or silent input still yields a
    /// finite vector of full length.
    pub fn extract(&self, waveform: &[f32]) -> FeatureVector {
        let power = self.stft.stft(waveform).power();

        let chroma = spectral::chroma(&power, &self.chroma_basis);
        let mel = spectral::apply_filterbank(&power, &self.mel_basis);
        let mfcc = spectral::mfcc(&mel, &self.dct);

        let mut features = Vec::with_capacity(FEATURE_LEN);
        features.push(zero_crossing_rate(waveform));
        features.extend(spectral::mean_over_frames(&chroma, N_CHROMA));
        features.extend(spectral::mean_over_frames(&mfcc, N_MFCC));
        features.push(rms(waveform));
        features.extend(spectral::mean_over_frames(&mel, N_MELS));

        log::debug!(
            "Extracted {} features from {} samples ({} frames)",
            features.len(),
            waveform.len(),
            power.len()
        );
        debug_assert_eq!(features.len(), FEATURE_LEN);
        features
    }
}

/// One-shot extraction; prefer a reused [`FeatureAggregator`] for batches
pub fn extract_features(
    waveform: &[f32],
    sample_rate: u32,
) -> Result<FeatureVector, ConfigError> {
    Ok(FeatureAggregator::new(sample_rate)?.extract(waveform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_feature_len() {
        assert_eq!(FEATURE_LEN, 162);
        assert_eq!(feature_names().len(), FEATURE_LEN);
        assert_eq!(feature_names()[RMS_OFFSET], "rms");
    }

    #[test]
    fn test_shape_is_independent_of_length() {
        let aggregator = FeatureAggregator::new(22050).unwrap();
        for len in [0, 1, 100, 2048, 22050, 50000] {
            let features = aggregator.extract(&sine(440.0, 22050, len));
            assert_eq!(features.len(), FEATURE_LEN, "len = {len}");
        }
        assert_eq!(
            extract_features(&vec![0.0; 1000], 16000).unwrap().len(),
            FEATURE_LEN
        );
    }

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        assert!(matches!(
            extract_features(&[0.1; 100], 0),
            Err(ConfigError::Invalid(_))
        ));
        assert!(FeatureAggregator::new(0).is_err());
    }

    #[test]
    fn test_sine_is_bit_identical_across_runs() {
        let signal = sine(440.0, 22050, 22050);
        let first = extract_features(&signal, 22050).unwrap();
        let second = extract_features(&signal, 22050).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_input_is_finite() {
        let aggregator = FeatureAggregator::new(22050).unwrap();
        for waveform in [Vec::new(), vec![0.0; 5000]] {
            let features = aggregator.extract(&waveform);
            assert!(features.iter().all(|v| v.is_finite()));
            assert_eq!(features[ZCR_OFFSET], 0.0);
            assert_eq!(features[RMS_OFFSET], 0.0);
            assert!(features[CHROMA_OFFSET..MFCC_OFFSET].iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_sine_440_lands_on_pitch_class_a() {
        let features = extract_features(&sine(440.0, 22050, 22050), 22050).unwrap();
        let chroma = &features[CHROMA_OFFSET..MFCC_OFFSET];
        assert_eq!(argmax(chroma), 9);
        assert!((chroma[9] - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_rms_block_matches_amplitude() {
        let loud = extract_features(&sine(440.0, 22050, 22050), 22050).unwrap();
        let quiet: Vec<f32> = sine(440.0, 22050, 22050).iter().map(|s| s * 0.1).collect();
        let quiet = extract_features(&quiet, 22050).unwrap();
        let ratio = loud[RMS_OFFSET] / quiet[RMS_OFFSET];
        assert!((ratio - 10.0).abs() < 0.01, "ratio = {ratio}");
        // Full-scale sine RMS is 1/sqrt(2), slightly lowered by edge frames
        assert!(loud[RMS_OFFSET] > 0.65 && loud[RMS_OFFSET] < 0.71);
    }

    #[test]
    fn test_mel_energy_peaks_near_tone() {
        let sample_rate = 22050;
        let features =
            extract_features(&sine(1000.0, sample_rate, 22050), sample_rate).unwrap();
        let mel = &features[MEL_OFFSET..];
        let peak_band = argmax(mel);

        // Find the band whose center is closest to 1 kHz
        let max_mel = crate::transform::hz_to_mel(sample_rate as f64 / 2.0);
        let expected = (0..N_MELS)
            .min_by(|&a, &b| {
                let center = |m: usize| {
                    crate::transform::mel_to_hz(max_mel * (m + 1) as f64 / (N_MELS + 1) as f64)
                };
                (center(a) - 1000.0)
                    .abs()
                    .partial_cmp(&(center(b) - 1000.0).abs())
                    .unwrap()
            })
            .unwrap();
        assert!((peak_band as i64 - expected as i64).abs() <= 1);
    }
}
