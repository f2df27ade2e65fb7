//! audiofeat core - audio feature extraction with class-targeted augmentation
//!
//! Turns recordings into fixed-length descriptor vectors (zero-crossing
//! rate, chroma, MFCC, RMS, mel-spectrogram) and, for labels configured as
//! augmentation targets, adds rows computed from noise-injected and
//! stretched/pitch-shifted copies of the waveform.

pub mod audio;
pub mod augment;
pub mod config;
pub mod error;
pub mod extractor;
pub mod features;
pub mod transform;

pub use config::{FeatureConfig, Settings};
pub use error::{AudioError, ConfigError, ExtractError};
pub use extractor::{FeatureExtractor, FeatureMatrix};
pub use features::{extract_features, FeatureAggregator, FeatureVector, FEATURE_LEN};

use std::path::Path;

/// Extract the feature matrix for one audio file
pub fn get_features(
    audio_path: impl AsRef<Path>,
    label: Option<&str>,
    config: &FeatureConfig,
) -> error::Result<FeatureMatrix> {
    let extractor = FeatureExtractor::new(config.clone())?;
    extractor.get_features(audio_path, label)
}
