//! Extraction orchestration: file -> feature matrix
//!
//! Every recording yields a base row. Recordings whose label is in the
//! configured augmentation set also yield a noise-injected row and a
//! stretched-then-pitch-shifted row, in that order.

use crate::audio::{AudioFileLoader, WaveformLoader};
use crate::augment;
use crate::config::FeatureConfig;
use crate::error::{ConfigError, Result};
use crate::features::{FeatureAggregator, FeatureVector, FEATURE_LEN};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Feature rows for one recording: base first, augmented variants after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn new(base: FeatureVector) -> Self {
        Self { rows: vec![base] }
    }

    fn push(&mut self, row: FeatureVector) {
        debug_assert_eq!(row.len(), self.num_columns());
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FeatureVector> {
        self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(FEATURE_LEN, Vec::len)
    }

    /// The unaugmented row
    pub fn base(&self) -> &FeatureVector {
        &self.rows[0]
    }
}

/// Loads recordings and turns them into feature matrices
pub struct FeatureExtractor<L = AudioFileLoader> {
    config: FeatureConfig,
    aggregator: FeatureAggregator,
    loader: L,
}

impl FeatureExtractor<AudioFileLoader> {
    /// Extractor reading audio files from disk
    pub fn new(config: FeatureConfig) -> Result<Self, ConfigError> {
        Self::with_loader(config, AudioFileLoader)
    }
}

impl<L: WaveformLoader> FeatureExtractor<L> {
    pub fn with_loader(config: FeatureConfig, loader: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            aggregator: FeatureAggregator::new(config.sample_rate)?,
            config,
            loader,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract features for `path`, drawing augmentation randomness from the
    /// thread-local generator
    pub fn get_features(&self, path: impl AsRef<Path>, label: Option<&str>) -> Result<FeatureMatrix> {
        self.get_features_with_rng(path, label, &mut rand::thread_rng())
    }

    pub fn get_features_with_rng<R: Rng + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        label: Option<&str>,
        rng: &mut R,
    ) -> Result<FeatureMatrix> {
        let path = path.as_ref();
        let waveform = self.loader.load(path, self.config.sample_rate)?;

        let matrix = self.features_from_waveform(&waveform, label, rng)?;
        log::info!(
            "{}: {} samples -> {} row(s) x {} features",
            path.display(),
            waveform.len(),
            matrix.num_rows(),
            matrix.num_columns()
        );
        Ok(matrix)
    }

    /// Apply the extraction policy to an in-memory waveform
    pub fn features_from_waveform<R: Rng + ?Sized>(
        &self,
        waveform: &[f32],
        label: Option<&str>,
        rng: &mut R,
    ) -> Result<FeatureMatrix> {
        let mut matrix = FeatureMatrix::new(self.aggregator.extract(waveform));

        if self.config.is_augment_eligible(label) {
            log::debug!("Label {label:?} is augmentation-eligible");
            let stft = self.aggregator.stft();

            let noisy = augment::noise(waveform, rng);
            matrix.push(self.aggregator.extract(&noisy));

            let stretched = augment::stretch_with(stft, waveform, self.config.stretch_rate)?;
            let pitched = augment::pitch_with(
                stft,
                &stretched,
                self.config.sample_rate,
                self.config.pitch_factor,
            )?;
            matrix.push(self.aggregator.extract(&pitched));
        }

        Ok(matrix)
    }
}
