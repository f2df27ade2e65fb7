//! Configuration for feature extraction and augmentation
//!
//! `Settings` is the on-disk TOML document; `FeatureConfig` is the validated
//! form threaded through the augmenter, aggregator and orchestrator.

use crate::augment::{MAX_PITCH_STEPS, MAX_STRETCH_RATE, MIN_STRETCH_RATE};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Label that receives augmented rows when no label set is configured
pub const DEFAULT_AUGMENT_LABEL: &str = "glass_break";

/// Top-level TOML document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub audio: AudioSettings,
    #[serde(default)]
    pub augmentation: AugmentationSettings,
}

/// `[audio]` section. Every key is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub pitch_factor: f32,
    pub stretch_rate: f32,
}

/// `[augmentation]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AugmentationSettings {
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

impl Default for AugmentationSettings {
    fn default() -> Self {
        Self {
            labels: default_labels(),
        }
    }
}

fn default_labels() -> Vec<String> {
    vec![DEFAULT_AUGMENT_LABEL.to_string()]
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Validate and flatten into the runtime configuration
    pub fn into_feature_config(self) -> Result<FeatureConfig, ConfigError> {
        let config = FeatureConfig {
            sample_rate: self.audio.sample_rate,
            pitch_factor: self.audio.pitch_factor,
            stretch_rate: self.audio.stretch_rate,
            augment_labels: self.augmentation.labels,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Runtime parameters shared read-only by every extraction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Pitch shift in semitones
    pub pitch_factor: f32,
    /// Playback-rate multiplier for time stretching
    pub stretch_rate: f32,
    /// Labels that receive augmented rows (exact match)
    pub augment_labels: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            pitch_factor: 0.7,
            stretch_rate: 0.8,
            augment_labels: default_labels(),
        }
    }
}

impl FeatureConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be > 0".into()));
        }
        if !(MIN_STRETCH_RATE..=MAX_STRETCH_RATE).contains(&self.stretch_rate) {
            return Err(ConfigError::Invalid(format!(
                "stretch_rate must be between {MIN_STRETCH_RATE} and {MAX_STRETCH_RATE}, got {}",
                self.stretch_rate
            )));
        }
        if !self.pitch_factor.is_finite() || self.pitch_factor.abs() > MAX_PITCH_STEPS {
            return Err(ConfigError::Invalid(format!(
                "pitch_factor must be within +/-{MAX_PITCH_STEPS} semitones, got {}",
                self.pitch_factor
            )));
        }
        Ok(())
    }

    /// Whether rows for `label` should include augmented variants
    pub fn is_augment_eligible(&self, label: Option<&str>) -> bool {
        match label {
            Some(label) => self.augment_labels.iter().any(|l| l == label),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FeatureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.augment_labels, vec!["glass_break".to_string()]);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [audio]
            sample_rate = 16000
            pitch_factor = -2.0
            stretch_rate = 1.25

            [augmentation]
            labels = ["glass_break", "gunshot"]
        "#;

        let config = Settings::from_toml_str(toml_str)
            .unwrap()
            .into_feature_config()
            .unwrap();
        assert_eq!(config.sample_rate, 16000);
        assert!((config.pitch_factor + 2.0).abs() < 1e-6);
        assert!((config.stretch_rate - 1.25).abs() < 1e-6);
        assert!(config.is_augment_eligible(Some("gunshot")));
    }

    #[test]
    fn test_augmentation_section_is_optional() {
        let toml_str = r#"
            [audio]
            sample_rate = 22050
            pitch_factor = 0.7
            stretch_rate = 0.8
        "#;

        let config = Settings::from_toml_str(toml_str)
            .unwrap()
            .into_feature_config()
            .unwrap();
        assert_eq!(config.augment_labels, vec![DEFAULT_AUGMENT_LABEL.to_string()]);
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let toml_str = r#"
            [audio]
            sample_rate = 22050
            pitch_factor = 0.7
        "#;

        let err = Settings::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_positive_stretch_rate_rejected() {
        let config = FeatureConfig {
            stretch_rate: 0.0,
            ..FeatureConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = FeatureConfig {
            stretch_rate: -0.5,
            ..FeatureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_rates_rejected() {
        let tiny_rate = FeatureConfig {
            stretch_rate: 1e-30,
            ..FeatureConfig::default()
        };
        assert!(matches!(tiny_rate.validate(), Err(ConfigError::Invalid(_))));

        let huge_pitch = FeatureConfig {
            pitch_factor: 300.0,
            ..FeatureConfig::default()
        };
        assert!(matches!(huge_pitch.validate(), Err(ConfigError::Invalid(_))));

        let edge = FeatureConfig {
            stretch_rate: MAX_STRETCH_RATE,
            pitch_factor: -MAX_PITCH_STEPS,
            ..FeatureConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let config = FeatureConfig {
            sample_rate: 0,
            ..FeatureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_label_matching_is_exact() {
        let config = FeatureConfig::default();
        assert!(config.is_augment_eligible(Some("glass_break")));
        assert!(!config.is_augment_eligible(Some("Glass_Break")));
        assert!(!config.is_augment_eligible(Some("glass_break ")));
        assert!(!config.is_augment_eligible(Some("other_class")));
        assert!(!config.is_augment_eligible(None));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/audiofeat.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
