//! Error types for configuration, audio loading and extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving configuration, before any extraction runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the waveform loader
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported audio format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("resampling failed: {0}")]
    Resample(String),
}

impl AudioError {
    pub(crate) fn decode(path: &std::path::Path, message: impl ToString) -> Self {
        AudioError::Decode {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Errors raised by the augmenter and the extraction orchestrator
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("invalid stretch rate {0}: must be between 1/64 and 64")]
    InvalidRate(f32),

    #[error("invalid pitch shift {0}: must be at most 60 semitones either way")]
    InvalidPitch(f32),
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
