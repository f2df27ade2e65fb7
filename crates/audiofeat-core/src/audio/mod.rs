//! Audio loading and resampling
//!
//! Decodes WAV, MP3, FLAC, OGG and common container formats (MP4, MKV, WebM,
//! MOV) to a mono waveform at a requested sample rate.

mod container;
mod decoder;
mod resample;

pub use container::decode_container;
pub use decoder::{decode_audio, AudioData};
pub use resample::{resample_by_ratio, resample_to_target};

use crate::error::AudioError;
use std::path::Path;

/// Loads a mono waveform resampled to `sample_rate`
pub trait WaveformLoader: Send + Sync {
    fn load(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>, AudioError>;
}

/// Loader backed by the file decoders in this module
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioFileLoader;

impl WaveformLoader for AudioFileLoader {
    fn load(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>, AudioError> {
        let audio = decode_audio(path, sample_rate)?;
        log::debug!(
            "Loaded {}: {} samples @ {}Hz ({} ms)",
            path.display(),
            audio.samples.len(),
            audio.sample_rate,
            audio.duration_ms
        );
        Ok(audio.samples)
    }
}

/// Supported audio and container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,

    // Containers decoded through Symphonia
    Mp4,
    Mkv,
    Mov,
    Webm,

    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,

            Some("mp4") | Some("m4a") | Some("aac") => AudioFormat::Mp4,
            Some("mkv") | Some("mka") => AudioFormat::Mkv,
            Some("mov") => AudioFormat::Mov,
            Some("webm") => AudioFormat::Webm,

            _ => AudioFormat::Unknown,
        }
    }

    /// Check if format is handled by the container demuxer
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            AudioFormat::Mp4 | AudioFormat::Mkv | AudioFormat::Mov | AudioFormat::Webm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(AudioFormat::from_path(Path::new("a.wav")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("a.WAV")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("a.flac")), AudioFormat::Flac);
        assert_eq!(AudioFormat::from_path(Path::new("a.m4a")), AudioFormat::Mp4);
        assert_eq!(AudioFormat::from_path(Path::new("a.txt")), AudioFormat::Unknown);
        assert_eq!(AudioFormat::from_path(Path::new("noext")), AudioFormat::Unknown);
    }

    #[test]
    fn test_container_formats() {
        assert!(AudioFormat::Mkv.is_container());
        assert!(AudioFormat::Webm.is_container());
        assert!(!AudioFormat::Ogg.is_container());
    }
}
