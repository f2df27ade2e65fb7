//! Audio decoding for multiple formats

use super::{resample_to_target, AudioFormat};
use crate::error::AudioError;
use std::path::Path;

/// Decoded audio data
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u32,
}

impl AudioData {
    pub(crate) fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let frames = samples.len() as f64 / channels.max(1) as f64;
        let duration_ms = if sample_rate == 0 {
            0
        } else {
            (frames / sample_rate as f64 * 1000.0) as u32
        };
        Self {
            samples,
            sample_rate,
            channels,
            duration_ms,
        }
    }

    /// Convert to mono by averaging channels
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks(self.channels as usize)
            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
            .collect()
    }
}

/// Decode an audio file to a mono waveform at `target_sample_rate`
pub fn decode_audio(path: &Path, target_sample_rate: u32) -> Result<AudioData, AudioError> {
    if !path.exists() {
        return Err(AudioError::NotFound(path.to_path_buf()));
    }

    let format = AudioFormat::from_path(path);

    let audio_data = if format.is_container() {
        super::decode_container(path)?
    } else {
        match format {
            AudioFormat::Wav => decode_wav(path)?,
            AudioFormat::Mp3 => decode_mp3(path)?,
            AudioFormat::Flac => decode_flac(path)?,
            AudioFormat::Ogg => decode_ogg(path)?,
            _ => return Err(AudioError::UnsupportedFormat(path.to_path_buf())),
        }
    };

    if audio_data.samples.is_empty() {
        log::warn!("Decoded zero samples from {}", path.display());
    }

    let mono = audio_data.to_mono();
    let samples = if audio_data.sample_rate != target_sample_rate {
        log::debug!(
            "Resampling {}: {}Hz -> {}Hz",
            path.display(),
            audio_data.sample_rate,
            target_sample_rate
        );
        resample_to_target(&mono, audio_data.sample_rate, target_sample_rate)?
    } else {
        mono
    };

    Ok(AudioData::new(samples, target_sample_rate, 1))
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<AudioData, AudioError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| AudioError::decode(path, e))?;

    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AudioError::decode(path, e))?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AudioError::decode(path, e))?
        }
    };

    Ok(AudioData::new(samples, spec.sample_rate, spec.channels))
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<AudioData, AudioError> {
    let data = std::fs::read(path).map_err(|source| AudioError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend(frame.data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(AudioError::decode(path, e)),
        }
    }

    if sample_rate == 0 {
        return Err(AudioError::decode(path, "no MP3 frames found"));
    }

    Ok(AudioData::new(samples, sample_rate, channels))
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<AudioData, AudioError> {
    let mut reader = claxon::FlacReader::open(path).map_err(|e| AudioError::decode(path, e))?;

    let info = reader.streaminfo();
    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AudioError::decode(path, e))?;

    Ok(AudioData::new(samples, info.sample_rate, info.channels as u16))
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<AudioData, AudioError> {
    let file = std::fs::File::open(path).map_err(|source| AudioError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)
        .map_err(|e| AudioError::decode(path, e))?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader
        .read_dec_packet_itl()
        .map_err(|e| AudioError::decode(path, e))?
    {
        samples.extend(packet.iter().map(|&s| s as f32 / 32768.0));
    }

    Ok(AudioData::new(samples, sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_to_mono_averages_channels() {
        let audio = AudioData::new(vec![1.0, 0.0, 0.5, 0.5], 8000, 2);
        assert_eq!(audio.to_mono(), vec![0.5, 0.5]);
        assert_eq!(audio.duration_ms, 0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = decode_audio(Path::new("/nonexistent/clip.wav"), 22050).unwrap_err();
        assert!(matches!(err, AudioError::NotFound(_)));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not audio").unwrap();

        let err = decode_audio(&path, 22050).unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_wav_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"RIFF....garbage").unwrap();

        let err = decode_audio(&path, 22050).unwrap_err();
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn test_decode_stereo_wav_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let samples: Vec<i16> = (0..2000).flat_map(|_| [16384i16, 0]).collect();
        write_wav(&path, 22050, 2, &samples);

        let audio = decode_audio(&path, 22050).unwrap();
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 2000);
        assert!((audio.samples[10] - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_container_extension_goes_through_symphonia() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mka");
        let samples: Vec<i16> = (0..22050).flat_map(|_| [16384i16, -8192]).collect();
        write_wav(&path, 22050, 2, &samples);

        let audio = decode_audio(&path, 22050).unwrap();
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 22050);
        assert!((audio.samples[100] - 0.125).abs() < 1e-3);
        assert_eq!(audio.duration_ms, 1000);
    }

    #[test]
    fn test_container_resamples_like_other_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_wav(&path, 11025, 1, &vec![1000i16; 11025]);

        let audio = decode_audio(&path, 22050).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples.len(), 22050);
    }

    #[test]
    fn test_corrupt_container_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.webm");
        std::fs::write(&path, b"definitely not a media file").unwrap();

        let err = decode_audio(&path, 22050).unwrap_err();
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn test_decode_resamples_to_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("low.wav");
        let samples = vec![1000i16; 11025];
        write_wav(&path, 11025, 1, &samples);

        let audio = decode_audio(&path, 22050).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples.len(), 22050);
        assert_eq!(audio.duration_ms, 1000);
    }
}
