//! Audio tracks inside MP4/M4A, Matroska, QuickTime and WebM containers
//!
//! Decoded through Symphonia and downmixed to mono packet by packet, so a
//! long multichannel track never needs a full interleaved copy in memory.

use super::AudioData;
use crate::error::AudioError;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode the primary audio track of a container file to mono
pub fn decode_container(path: &Path) -> Result<AudioData, AudioError> {
    let file = std::fs::File::open(path).map_err(|source| AudioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // The extension is only a hint; probing falls back to content sniffing
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::decode(path, e))?;
    let mut format = probed.format;

    let track = audio_track(format.default_track(), format.tracks())
        .ok_or_else(|| AudioError::decode(path, "no audio track found"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::decode(path, e))?;

    let mut mono = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            // A new chained stream starts; the first one is all we extract
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::decode(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("Skipping undecodable packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(AudioError::decode(path, e)),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count().max(1);

        let samples = buffer.get_or_insert_with(|| {
            SampleBuffer::new(decoded.capacity() as u64, spec)
        });
        if samples.capacity() < decoded.capacity() * channels {
            *samples = SampleBuffer::new(decoded.capacity() as u64, spec);
        }
        samples.copy_interleaved_ref(decoded);

        mono.extend(
            samples
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    if sample_rate == 0 {
        return Err(AudioError::decode(path, "audio track has no sample rate"));
    }

    Ok(AudioData::new(mono, sample_rate, 1))
}

/// The container's default track if it carries a codec, else the first one
/// that does
fn audio_track<'a>(default: Option<&'a Track>, tracks: &'a [Track]) -> Option<&'a Track> {
    default
        .filter(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .or_else(|| tracks.iter().find(|t| t.codec_params.codec != CODEC_TYPE_NULL))
}
