//! Band-limited resampling with rubato's windowed-sinc resampler

use crate::error::AudioError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Input frames handed to the resampler per call
const CHUNK_SIZE: usize = 1024;

/// Resample audio from `from_rate` to `to_rate`
pub fn resample_to_target(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "invalid sample rates {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    resample_by_ratio(samples, to_rate as f64 / from_rate as f64)
}

/// Resample by an arbitrary `output_rate / input_rate` ratio.
///
/// The output holds `round(len * ratio)` samples with the resampler's
/// group delay removed.
pub fn resample_by_ratio(samples: &[f32], ratio: f64) -> Result<Vec<f32>, AudioError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(AudioError::Resample(format!("invalid resample ratio {ratio}")));
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if ratio == 1.0 {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected_len + delay);

    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let end = pos + resampler.input_frames_next();
        let frame: [&[f32]; 1] = [&samples[pos..end]];
        let chunk = resampler
            .process(&frame[..], None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
        pos = end;
    }

    if pos < samples.len() {
        let tail: [&[f32]; 1] = [&samples[pos..]];
        let chunk = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter tail until the delayed output is complete
    while output.len() < expected_len + delay {
        let chunk = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected_len, 0.0);
    Ok(output)
}
