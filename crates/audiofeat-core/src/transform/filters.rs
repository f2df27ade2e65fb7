//! Mel and chroma filter banks over the `N_FFT` power spectrum

use super::{N_BINS, N_FFT};

const MEL_F_SP: f64 = 200.0 / 3.0;
const MEL_MIN_LOG_HZ: f64 = 1000.0;
const MEL_MIN_LOG_MEL: f64 = MEL_MIN_LOG_HZ / MEL_F_SP;

fn mel_log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert Hz to mels on the Slaney scale (linear below 1 kHz, log above)
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MEL_MIN_LOG_HZ {
        MEL_MIN_LOG_MEL + (hz / MEL_MIN_LOG_HZ).ln() / mel_log_step()
    } else {
        hz / MEL_F_SP
    }
}

/// Inverse of [`hz_to_mel`]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MEL_MIN_LOG_MEL {
        MEL_MIN_LOG_HZ * (mel_log_step() * (mel - MEL_MIN_LOG_MEL)).exp()
    } else {
        mel * MEL_F_SP
    }
}

/// Triangular mel filters from 0 Hz to Nyquist, area-normalised.
///
/// Returns `n_mels` rows of `N_BINS` weights.
pub fn mel_filterbank(sample_rate: u32, n_mels: usize) -> Vec<Vec<f32>> {
    let sr = sample_rate as f64;
    let fmax = sr / 2.0;

    let fft_freqs: Vec<f64> = (0..N_BINS)
        .map(|k| k as f64 * sr / N_FFT as f64)
        .collect();

    let min_mel = hz_to_mel(0.0);
    let max_mel = hz_to_mel(fmax);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f64 / (n_mels + 1) as f64))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (right - left);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    (lower.min(upper).max(0.0) * enorm) as f32
                })
                .collect()
        })
        .collect()
}

/// Gaussian pitch-class filters mapping FFT bins onto `n_chroma` classes.
///
/// Bin 0 is C. Each FFT bin's weights are unit-L2 across classes and then
/// tapered by a Gaussian over octaves centered at octave 5 (width 2).
pub fn chroma_filterbank(sample_rate: u32, n_chroma: usize) -> Vec<Vec<f32>> {
    let sr = sample_rate as f64;
    let n_chroma_f = n_chroma as f64;
    let a440_ref = 440.0 / 16.0;

    // Fractional chroma position of every FFT bin; DC is pinned 1.5 octaves
    // below bin 1
    let mut frq_bins = Vec::with_capacity(N_FFT);
    for k in 1..N_FFT {
        let hz = k as f64 * sr / N_FFT as f64;
        frq_bins.push(n_chroma_f * (hz / a440_ref).log2());
    }
    let dc_bin = frq_bins[0] - 1.5 * n_chroma_f;
    frq_bins.insert(0, dc_bin);

    let mut bin_widths: Vec<f64> = frq_bins
        .windows(2)
        .map(|w| (w[1] - w[0]).max(1.0))
        .collect();
    bin_widths.push(1.0);

    let half = (n_chroma_f / 2.0).round();
    let mut weights = vec![vec![0.0f64; N_FFT]; n_chroma];

    for (k, (&frq, &width)) in frq_bins.iter().zip(&bin_widths).enumerate() {
        for (c, row) in weights.iter_mut().enumerate() {
            let d = (frq - c as f64 + half + 10.0 * n_chroma_f).rem_euclid(n_chroma_f) - half;
            row[k] = (-0.5 * (2.0 * d / width).powi(2)).exp();
        }

        let norm = weights.iter().map(|row| row[k] * row[k]).sum::<f64>().sqrt();
        let octave_taper = (-0.5 * ((frq / n_chroma_f - 5.0) / 2.0).powi(2)).exp();
        for row in weights.iter_mut() {
            if norm > 0.0 {
                row[k] /= norm;
            }
            row[k] *= octave_taper;
        }
    }

    // Rotate so that class 0 is C instead of A
    let shift = 3 * (n_chroma / 12);
    (0..n_chroma)
        .map(|c| {
            weights[(c + shift) % n_chroma][..N_BINS]
                .iter()
                .map(|&w| w as f32)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mel_scale_round_trip() {
        for hz in [0.0, 440.0, 999.0, 1000.0, 4000.0, 11025.0] {
            assert_relative_eq!(mel_to_hz(hz_to_mel(hz)), hz, epsilon = 1e-6);
        }
        assert_relative_eq!(hz_to_mel(1000.0), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mel_filterbank_shape() {
        let bank = mel_filterbank(22050, 128);
        assert_eq!(bank.len(), 128);
        assert!(bank.iter().all(|row| row.len() == N_BINS));
        assert!(bank.iter().flatten().all(|&w| w >= 0.0));
        // Every filter must cover at least one FFT bin at this resolution
        assert!(bank.iter().skip(8).all(|row| row.iter().any(|&w| w > 0.0)));
    }

    #[test]
    fn test_chroma_filterbank_peaks_at_a() {
        let bank = chroma_filterbank(22050, 12);
        assert_eq!(bank.len(), 12);

        // FFT bin closest to 440 Hz
        let bin = (440.0 * N_FFT as f64 / 22050.0).round() as usize;
        let best = (0..12)
            .max_by(|&a, &b| bank[a][bin].partial_cmp(&bank[b][bin]).unwrap())
            .unwrap();
        assert_eq!(best, 9);
    }
}
