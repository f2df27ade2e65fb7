//! Frequency-domain descriptors computed from the STFT power spectrum

/// Power floor for the dB conversion
const AMIN: f32 = 1e-10;

/// Dynamic range kept below the loudest mel cell
const TOP_DB: f32 = 80.0;

/// Apply a filter bank (`rows x bins`) to every power frame
pub fn apply_filterbank(power: &[Vec<f32>], basis: &[Vec<f32>]) -> Vec<Vec<f32>> {
    power
        .iter()
        .map(|frame| {
            basis
                .iter()
                .map(|weights| weights.iter().zip(frame).map(|(w, p)| w * p).sum())
                .collect()
        })
        .collect()
}

/// Pitch-class energy per frame, each frame scaled so its peak is 1.
///
/// Frames without energy are left at zero.
pub fn chroma(power: &[Vec<f32>], chroma_basis: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let mut frames = apply_filterbank(power, chroma_basis);
    for frame in frames.iter_mut() {
        let peak = frame.iter().fold(0.0f32, |acc, &v| acc.max(v.abs()));
        if peak > f32::MIN_POSITIVE {
            frame.iter_mut().for_each(|v| *v /= peak);
        }
    }
    frames
}

/// Convert a power spectrogram to decibels relative to 1.0, clipped to
/// `TOP_DB` below its global maximum
pub fn power_to_db(frames: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let mut db: Vec<Vec<f32>> = frames
        .iter()
        .map(|frame| frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()).collect())
        .collect();

    let max_db = db
        .iter()
        .flatten()
        .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let floor = max_db - TOP_DB;
    for value in db.iter_mut().flatten() {
        *value = value.max(floor);
    }
    db
}

/// Orthonormal DCT-II basis: `n_out` rows over `n_in` inputs
pub fn dct_basis(n_out: usize, n_in: usize) -> Vec<Vec<f32>> {
    let n = n_in as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| {
                    let angle = std::f64::consts::PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n);
                    (scale * angle.cos()) as f32
                })
                .collect()
        })
        .collect()
}

/// Cepstral coefficients per frame from a mel power spectrogram
pub fn mfcc(mel_frames: &[Vec<f32>], dct: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let log_mel = power_to_db(mel_frames);
    apply_filterbank(&log_mel, dct)
}

/// Per-dimension mean across frames
pub fn mean_over_frames(frames: &[Vec<f32>], dims: usize) -> Vec<f32> {
    let mut sums = vec![0.0f64; dims];
    for frame in frames {
        for (sum, &v) in sums.iter_mut().zip(frame) {
            *sum += v as f64;
        }
    }
    let count = frames.len().max(1) as f64;
    sums.into_iter().map(|s| (s / count) as f32).collect()
}
