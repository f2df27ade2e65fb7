//! Short-time Fourier analysis and the spectral filter banks built on it
//!
//! Every feature block and the phase vocoder share the same analysis window:
//! `N_FFT`-sample periodic Hann frames, `HOP_LENGTH` apart, centered on
//! the frame index by padding `N_FFT / 2` samples at each end.

mod filters;
mod stft;

pub use filters::{chroma_filterbank, hz_to_mel, mel_filterbank, mel_to_hz};
pub use stft::{hann_window, Spectrogram, StftProcessor};

/// FFT length and window length in samples
pub const N_FFT: usize = 2048;

/// Distance between successive frames in samples
pub const HOP_LENGTH: usize = 512;

/// Number of non-negative frequency bins for `N_FFT`
pub const N_BINS: usize = N_FFT / 2 + 1;

/// Number of centered frames for a signal of `len` samples
pub fn num_frames(len: usize) -> usize {
    1 + len / HOP_LENGTH
}
