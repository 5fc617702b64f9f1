//! Log-magnitude, pitch-spaced spectral features.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Spectrogram`] | dB matrix indexed (pitch bin, frame) with its time axis |
//! | [`FeatureExtractor`] | Waveform to [`Spectrogram`] using a fixed 5-octave CQT |

mod extractor;
mod spectrogram;

pub use extractor::FeatureExtractor;
pub use spectrogram::Spectrogram;
