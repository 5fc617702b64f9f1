//! Align the notes of a musical score to a recorded performance.
//!
//! Given a recording and a synthesized rendition of the same score (whose
//! note timings are known in symbolic ticks), score-align computes
//! log-magnitude constant-Q spectrograms of both, finds the optimal
//! monotonic correspondence between their frames with dynamic time warping,
//! and projects every note boundary through that correspondence onto the
//! recording's time axis.
//!
//! # Quick Start
//!
//! ```rust
//! use score_align::io::{self, Waveform};
//! use score_align::notes::Note;
//! use score_align::{AlignConfig, Aligner};
//!
//! let sr = 22050;
//! let real = Waveform::new(io::tone(261.63, sr, 1.0), sr);
//! let synth = Waveform::new(io::tone(261.63, sr, 0.8), sr);
//! let notes = [Note { onset: 0, offset: 480, pitch: 60, velocity: 100 }];
//!
//! let aligner = Aligner::new(AlignConfig::new()).unwrap();
//! let score = aligner.align(&real, &synth, &notes).unwrap();
//! assert_eq!(score.notes[0].start, 0.0);
//! assert!(score.notes[0].end > 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`io`] | Audio loading (WAV, anything symphonia decodes), resampling, WAV writing |
//! | [`cqt`] | Constant-Q magnitude spectrogram |
//! | [`spectrum`] | Amplitude/dB conversions |
//! | [`feature`] | [`FeatureExtractor`] and [`Spectrogram`] |
//! | [`dtw`] | Cost matrices, DTW search, [`WarpPath`] |
//! | [`mapping`] | Tick-to-frame scaling and [`TimeMapper`] |
//! | [`notes`] | Note list and aligned-note CSV files |
//! | [`manifest`] | Dataset manifest and directory layout |
//! | [`pipeline`] | Per-item alignment and the batch driver |
//! | [`convert`] | Pitch, frequency and frame/time conversions |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Nothing in the library panics on bad
//! input: empty note lists, mismatched sample rates and corrupt spectrograms
//! are all reported as [`Error`] variants.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` (default) | Batch rows run concurrently on a rayon pool |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod convert;
pub mod cqt;
pub mod dtw;
pub mod feature;
pub mod fft;
pub mod io;
pub mod manifest;
pub mod mapping;
pub mod notes;
pub mod pipeline;
pub mod spectrum;

mod table;

pub use config::AlignConfig;
pub use dtw::{Alignment, AlignmentEngine, WarpPath};
pub use feature::{FeatureExtractor, Spectrogram};
pub use mapping::{TickScale, TimeMapper};
pub use notes::{AlignedNote, Note};
pub use pipeline::Aligner;
