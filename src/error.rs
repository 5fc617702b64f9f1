use std::path::PathBuf;

/// Crate-level error type for score alignment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// A spectrogram handed to the aligner contains NaN or Inf.
    #[error("{which} spectrogram contains a non-finite value at bin {bin}, frame {frame}")]
    NonFiniteSpectrogram {
        which: &'static str,
        bin: usize,
        frame: usize,
    },

    /// Input array has incorrect shape for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// The recording and its synthesized rendition disagree on sample rate.
    #[error("sample rate mismatch: recording is {real} Hz, synthesized audio is {synth} Hz")]
    SampleRateMismatch { real: u32, synth: u32 },

    /// The note list has no entries.
    #[error("note list is empty")]
    NoNotes,

    /// Every note ends at tick zero, so ticks cannot be scaled to frames.
    #[error("maximum offset tick is zero; cannot scale ticks to frames")]
    ZeroDuration,

    /// A warp path violates the monotone, boundary-anchored shape.
    #[error("invalid warp path at step {step}: {reason}")]
    InvalidWarpPath { step: usize, reason: String },

    /// A CSV input could not be parsed.
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Audio I/O errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// Reading a `.npy` artifact failed.
    #[error("npy read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// Writing a `.npy` artifact failed.
    #[error("npy write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for score-align operations.
pub type Result<T> = std::result::Result<T, Error>;
