/// Crate-level error type for the quaver constant-Q spectrogram library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// Frequency range is invalid.
    #[error("invalid frequency range: fmin={fmin}, fmax={fmax} ({reason})")]
    InvalidFrequencyRange {
        fmin: f32,
        fmax: f32,
        reason: String,
    },

    /// A spectral kernel does not fit the per-octave FFT window.
    ///
    /// Indicates an inconsistent parameter combination (typically a
    /// `q_factor` too large for the chosen bin layout). The kernel is
    /// never silently truncated.
    #[error(
        "spectral kernel for bin {bin} spans {required} samples \
         but only {capacity} fit the per-octave FFT window"
    )]
    KernelOverflow {
        bin: usize,
        required: usize,
        capacity: usize,
    },

    /// The transform was cancelled before completion.
    #[error("transform cancelled")]
    Cancelled,

    /// Audio I/O errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for quaver operations.
pub type Result<T> = std::result::Result<T, Error>;
