//! Error types for the tempo changer.

use thiserror::Error;

/// Errors raised while configuring the tempo changer.
#[derive(Error, Debug)]
pub enum StretchError {
    /// Tempo outside the supported range.
    #[error("Tempo {tempo} out of range [{min}, {max}]")]
    TempoOutOfRange {
        tempo: f64,
        min: f64,
        max: f64,
    },

    /// Invalid channel count.
    #[error("Invalid channel count: {0}")]
    InvalidChannels(usize),

    /// Invalid sample rate.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Result type alias for tempo changer operations.
pub type Result<T> = std::result::Result<T, StretchError>;
