//! Pipeline error types.

use retime_core::Error as CoreError;
use retime_stretch::StretchError;
use thiserror::Error;

/// Pipeline error type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Engine core error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Tempo changer error.
    #[error("Tempo changer: {0}")]
    Stretch(#[from] StretchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The input has neither a video nor an audio stream.
    #[error("Input has no usable streams")]
    NoStreams,

    /// A stage thread panicked.
    #[error("Stage thread panicked: {0}")]
    StagePanic(&'static str),
}

/// Pipeline result type.
pub type Result<T> = std::result::Result<T, PipelineError>;
