//! Error types for the retime engine.

use thiserror::Error;

/// Main error type shared across the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be opened or probed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Codec-level failure (decode or encode).
    #[error("Codec error: {0}")]
    Codec(String),

    /// Container-level failure (demux or mux).
    #[error("Container error: {0}")]
    Container(String),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported feature or format.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// End of stream reached.
    #[error("End of stream")]
    EndOfStream,
}

/// Result type alias using the engine error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Check if this is an end-of-stream error.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }

    /// Check if a stage may drop the offending item and keep running.
    ///
    /// Codec errors are per-item; everything else terminates the stage loop.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Codec(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("speed out of range".into());
        assert_eq!(err.to_string(), "Invalid parameter: speed out of range");
    }

    #[test]
    fn test_is_eof() {
        assert!(Error::EndOfStream.is_eof());
        assert!(!Error::Codec("bad frame".into()).is_eof());
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::Codec("bitstream damage".into()).is_transient());
        assert!(!Error::Probe("no such file".into()).is_transient());
        assert!(!Error::EndOfStream.is_transient());
    }
}
