//! # Retime Stretch
//!
//! Streaming pitch-preserving tempo change for the retime engine.
//!
//! The single exported processor, [`TempoStretcher`], implements WSOLA
//! (Waveform Similarity Overlap-Add): a time-domain technique that changes
//! playback speed without shifting pitch. It accepts and emits interleaved
//! 32-bit float samples and is fully streaming, so the audio pipeline stage
//! can feed it decoder output frame by frame.
//!
//! ## Example
//!
//! ```
//! use retime_stretch::TempoStretcher;
//!
//! // Play 48 kHz stereo twice as fast.
//! let mut stretcher = TempoStretcher::new(48000, 2, 2.0)?;
//!
//! let input = vec![0.0f32; 48000 * 2];
//! stretcher.put_samples(&input);
//! stretcher.flush();
//!
//! let mut out = vec![0.0f32; 4096];
//! let mut total = 0;
//! loop {
//!     let n = stretcher.receive_samples(&mut out);
//!     if n == 0 { break; }
//!     total += n;
//! }
//! assert_eq!(total, 24000);
//! # Ok::<(), retime_stretch::StretchError>(())
//! ```

pub mod error;
mod wsola;

pub use error::{Result, StretchError};
pub use wsola::{StretchParams, TempoStretcher, MAX_TEMPO, MIN_TEMPO};
