//! # Retime Pipeline
//!
//! The threaded stream-processing engine behind the retime transcoder.
//!
//! # Architecture
//!
//! Six stages run as parallel OS threads, one per stage instance, connected
//! by bounded blocking queues. Video and audio form independent
//! sub-pipelines that rejoin at the muxer:
//!
//! ```text
//!           ┌─ pkts ─▶ VDecode ─ frames ─▶ VProcess ─ frames ─▶ VEncode ─ pkts ─┐
//! Demux ────┤                                                                   ├─▶ Mux ─▶ file
//!           └─ pkts ─▶ ADecode ─ frames ─▶ AProcess ─ frames ─▶ AEncode ─ pkts ─┘
//! ```
//!
//! Backpressure comes from the queues: a slow stage blocks its upstream when
//! its input queue fills. Termination propagates forward: each stage finishes
//! its output queue when its input is closed and drained, so end-of-stream
//! rolls from the demuxer to the muxer with no separate signaling.
//!
//! Speed change keeps the two sub-pipelines in sync without any cross-stream
//! coordination: both processors consume the same `speed_factor` and both
//! regenerate PTS from their own emission counters (frames on the video side,
//! samples on the audio side), so the muxer's time bases land both streams on
//! the same wall clock.
//!
//! Codecs and containers are not implemented here: the stages drive them
//! through the trait seams in [`codec`], which an external codec library
//! implements.
//!
//! # Key components
//!
//! - [`Pipeline`] — assembler: builds stages, spawns threads, joins, reports
//! - [`PipelineConfig`] — the user-facing parameter set
//! - [`codec::CodecProvider`] — factory seam for the codec library
//! - [`VideoStage`] / [`AudioStage`] — the two processors where the real
//!   work (speed resampling, tempo change, PTS regeneration) happens

pub mod audio;
pub mod codec;
pub mod config;
pub mod decode;
pub mod demux;
pub mod encode;
pub mod error;
pub mod filters;
pub mod mux;
pub mod pipeline;
pub mod rotate;
pub mod video;

pub use audio::AudioStage;
pub use config::{PipelineConfig, MAX_SPEED, MIN_SPEED};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineReport};
pub use video::VideoStage;
