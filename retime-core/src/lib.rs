//! # Retime Core
//!
//! Core types for the retime transcoding engine.
//!
//! This crate provides the building blocks shared by every pipeline stage:
//! - Error handling types
//! - Time base and timestamp arithmetic
//! - Packet and frame abstractions with owning, share-on-demand payloads
//! - The bounded blocking queue connecting stages
//! - The fixed-frame audio ring buffer used for re-packetization

pub mod error;
pub mod format;
pub mod frame;
pub mod packet;
pub mod queue;
pub mod ring;
pub mod sample;
pub mod timestamp;

pub use error::{Error, Result};
pub use format::{
    AudioStreamParams, ContainerFormat, SampleFormat, StreamInfo, TargetAudioFormat, VideoCodec,
    VideoStreamParams,
};
pub use frame::{PixelBuffer, PixelFormat, VideoFrame};
pub use packet::{Packet, PacketFlags};
pub use queue::Queue;
pub use ring::AudioRingBuffer;
pub use sample::AudioFrame;
pub use timestamp::{TimeBase, NO_PTS};
