//! Collaborator seams for the codec library.
//!
//! The pipeline does not implement codecs or containers; it drives them
//! through the traits in this module. Decoders and encoders follow a
//! send/receive protocol: feed one item with `send` (or a flush marker with
//! `send(None)`), then drain with `receive` until it reports
//! [`CodecPoll::NeedInput`] or [`CodecPoll::Eof`].

use retime_core::{
    AudioFrame, AudioStreamParams, ContainerFormat, Packet, Result, StreamInfo, TargetAudioFormat,
    TimeBase, VideoCodec, VideoFrame, VideoStreamParams,
};
use std::path::Path;

/// One step of draining a codec.
#[derive(Debug)]
pub enum CodecPoll<T> {
    /// A decoded frame or encoded packet.
    Item(T),
    /// The codec wants more input before it can produce output.
    NeedInput,
    /// The codec is fully drained after a flush.
    Eof,
}

/// A decoder producing items of type `T` from packets.
pub trait Decoder<T>: Send {
    /// Submit a packet, or the flush marker (`None`) once input is exhausted.
    fn send(&mut self, packet: Option<&Packet>) -> Result<()>;

    /// Poll for the next decoded item.
    fn receive(&mut self) -> Result<CodecPoll<T>>;
}

/// An encoder consuming items of type `T` and producing packets.
pub trait Encoder<T>: Send {
    /// Submit an item, or the flush marker (`None`) once input is exhausted.
    fn send(&mut self, item: Option<&T>) -> Result<()>;

    /// Poll for the next encoded packet.
    fn receive(&mut self) -> Result<CodecPoll<Packet>>;
}

/// An opened input container.
pub trait MediaSource: Send {
    /// Stream descriptors probed at open time.
    fn stream_info(&self) -> &StreamInfo;

    /// Read the next packet; `None` at end of file.
    fn read_packet(&mut self) -> Result<Option<Packet>>;
}

/// A stream registered with an output container.
#[derive(Debug, Clone, Copy)]
pub struct StreamHandle {
    /// Stream index inside the output container.
    pub index: u32,
    /// Time base the container expects packet timestamps in.
    pub time_base: TimeBase,
}

/// An output container being written.
pub trait ContainerSink: Send {
    /// Register the video stream. Must be called before `write_header`.
    fn add_video_stream(
        &mut self,
        params: &VideoStreamParams,
        codec: VideoCodec,
        bitrate: u64,
    ) -> Result<StreamHandle>;

    /// Register the audio stream. Must be called before `write_header`.
    fn add_audio_stream(
        &mut self,
        params: &AudioStreamParams,
        codec: TargetAudioFormat,
        bitrate: u64,
    ) -> Result<StreamHandle>;

    /// Open the file and write the container header.
    fn write_header(&mut self) -> Result<()>;

    /// Write one packet; timestamps must already be in the stream time base.
    fn write_interleaved(&mut self, packet: Packet) -> Result<()>;

    /// Finalize the container.
    fn write_trailer(&mut self) -> Result<()>;
}

/// Parameters for constructing a video encoder.
#[derive(Debug, Clone)]
pub struct VideoEncoderParams {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: TimeBase,
    /// Target codec.
    pub codec: VideoCodec,
    /// Target bitrate in bits per second.
    pub bitrate: u64,
}

/// Parameters for constructing an audio encoder.
#[derive(Debug, Clone)]
pub struct AudioEncoderParams {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u32,
    /// Target bitrate in bits per second.
    pub bitrate: u64,
}

/// Factory for every external primitive the pipeline drives.
pub trait CodecProvider {
    /// Open and probe an input file.
    fn open_input(&self, path: &Path) -> Result<Box<dyn MediaSource>>;

    /// Construct a decoder for the probed video stream.
    fn open_video_decoder(
        &self,
        params: &VideoStreamParams,
    ) -> Result<Box<dyn Decoder<VideoFrame>>>;

    /// Construct a decoder for the probed audio stream.
    fn open_audio_decoder(
        &self,
        params: &AudioStreamParams,
    ) -> Result<Box<dyn Decoder<AudioFrame>>>;

    /// Construct a video encoder.
    fn open_video_encoder(
        &self,
        params: &VideoEncoderParams,
    ) -> Result<Box<dyn Encoder<VideoFrame>>>;

    /// Construct an audio encoder for a concrete target format.
    ///
    /// Never called with [`TargetAudioFormat::Copy`]; passthrough is wired at
    /// the packet level by the assembler.
    fn open_audio_encoder(
        &self,
        format: TargetAudioFormat,
        params: &AudioEncoderParams,
    ) -> Result<Box<dyn Encoder<AudioFrame>>>;

    /// Create an output container.
    fn open_output(&self, path: &Path, format: ContainerFormat) -> Result<Box<dyn ContainerSink>>;
}
