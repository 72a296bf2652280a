//! Pipeline assembler: construct every stage, spawn the worker threads, join
//! them, and report.
//!
//! All fallible construction (probe, codec and container opens, processor
//! init) happens before any thread starts. A failure here aborts the whole
//! run with no stage ever spawned, which is the entire fatal-init policy:
//! once the threads exist, errors are local to their stage and the pipeline
//! always winds down through queue finish propagation.

use crate::audio::AudioStage;
use crate::codec::{
    AudioEncoderParams, CodecProvider, Decoder, Encoder, MediaSource, StreamHandle,
    VideoEncoderParams,
};
use crate::config::PipelineConfig;
use crate::decode::run_decode_stage;
use crate::demux::DemuxStage;
use crate::encode::{create_audio_encoder, run_encode_stage};
use crate::error::{PipelineError, Result};
use crate::mux::{MuxInput, MuxStage};
use crate::video::VideoStage;
use retime_core::{AudioFrame, Queue, TargetAudioFormat, TimeBase, VideoFrame};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::info;

/// Per-stage item counts gathered after all threads join.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineReport {
    /// Packets routed by the demuxer, per stream.
    pub video_packets: u64,
    /// Audio packets routed by the demuxer.
    pub audio_packets: u64,
    /// Frames out of the video decoder.
    pub video_frames_decoded: u64,
    /// Frames out of the audio decoder.
    pub audio_frames_decoded: u64,
    /// Frames emitted by the video processor (after speed resampling).
    pub video_frames_emitted: u64,
    /// Fixed-size frames emitted by the audio processor.
    pub audio_frames_emitted: u64,
    /// Packets out of the video encoder.
    pub video_packets_encoded: u64,
    /// Packets out of the audio encoder.
    pub audio_packets_encoded: u64,
    /// Packets the muxer wrote into the container.
    pub packets_written: u64,
}

struct VideoPath {
    decoder: Box<dyn Decoder<VideoFrame>>,
    stage: VideoStage,
    encoder: Box<dyn Encoder<VideoFrame>>,
    stream: StreamHandle,
    source_tb: TimeBase,
}

enum AudioPath {
    Transcode {
        decoder: Box<dyn Decoder<AudioFrame>>,
        stage: AudioStage,
        encoder: Box<dyn Encoder<AudioFrame>>,
        stream: StreamHandle,
        source_tb: TimeBase,
    },
    /// COPY target: demuxer packets go straight to the muxer.
    Passthrough {
        stream: StreamHandle,
        source_tb: TimeBase,
    },
}

/// The assembled transcoding pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Access the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transcode `input` into `output` using the given codec provider.
    ///
    /// Blocks until every stage thread has joined.
    pub fn run(
        &self,
        provider: &dyn CodecProvider,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineReport> {
        self.config.validate()?;

        let source: Box<dyn MediaSource> = provider.open_input(input)?;
        let stream_info = source.stream_info().clone();
        if !stream_info.has_any_stream() {
            return Err(PipelineError::NoStreams);
        }

        let mut sink = provider.open_output(output, self.config.container)?;

        let video_path = match &stream_info.video {
            Some(v) => {
                let decoder = provider.open_video_decoder(v)?;
                let encoder = provider.open_video_encoder(&VideoEncoderParams {
                    width: v.width,
                    height: v.height,
                    fps: v.fps,
                    codec: self.config.video_codec,
                    bitrate: self.config.video_bitrate,
                })?;
                let stream =
                    sink.add_video_stream(v, self.config.video_codec, self.config.video_bitrate)?;
                Some(VideoPath {
                    decoder,
                    stage: VideoStage::new(&self.config),
                    encoder,
                    stream,
                    // The processor rewrites PTS in frame units.
                    source_tb: v.fps.invert(),
                })
            }
            None => None,
        };

        let audio_path = match &stream_info.audio {
            Some(a) if self.config.audio_codec == TargetAudioFormat::Copy => {
                let stream =
                    sink.add_audio_stream(a, self.config.audio_codec, self.config.audio_bitrate)?;
                Some(AudioPath::Passthrough {
                    stream,
                    // Passed-through packets keep the input time base.
                    source_tb: a.time_base,
                })
            }
            Some(a) => {
                let decoder = provider.open_audio_decoder(a)?;
                let stage = AudioStage::new(a, &self.config)?;
                let encoder = create_audio_encoder(
                    provider,
                    self.config.audio_codec,
                    &AudioEncoderParams {
                        sample_rate: a.sample_rate,
                        channels: a.channels,
                        bitrate: self.config.audio_bitrate,
                    },
                )?;
                let stream =
                    sink.add_audio_stream(a, self.config.audio_codec, self.config.audio_bitrate)?;
                Some(AudioPath::Transcode {
                    decoder,
                    stage,
                    encoder,
                    stream,
                    // The processor rewrites PTS in sample units.
                    source_tb: TimeBase::per_sample(a.sample_rate),
                })
            }
            None => None,
        };

        sink.write_header()?;
        info!(
            "pipeline assembled: video={}, audio={}, speed={}x",
            stream_info.video.is_some(),
            stream_info.audio.is_some(),
            self.config.speed_factor
        );

        let cap = self.config.queue_capacity;
        let mut report = PipelineReport::default();

        // Queues, stage wiring, and mux inputs per path.
        let video_pkt_q = video_path.as_ref().map(|_| Arc::new(Queue::new(cap)));
        let audio_pkt_q = audio_path.as_ref().map(|_| Arc::new(Queue::new(cap)));

        let demux_handle = spawn_stage("demux", {
            let demux = DemuxStage::new(source, self.config.max_frames);
            let video_out = video_pkt_q.clone();
            let audio_out = audio_pkt_q.clone();
            move || demux.run(video_out, audio_out)
        })?;

        let mut video_mux = None;
        let mut audio_mux = None;
        let mut video_threads = None;
        let mut audio_threads = None;

        if let Some(path) = video_path {
            let frame_q = Arc::new(Queue::new(cap));
            let processed_q = Arc::new(Queue::new(cap));
            let encoded_q = Arc::new(Queue::new(cap));
            video_mux = Some(MuxInput {
                queue: Arc::clone(&encoded_q),
                source_time_base: path.source_tb,
                stream: path.stream,
            });
            video_threads = Some((
                spawn_stage("video-decode", {
                    let input = Arc::clone(video_pkt_q.as_ref().expect("video queue"));
                    let output = Arc::clone(&frame_q);
                    let decoder = path.decoder;
                    move || run_decode_stage("video", decoder, input, output)
                })?,
                spawn_stage("video-process", {
                    let output = Arc::clone(&processed_q);
                    let stage = path.stage;
                    move || stage.run(frame_q, output)
                })?,
                spawn_stage("video-encode", {
                    let output = Arc::clone(&encoded_q);
                    let encoder = path.encoder;
                    move || run_encode_stage("video", encoder, processed_q, output)
                })?,
            ));
        }

        match audio_path {
            Some(AudioPath::Transcode {
                decoder,
                stage,
                encoder,
                stream,
                source_tb,
            }) => {
                let frame_q = Arc::new(Queue::new(cap));
                let processed_q = Arc::new(Queue::new(cap));
                let encoded_q = Arc::new(Queue::new(cap));
                audio_mux = Some(MuxInput {
                    queue: Arc::clone(&encoded_q),
                    source_time_base: source_tb,
                    stream,
                });
                audio_threads = Some((
                    spawn_stage("audio-decode", {
                        let input = Arc::clone(audio_pkt_q.as_ref().expect("audio queue"));
                        let output = Arc::clone(&frame_q);
                        move || run_decode_stage("audio", decoder, input, output)
                    })?,
                    spawn_stage("audio-process", {
                        let output = Arc::clone(&processed_q);
                        move || stage.run(frame_q, output)
                    })?,
                    spawn_stage("audio-encode", {
                        let output = Arc::clone(&encoded_q);
                        move || run_encode_stage("audio", encoder, processed_q, output)
                    })?,
                ));
            }
            Some(AudioPath::Passthrough { stream, source_tb }) => {
                audio_mux = Some(MuxInput {
                    queue: Arc::clone(audio_pkt_q.as_ref().expect("audio queue")),
                    source_time_base: source_tb,
                    stream,
                });
            }
            None => {}
        }

        let mux_handle = spawn_stage("mux", {
            let stage = MuxStage::new(sink, video_mux, audio_mux);
            move || stage.run()
        })?;

        // Join in creation order, demux first, muxer last.
        let (video_packets, audio_packets) = join_stage(demux_handle, "demux")?;
        report.video_packets = video_packets;
        report.audio_packets = audio_packets;

        if let Some((decode, process, encode)) = video_threads {
            report.video_frames_decoded = join_stage(decode, "video-decode")?;
            report.video_frames_emitted = join_stage(process, "video-process")?;
            report.video_packets_encoded = join_stage(encode, "video-encode")?;
        }
        if let Some((decode, process, encode)) = audio_threads {
            report.audio_frames_decoded = join_stage(decode, "audio-decode")?;
            report.audio_frames_emitted = join_stage(process, "audio-process")?;
            report.audio_packets_encoded = join_stage(encode, "audio-encode")?;
        }
        report.packets_written = join_stage(mux_handle, "mux")?;

        info!(
            "pipeline complete: {} packets written",
            report.packets_written
        );
        Ok(report)
    }
}

fn spawn_stage<T, F>(name: &'static str, f: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(PipelineError::Io)
}

fn join_stage<T>(handle: JoinHandle<T>, name: &'static str) -> Result<T> {
    handle.join().map_err(|_| PipelineError::StagePanic(name))
}
