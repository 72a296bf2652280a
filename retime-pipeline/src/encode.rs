//! Encoder stage template, shared by the video and audio paths.

use crate::codec::{AudioEncoderParams, CodecPoll, CodecProvider, Encoder};
use crate::error::{PipelineError, Result};
use retime_core::{AudioFrame, Error, Packet, Queue, TargetAudioFormat};
use std::sync::Arc;
use tracing::{info, warn};

/// Audio encoder factory dispatching on the target format.
///
/// COPY never reaches a frame-level encoder: the assembler routes source
/// packets straight to the muxer instead, so asking for one is a
/// configuration error.
pub fn create_audio_encoder(
    provider: &dyn CodecProvider,
    format: TargetAudioFormat,
    params: &AudioEncoderParams,
) -> Result<Box<dyn Encoder<AudioFrame>>> {
    match format {
        TargetAudioFormat::Copy => Err(PipelineError::Core(Error::unsupported(
            "copy target is packet-level passthrough, not a frame encoder",
        ))),
        other => Ok(provider.open_audio_encoder(other, params)?),
    }
}

/// Run an encoder between its frame queue and its packet queue.
///
/// Mirrors the decode stage: submit, drain, flush with a null submission on
/// input close. A transient submit error (for instance an AC3 encoder
/// rejecting a block that is not exactly its frame size) drops the frame and
/// keeps the stage alive.
///
/// Both queues are finished on exit. Returns the number of packets pushed
/// downstream.
pub fn run_encode_stage<T>(
    name: &str,
    mut encoder: Box<dyn Encoder<T>>,
    input: Arc<Queue<T>>,
    output: Arc<Queue<Packet>>,
) -> u64 {
    info!("{name} encode started");
    let mut produced = 0u64;

    'outer: loop {
        let frame = input.pop();
        let flushing = frame.is_none();

        match encoder.send(frame.as_ref()) {
            Ok(()) => {}
            Err(e) if e.is_transient() && !flushing => {
                warn!("{name} encode error, dropping frame: {e}");
                continue;
            }
            Err(e) => {
                warn!("{name} encoder failed, stopping: {e}");
                break;
            }
        }

        loop {
            match encoder.receive() {
                Ok(CodecPoll::Item(packet)) => {
                    if !output.push(packet) {
                        break 'outer;
                    }
                    produced += 1;
                }
                Ok(CodecPoll::NeedInput) => {
                    if flushing {
                        break 'outer;
                    }
                    break;
                }
                Ok(CodecPoll::Eof) => break 'outer,
                Err(e) if e.is_transient() => {
                    warn!("{name} encode error, dropping packet: {e}");
                }
                Err(e) => {
                    warn!("{name} encoder failed, stopping: {e}");
                    break 'outer;
                }
            }
        }

        if flushing {
            break;
        }
    }

    input.finish();
    output.finish();
    info!("{name} encode finished, {produced} packets");
    produced
}
