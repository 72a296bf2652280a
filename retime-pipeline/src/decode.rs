//! Decoder stage template, shared by the video and audio paths.

use crate::codec::{CodecPoll, Decoder};
use retime_core::{Packet, Queue};
use std::sync::Arc;
use tracing::{info, warn};

/// Run a decoder between its packet queue and its frame queue.
///
/// The loop submits each popped packet exactly once, drains the decoder after
/// every submission, and flushes it with a null submission when the input
/// queue closes so buffered tail frames are not lost. Transient decode errors
/// drop the offending item and keep the stage alive.
///
/// Both queues are finished on exit (the input queue too, so an upstream
/// blocked on a full queue cannot outlive its consumer). Returns the number
/// of frames pushed downstream.
pub fn run_decode_stage<T>(
    name: &str,
    mut decoder: Box<dyn Decoder<T>>,
    input: Arc<Queue<Packet>>,
    output: Arc<Queue<T>>,
) -> u64 {
    info!("{name} decode started");
    let mut produced = 0u64;

    'outer: loop {
        let packet = input.pop();
        let flushing = packet.is_none();

        match decoder.send(packet.as_ref()) {
            Ok(()) => {}
            Err(e) if e.is_transient() && !flushing => {
                warn!("{name} decode error, dropping packet: {e}");
                continue;
            }
            Err(e) => {
                warn!("{name} decoder failed, stopping: {e}");
                break;
            }
        }

        loop {
            match decoder.receive() {
                Ok(CodecPoll::Item(frame)) => {
                    if !output.push(frame) {
                        // Downstream stopped listening; drop and wind down.
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
                    warn!("{name} decode error, dropping frame: {e}");
                }
                Err(e) => {
                    warn!("{name} decoder failed, stopping: {e}");
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
    info!("{name} decode finished, {produced} frames");
    produced
}
