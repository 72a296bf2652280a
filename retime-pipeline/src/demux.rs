//! Demultiplexer stage: read the container, route packets by stream type.

use crate::codec::MediaSource;
use retime_core::{Packet, Queue};
use std::sync::Arc;
use tracing::{info, warn};

/// The demux stage worker.
pub struct DemuxStage {
    source: Box<dyn MediaSource>,
    video_index: Option<u32>,
    audio_index: Option<u32>,
    max_frames: u64,
}

impl DemuxStage {
    /// Build the stage from an opened source.
    ///
    /// `max_frames` caps the number of routed video packets; 0 means the
    /// whole file.
    pub fn new(source: Box<dyn MediaSource>, max_frames: u64) -> Self {
        let info = source.stream_info();
        let video_index = info.video.as_ref().map(|v| v.stream_index);
        let audio_index = info.audio.as_ref().map(|a| a.stream_index);
        Self {
            source,
            video_index,
            audio_index,
            max_frames,
        }
    }

    /// Run until end of file, a read error, or the video frame cap.
    ///
    /// Returns `(video_packets, audio_packets)` routed downstream. Both
    /// output queues are finished on exit.
    pub fn run(
        mut self,
        video_out: Option<Arc<Queue<Packet>>>,
        audio_out: Option<Arc<Queue<Packet>>>,
    ) -> (u64, u64) {
        info!("demux started");
        let mut video_count = 0u64;
        let mut audio_count = 0u64;
        let mut video_open = video_out.is_some();
        let mut audio_open = audio_out.is_some();

        while video_open || audio_open {
            let packet = match self.source.read_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => break,
                Err(e) => {
                    // A damaged tail is treated as end of stream.
                    warn!("demux read error, stopping: {e}");
                    break;
                }
            };

            if video_open && Some(packet.stream_index) == self.video_index {
                if video_out.as_ref().is_some_and(|q| q.push(packet)) {
                    video_count += 1;
                } else {
                    video_open = false;
                }
                if self.max_frames > 0 && video_count >= self.max_frames {
                    info!("video frame cap reached: {}", self.max_frames);
                    break;
                }
            } else if audio_open && Some(packet.stream_index) == self.audio_index {
                if audio_out.as_ref().is_some_and(|q| q.push(packet)) {
                    audio_count += 1;
                } else {
                    audio_open = false;
                }
            }
        }

        if let Some(q) = &video_out {
            q.finish();
        }
        if let Some(q) = &audio_out {
            q.finish();
        }
        info!(
            "demux finished, {} video / {} audio packets",
            video_count, audio_count
        );
        (video_count, audio_count)
    }
}
