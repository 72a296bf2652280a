//! Muxer stage: interleave encoded packets by timestamp and write the
//! container.

use crate::codec::{ContainerSink, StreamHandle};
use retime_core::{Packet, Queue, TimeBase, NO_PTS};
use std::sync::Arc;
use tracing::{info, warn};

/// One packet source feeding the muxer.
pub struct MuxInput {
    /// Queue of encoded (or passed-through) packets.
    pub queue: Arc<Queue<Packet>>,
    /// Time base the packet timestamps arrive in.
    pub source_time_base: TimeBase,
    /// The registered output stream.
    pub stream: StreamHandle,
}

#[derive(Clone, Copy)]
enum StreamKind {
    Video,
    Audio,
}

struct StreamState {
    queue: Arc<Queue<Packet>>,
    source_tb: TimeBase,
    stream: StreamHandle,
    /// Presentation position of the last written packet, in seconds.
    position: f64,
    packet_count: i64,
    done: bool,
}

impl StreamState {
    fn new(input: MuxInput) -> Self {
        Self {
            queue: input.queue,
            source_tb: input.source_time_base,
            stream: input.stream,
            position: 0.0,
            packet_count: 0,
            done: false,
        }
    }
}

/// The muxer stage worker.
///
/// At each step the stream with the smaller current presentation position is
/// serviced (ties go to video), which keeps the container interleaving close
/// to presentation order even though the two sub-pipelines run free of each
/// other.
pub struct MuxStage {
    sink: Box<dyn ContainerSink>,
    video: Option<StreamState>,
    audio: Option<StreamState>,
}

impl MuxStage {
    /// Build the stage from a sink whose header has already been written.
    pub fn new(
        sink: Box<dyn ContainerSink>,
        video: Option<MuxInput>,
        audio: Option<MuxInput>,
    ) -> Self {
        Self {
            sink,
            video: video.map(StreamState::new),
            audio: audio.map(StreamState::new),
        }
    }

    /// Pick the stream to service next: the one with the smaller current
    /// position; video on ties.
    fn pick(&self) -> Option<StreamKind> {
        let video_pos = self.video.as_ref().filter(|s| !s.done).map(|s| s.position);
        let audio_pos = self.audio.as_ref().filter(|s| !s.done).map(|s| s.position);
        match (video_pos, audio_pos) {
            (Some(v), Some(a)) if v <= a => Some(StreamKind::Video),
            (Some(_), Some(_)) => Some(StreamKind::Audio),
            (Some(_), None) => Some(StreamKind::Video),
            (None, Some(_)) => Some(StreamKind::Audio),
            (None, None) => None,
        }
    }

    /// Run until both inputs are closed and drained, then write the trailer.
    ///
    /// Returns the number of packets written.
    pub fn run(mut self) -> u64 {
        info!("mux started");
        let mut written = 0u64;

        while let Some(kind) = self.pick() {
            let state = match kind {
                StreamKind::Video => self.video.as_mut().expect("picked video"),
                StreamKind::Audio => self.audio.as_mut().expect("picked audio"),
            };
            let Some(mut packet) = state.queue.pop() else {
                state.done = true;
                continue;
            };

            // A packet without a timestamp gets a synthetic one from the
            // per-stream packet counter.
            if !packet.has_pts() {
                packet.pts = state.packet_count;
            }
            if packet.dts == NO_PTS {
                packet.dts = packet.pts;
            }
            state.packet_count += 1;

            packet.stream_index = state.stream.index;
            let target = state.stream.time_base;
            packet.pts = state.source_tb.rescale(packet.pts, target);
            packet.dts = state.source_tb.rescale(packet.dts, target);
            packet.duration = state.source_tb.rescale(packet.duration, target);
            state.position = target.to_seconds(packet.pts);

            match self.sink.write_interleaved(packet) {
                Ok(()) => written += 1,
                Err(e) => warn!("mux write failed, dropping packet: {e}"),
            }
        }

        if let Err(e) = self.sink.write_trailer() {
            warn!("trailer write failed: {e}");
        }
        info!("mux finished, {written} packets written");
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::StreamHandle;
    use parking_lot::Mutex;
    use retime_core::{
        AudioStreamParams, Result as CoreResult, TargetAudioFormat, VideoCodec, VideoStreamParams,
    };

    #[derive(Default)]
    struct RecordingSink {
        written: Arc<Mutex<Vec<(u32, i64)>>>,
        trailer: Arc<Mutex<bool>>,
    }

    impl ContainerSink for RecordingSink {
        fn add_video_stream(
            &mut self,
            _params: &VideoStreamParams,
            _codec: VideoCodec,
            _bitrate: u64,
        ) -> CoreResult<StreamHandle> {
            unimplemented!("streams are registered by the assembler in these tests")
        }

        fn add_audio_stream(
            &mut self,
            _params: &AudioStreamParams,
            _codec: TargetAudioFormat,
            _bitrate: u64,
        ) -> CoreResult<StreamHandle> {
            unimplemented!("streams are registered by the assembler in these tests")
        }

        fn write_header(&mut self) -> CoreResult<()> {
            Ok(())
        }

        fn write_interleaved(&mut self, packet: Packet) -> CoreResult<()> {
            self.written.lock().push((packet.stream_index, packet.pts));
            Ok(())
        }

        fn write_trailer(&mut self) -> CoreResult<()> {
            *self.trailer.lock() = true;
            Ok(())
        }
    }

    fn packet(pts: i64) -> Packet {
        Packet::new(vec![0u8; 8]).with_timestamps(pts, pts).with_duration(1)
    }

    #[test]
    fn test_interleaves_by_presentation_time() {
        let sink = RecordingSink::default();
        let written = Arc::clone(&sink.written);
        let trailer = Arc::clone(&sink.trailer);

        // Video at 25 fps (PTS in frames), audio at 48 kHz (PTS in samples).
        let video_q = Arc::new(Queue::new(16));
        let audio_q = Arc::new(Queue::new(16));
        for i in 0..4 {
            video_q.push(packet(i));
        }
        video_q.finish();
        for i in 0..2 {
            audio_q.push(packet(i * 1536));
        }
        audio_q.finish();

        let stage = MuxStage::new(
            Box::new(sink),
            Some(MuxInput {
                queue: video_q,
                source_time_base: TimeBase::new(1, 25),
                stream: StreamHandle {
                    index: 0,
                    time_base: TimeBase::new(1, 25),
                },
            }),
            Some(MuxInput {
                queue: audio_q,
                source_time_base: TimeBase::new(1, 48000),
                stream: StreamHandle {
                    index: 1,
                    time_base: TimeBase::new(1, 48000),
                },
            }),
        );
        let count = stage.run();

        assert_eq!(count, 6);
        assert!(*trailer.lock());

        let order = written.lock().clone();
        // Positions track the last written packet: video wins the 0.0 tie
        // twice (v0 lands at 0.0), then audio catches up through 0.032 s,
        // then video drains.
        assert_eq!(
            order,
            vec![(0, 0), (0, 1), (1, 0), (1, 1536), (0, 2), (0, 3)]
        );
    }

    #[test]
    fn test_synthetic_pts_for_missing() {
        let sink = RecordingSink::default();
        let written = Arc::clone(&sink.written);

        let video_q = Arc::new(Queue::new(8));
        for _ in 0..3 {
            video_q.push(Packet::new(vec![1, 2, 3]));
        }
        video_q.finish();

        let stage = MuxStage::new(
            Box::new(sink),
            Some(MuxInput {
                queue: video_q,
                source_time_base: TimeBase::new(1, 25),
                stream: StreamHandle {
                    index: 0,
                    time_base: TimeBase::new(1, 25),
                },
            }),
            None,
        );
        stage.run();

        let pts: Vec<i64> = written.lock().iter().map(|(_, p)| *p).collect();
        assert_eq!(pts, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_queues_still_finalize() {
        let sink = RecordingSink::default();
        let trailer = Arc::clone(&sink.trailer);

        let video_q: Arc<Queue<Packet>> = Arc::new(Queue::new(4));
        video_q.finish();

        let stage = MuxStage::new(
            Box::new(sink),
            Some(MuxInput {
                queue: video_q,
                source_time_base: TimeBase::new(1, 25),
                stream: StreamHandle {
                    index: 0,
                    time_base: TimeBase::new(1, 25),
                },
            }),
            None,
        );
        assert_eq!(stage.run(), 0);
        assert!(*trailer.lock());
    }
}
