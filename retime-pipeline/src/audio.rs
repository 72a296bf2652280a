//! Audio processor stage: tempo change plus fixed-frame re-packetization.
//!
//! The tempo changer emits a variable number of samples per input frame while
//! the encoder needs blocks of exactly `frame_size` samples (1536 for AC3).
//! Decoded frames are interleaved into the tempo changer, its output is
//! staged in the ring buffer, and full frames are cut from the ring with
//! sample-counter timestamps. On flush, a final partial block is zero-padded.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use retime_core::{
    AudioFrame, AudioRingBuffer, AudioStreamParams, Error, Queue, SampleFormat,
};
use retime_stretch::TempoStretcher;
use std::sync::Arc;
use tracing::{info, warn};

/// The audio processor stage worker.
pub struct AudioStage {
    stretcher: TempoStretcher,
    ring: AudioRingBuffer,
    frame_size: usize,
    channels: usize,
    sample_rate: u32,

    /// Samples emitted so far; doubles as the next PTS.
    processed_samples: i64,
    interleave_buf: Vec<f32>,
    recv_buf: Vec<f32>,
    frame_buf: Vec<f32>,
}

impl AudioStage {
    /// Build the stage, validating the input format.
    ///
    /// The internal data path is planar float; any other decoded format is an
    /// init failure, per the engine's contract with the decoder.
    pub fn new(params: &AudioStreamParams, config: &PipelineConfig) -> Result<Self> {
        if params.sample_format != SampleFormat::F32p {
            return Err(PipelineError::Core(Error::unsupported(format!(
                "audio processor requires planar float input, got {}",
                params.sample_format
            ))));
        }
        let frame_size = config.audio_codec.frame_size().ok_or_else(|| {
            PipelineError::Config(format!(
                "audio target {} has no frame size; use packet passthrough",
                config.audio_codec
            ))
        })?;
        let channels = params.channels as usize;
        let stretcher = TempoStretcher::new(params.sample_rate, channels, config.speed_factor)?;

        Ok(Self {
            stretcher,
            ring: AudioRingBuffer::new(frame_size, channels),
            frame_size,
            channels,
            sample_rate: params.sample_rate,
            processed_samples: 0,
            interleave_buf: Vec::new(),
            recv_buf: vec![0.0; frame_size * channels],
            frame_buf: vec![0.0; frame_size * channels],
        })
    }

    /// Cut and emit every full frame currently in the ring.
    ///
    /// Returns `false` if the downstream queue refused a push.
    fn emit_full_frames(&mut self, output: &Queue<AudioFrame>, emitted: &mut u64) -> bool {
        while self.ring.read_frame(&mut self.frame_buf) {
            let mut frame =
                AudioFrame::from_interleaved(&self.frame_buf, self.channels, self.sample_rate);
            frame.pts = self.processed_samples;
            self.processed_samples += self.frame_size as i64;
            if !output.push(frame) {
                return false;
            }
            *emitted += 1;
        }
        true
    }

    /// Move everything the tempo changer has ready through the ring.
    fn drain_stretcher(&mut self, output: &Queue<AudioFrame>, emitted: &mut u64) -> bool {
        loop {
            let frames = self.stretcher.receive_samples(&mut self.recv_buf);
            if frames == 0 {
                return true;
            }
            // The ring is drained below a frame before each write, so a
            // chunk of at most one frame always fits.
            if !self.ring.write(&self.recv_buf[..frames * self.channels]) {
                warn!("ring buffer full, dropping {frames} samples");
            }
            if !self.emit_full_frames(output, emitted) {
                return false;
            }
        }
    }

    /// Emit the zero-padded final frame if the ring holds a partial tail.
    fn emit_remainder(&mut self, output: &Queue<AudioFrame>, emitted: &mut u64) {
        let remaining = self.ring.available_samples();
        if remaining == 0 {
            return;
        }
        self.frame_buf.fill(0.0);
        self.ring.drain_remainder(&mut self.frame_buf);
        self.ring.clear();

        let mut frame =
            AudioFrame::from_interleaved(&self.frame_buf, self.channels, self.sample_rate);
        frame.pts = self.processed_samples;
        self.processed_samples += self.frame_size as i64;
        if output.push(frame) {
            *emitted += 1;
        }
    }

    /// Run until the input queue closes. Returns emitted frame count.
    pub fn run(mut self, input: Arc<Queue<AudioFrame>>, output: Arc<Queue<AudioFrame>>) -> u64 {
        info!(
            "audio process started, tempo {}x, frame size {}",
            self.stretcher.tempo(),
            self.frame_size
        );
        let mut emitted = 0u64;
        let mut consumed = 0u64;

        while let Some(frame) = input.pop() {
            if frame.channels() != self.channels {
                warn!(
                    "audio frame with {} channels (expected {}), dropping",
                    frame.channels(),
                    self.channels
                );
                continue;
            }
            consumed += 1;
            self.interleave_buf.clear();
            frame.extend_interleaved(&mut self.interleave_buf);
            self.stretcher.put_samples(&self.interleave_buf);

            if !self.drain_stretcher(&output, &mut emitted) {
                input.finish();
                output.finish();
                info!("audio process stopped early, {emitted} frames emitted");
                return emitted;
            }
        }

        // Input exhausted: flush the tempo changer, drain the tail, pad the
        // final partial frame.
        self.stretcher.flush();
        if self.drain_stretcher(&output, &mut emitted) {
            self.emit_remainder(&output, &mut emitted);
        }

        input.finish();
        output.finish();
        info!(
            "audio process finished, {} frames in, {} frames out",
            consumed, emitted
        );
        emitted
    }
}
