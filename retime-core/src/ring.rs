//! Fixed-frame audio ring buffer.
//!
//! The tempo changer emits a variable number of samples per input batch while
//! the audio encoder wants blocks of exactly `frame_size` samples. This ring
//! sits between them: interleaved float samples go in as they arrive and come
//! out only in whole frames. Reads are all-or-nothing; a partial tail is only
//! reachable through [`AudioRingBuffer::drain_remainder`] during flush.
//!
//! The buffer lives entirely inside the audio processor stage, so exclusivity
//! comes from ownership and no lock is needed.

/// Circular buffer of interleaved f32 samples with fixed-size frame reads.
pub struct AudioRingBuffer {
    buffer: Vec<f32>,
    frame_size: usize,
    channels: usize,
    read_pos: usize,
    write_pos: usize,
    /// Interleaved samples currently stored.
    available: usize,
}

impl AudioRingBuffer {
    /// Create a ring holding up to four output frames.
    ///
    /// # Panics
    ///
    /// Panics if `frame_size` or `channels` is zero.
    pub fn new(frame_size: usize, channels: usize) -> Self {
        assert!(frame_size > 0 && channels > 0);
        let capacity = frame_size * channels * 4;
        Self {
            buffer: vec![0.0; capacity],
            frame_size,
            channels,
            read_pos: 0,
            write_pos: 0,
            available: 0,
        }
    }

    /// Samples per channel in one output frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Total capacity in interleaved samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Append interleaved samples.
    ///
    /// Returns `false` without writing anything if the free space cannot hold
    /// the whole slice.
    pub fn write(&mut self, samples: &[f32]) -> bool {
        if self.available + samples.len() > self.buffer.len() {
            return false;
        }
        let cap = self.buffer.len();
        let first = (cap - self.write_pos).min(samples.len());
        self.buffer[self.write_pos..self.write_pos + first].copy_from_slice(&samples[..first]);
        let rest = samples.len() - first;
        if rest > 0 {
            self.buffer[..rest].copy_from_slice(&samples[first..]);
        }
        self.write_pos = (self.write_pos + samples.len()) % cap;
        self.available += samples.len();
        true
    }

    /// Read one full frame (`frame_size * channels` interleaved samples).
    ///
    /// Returns `false` and leaves `out` untouched unless a whole frame is
    /// available. `out` must hold at least one frame.
    pub fn read_frame(&mut self, out: &mut [f32]) -> bool {
        let need = self.frame_size * self.channels;
        debug_assert!(out.len() >= need);
        if self.available < need {
            return false;
        }
        self.copy_out_n(&mut out[..need]);
        true
    }

    /// Whether a full frame can currently be read.
    pub fn has_complete_frame(&self) -> bool {
        self.available >= self.frame_size * self.channels
    }

    /// Samples per channel currently stored.
    pub fn available_samples(&self) -> usize {
        self.available / self.channels
    }

    /// Pop whatever is stored (less than a frame, during flush) into `out`.
    ///
    /// Returns the number of interleaved samples written.
    pub fn drain_remainder(&mut self, out: &mut [f32]) -> usize {
        let n = self.available.min(out.len());
        self.copy_out_n(&mut out[..n]);
        n
    }

    /// Discard all stored samples.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.available = 0;
    }

    fn copy_out_n(&mut self, out: &mut [f32]) {
        let cap = self.buffer.len();
        let n = out.len();
        let first = (cap - self.read_pos).min(n);
        out[..first].copy_from_slice(&self.buffer[self.read_pos..self.read_pos + first]);
        let rest = n - first;
        if rest > 0 {
            out[first..].copy_from_slice(&self.buffer[..rest]);
        }
        self.read_pos = (self.read_pos + n) % cap;
        self.available -= n;
    }
}
