//! Decoded audio frame abstractions.
//!
//! The engine processes audio as planar 32-bit float throughout (the tempo
//! changer and the AC3-family encoders both want float), so the frame type
//! stores one `Vec<f32>` per channel. Conversion to and from the interleaved
//! layout used by the tempo changer lives here as well.

use crate::timestamp::NO_PTS;
use std::fmt;

/// A decoded audio frame in planar f32 layout.
#[derive(Clone)]
pub struct AudioFrame {
    planes: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Presentation timestamp, in samples.
    pub pts: i64,
}

impl AudioFrame {
    /// Allocate a silent frame.
    pub fn new(channels: usize, nb_samples: usize, sample_rate: u32) -> Self {
        Self {
            planes: vec![vec![0.0; nb_samples]; channels],
            sample_rate,
            pts: NO_PTS,
        }
    }

    /// Build a planar frame from interleaved samples.
    ///
    /// `samples.len()` must be a multiple of `channels`.
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
        debug_assert!(channels > 0 && samples.len() % channels == 0);
        let nb_samples = samples.len() / channels;
        let mut planes = vec![Vec::with_capacity(nb_samples); channels];
        for chunk in samples.chunks_exact(channels) {
            for (ch, &value) in chunk.iter().enumerate() {
                planes[ch].push(value);
            }
        }
        Self {
            planes,
            sample_rate,
            pts: NO_PTS,
        }
    }

    /// Number of samples per channel.
    pub fn nb_samples(&self) -> usize {
        self.planes.first().map(|p| p.len()).unwrap_or(0)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Get one channel's samples.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.planes.get(index).map(|p| p.as_slice())
    }

    /// Get one channel's samples mutably.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.planes.get_mut(index).map(|p| p.as_mut_slice())
    }

    /// Append this frame's samples to `out` in interleaved order.
    pub fn extend_interleaved(&self, out: &mut Vec<f32>) {
        let nb = self.nb_samples();
        out.reserve(nb * self.channels());
        for i in 0..nb {
            for plane in &self.planes {
                out.push(plane[i]);
            }
        }
    }

    /// Duration of this frame in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.nb_samples() as f64 / self.sample_rate as f64
    }
}

impl fmt::Debug for AudioFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFrame")
            .field("nb_samples", &self.nb_samples())
            .field("channels", &self.channels())
            .field("sample_rate", &self.sample_rate)
            .field("pts", &self.pts)
            .finish()
    }
}
