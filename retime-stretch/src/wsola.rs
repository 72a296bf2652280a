//! Streaming WSOLA time stretcher.
//!
//! Waveform Similarity Overlap-Add: the input is carved into overlapping
//! sequences; each output sequence is taken from the position inside a small
//! seek window whose waveform best matches the tail of the previous output
//! sequence, then crossfaded over the overlap region. Advancing the input
//! read position by `(sequence - overlap) * tempo` per emitted sequence
//! scales duration by `1 / tempo` while leaving pitch untouched.
//!
//! The stretcher is streaming: feed interleaved f32 samples with
//! [`TempoStretcher::put_samples`], collect output with
//! [`TempoStretcher::receive_samples`], and call [`TempoStretcher::flush`]
//! once the input is exhausted. After the flush, the total output length is
//! exactly `floor(total_input / tempo)` sample frames.

use crate::error::{Result, StretchError};

/// Analysis window lengths in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct StretchParams {
    /// Length of one overlap-add sequence.
    pub sequence_ms: u32,
    /// Search range for the best overlap position.
    pub seek_window_ms: u32,
    /// Crossfade length between adjacent sequences.
    pub overlap_ms: u32,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            sequence_ms: 40,
            seek_window_ms: 15,
            overlap_ms: 8,
        }
    }
}

/// Minimum tempo accepted by the stretcher.
pub const MIN_TEMPO: f64 = 0.1;
/// Maximum tempo accepted by the stretcher.
pub const MAX_TEMPO: f64 = 10.0;

/// Correlation is evaluated on every Nth sample of the overlap window.
const CORR_DECIMATION: usize = 4;

/// Streaming pitch-preserving tempo changer for interleaved f32 audio.
pub struct TempoStretcher {
    channels: usize,
    tempo: f64,

    /// Per-channel window lengths in samples.
    sequence: usize,
    seek_window: usize,
    overlap: usize,
    /// Input needed (per channel) before a sequence can be produced.
    min_input: usize,

    /// Interleaved input FIFO; `in_head` is the absolute read offset, which
    /// may run ahead of the data at high tempos.
    input: Vec<f32>,
    in_head: usize,

    /// Interleaved output FIFO with its read offset.
    output: Vec<f32>,
    out_head: usize,

    /// Last `overlap` frames of the previous output sequence, not yet
    /// emitted; crossfaded into the next sequence.
    prev_tail: Vec<f32>,
    has_tail: bool,

    /// Fractional remainder of the input stride.
    skip_acc: f64,

    /// Sample frames fed and emitted since construction.
    fed: usize,
    emitted: usize,
    flushed: bool,
}

impl TempoStretcher {
    /// Create a stretcher with default window parameters.
    pub fn new(sample_rate: u32, channels: usize, tempo: f64) -> Result<Self> {
        Self::with_params(sample_rate, channels, tempo, StretchParams::default())
    }

    /// Create a stretcher with explicit window parameters.
    pub fn with_params(
        sample_rate: u32,
        channels: usize,
        tempo: f64,
        params: StretchParams,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(StretchError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 || channels > 8 {
            return Err(StretchError::InvalidChannels(channels));
        }
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&tempo) || !tempo.is_finite() {
            return Err(StretchError::TempoOutOfRange {
                tempo,
                min: MIN_TEMPO,
                max: MAX_TEMPO,
            });
        }

        let ms = |v: u32| (sample_rate as usize * v as usize) / 1000;
        let overlap = ms(params.overlap_ms).max(4);
        let sequence = ms(params.sequence_ms).max(3 * overlap);
        let seek_window = ms(params.seek_window_ms).max(8);
        // A sequence needs seek room on top of its own length, and the input
        // stride at high tempos can be longer than both.
        let stride = ((sequence - overlap) as f64 * tempo).ceil() as usize + 1;
        let min_input = (sequence + seek_window).max(stride);

        Ok(Self {
            channels,
            tempo,
            sequence,
            seek_window,
            overlap,
            min_input,
            input: Vec::new(),
            in_head: 0,
            output: Vec::new(),
            out_head: 0,
            prev_tail: vec![0.0; overlap * channels],
            has_tail: false,
            skip_acc: 0.0,
            fed: 0,
            emitted: 0,
            flushed: false,
        })
    }

    /// The configured tempo factor.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// The configured channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Feed interleaved samples.
    ///
    /// # Panics
    ///
    /// Panics if `samples.len()` is not a multiple of the channel count.
    pub fn put_samples(&mut self, samples: &[f32]) {
        assert!(
            samples.len() % self.channels == 0,
            "input not a whole number of sample frames"
        );
        if self.flushed {
            return;
        }
        self.input.extend_from_slice(samples);
        self.fed += samples.len() / self.channels;
        self.process();
    }

    /// Sample frames ready to be received.
    pub fn available(&self) -> usize {
        (self.output.len() - self.out_head) / self.channels
    }

    /// Copy up to `out.len() / channels` processed sample frames into `out`.
    ///
    /// Returns the number of sample frames written.
    pub fn receive_samples(&mut self, out: &mut [f32]) -> usize {
        let frames = self.available().min(out.len() / self.channels);
        let n = frames * self.channels;
        out[..n].copy_from_slice(&self.output[self.out_head..self.out_head + n]);
        self.out_head += n;
        if self.out_head > 0 && self.out_head == self.output.len() {
            self.output.clear();
            self.out_head = 0;
        }
        frames
    }

    /// Drain the remaining input, padding with silence as needed, so that the
    /// total emitted length reaches exactly `floor(fed / tempo)` frames.
    ///
    /// Further `put_samples` calls after the flush are ignored.
    pub fn flush(&mut self) {
        if self.flushed {
            return;
        }
        self.flushed = true;

        let target = (self.fed as f64 / self.tempo).floor() as usize;
        while self.emitted < target {
            let pad = self.min_input * self.channels;
            self.input.extend(std::iter::repeat(0.0).take(pad));
            self.process();
        }
        // The padded iterations can run past the target; everything beyond it
        // is synthetic silence produced just now, so it is safe to cut.
        let excess = (self.emitted - target) * self.channels;
        self.output.truncate(self.output.len() - excess);
        self.emitted = target;
    }

    fn avail_input(&self) -> usize {
        self.input.len().saturating_sub(self.in_head) / self.channels
    }

    /// Produce output sequences while enough input is buffered.
    fn process(&mut self) {
        let c = self.channels;
        while self.avail_input() >= self.min_input {
            let base = self.in_head;
            let offset = if self.has_tail { self.best_offset(base) } else { 0 };
            let win = base + offset * c;

            if self.has_tail {
                // Crossfade the stored tail into the chosen window.
                let fade_len = self.overlap;
                for i in 0..fade_len {
                    let fade = (i + 1) as f32 / (fade_len + 1) as f32;
                    for ch in 0..c {
                        let a = self.prev_tail[i * c + ch];
                        let b = self.input[win + i * c + ch];
                        self.output.push(a * (1.0 - fade) + b * fade);
                    }
                }
            } else {
                self.output
                    .extend_from_slice(&self.input[win..win + self.overlap * c]);
            }

            let direct_start = win + self.overlap * c;
            let direct_end = win + (self.sequence - self.overlap) * c;
            self.output
                .extend_from_slice(&self.input[direct_start..direct_end]);

            self.prev_tail
                .copy_from_slice(&self.input[direct_end..win + self.sequence * c]);
            self.has_tail = true;

            self.emitted += self.sequence - self.overlap;

            self.skip_acc += (self.sequence - self.overlap) as f64 * self.tempo;
            let skip = self.skip_acc as usize;
            self.skip_acc -= skip as f64;
            self.in_head += skip * c;
        }

        // Reclaim consumed input.
        let drop = self.in_head.min(self.input.len());
        if drop > 4096 * c {
            self.input.drain(..drop);
            self.in_head -= drop;
        }
    }

    /// Find the window offset whose waveform best continues the stored tail.
    fn best_offset(&self, base: usize) -> usize {
        let c = self.channels;
        let span = self.overlap * c;
        let mut best = 0usize;
        let mut best_score = f64::MIN;

        for offset in 0..self.seek_window {
            let start = base + offset * c;
            let window = &self.input[start..start + span];
            let mut corr = 0.0f64;
            let mut norm = 0.0f64;
            let mut i = 0;
            while i < span {
                let a = self.prev_tail[i] as f64;
                let b = window[i] as f64;
                corr += a * b;
                norm += b * b;
                i += CORR_DECIMATION;
            }
            let score = corr / norm.sqrt().max(1e-9);
            if score > best_score {
                best_score = score;
                best = offset;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, channels: usize, freq: f64, rate: f64) -> Vec<f32> {
        let mut out = Vec::with_capacity(len * channels);
        for i in 0..len {
            let s = (2.0 * std::f64::consts::PI * freq * i as f64 / rate).sin() as f32;
            for _ in 0..channels {
                out.push(s);
            }
        }
        out
    }

    fn run_total(rate: u32, channels: usize, tempo: f64, frames: usize) -> usize {
        let mut st = TempoStretcher::new(rate, channels, tempo).unwrap();
        let input = sine(frames, channels, 440.0, rate as f64);
        let mut received = 0usize;
        let mut buf = vec![0.0f32; 2048 * channels];

        for chunk in input.chunks(1000 * channels) {
            st.put_samples(chunk);
            loop {
                let n = st.receive_samples(&mut buf);
                if n == 0 {
                    break;
                }
                received += n;
            }
        }
        st.flush();
        loop {
            let n = st.receive_samples(&mut buf);
            if n == 0 {
                break;
            }
            received += n;
        }
        received
    }

    #[test]
    fn test_identity_tempo_length() {
        assert_eq!(run_total(48000, 2, 1.0, 48000), 48000);
    }

    #[test]
    fn test_double_tempo_halves_length() {
        assert_eq!(run_total(48000, 2, 2.0, 96000), 48000);
    }

    #[test]
    fn test_half_tempo_doubles_length() {
        assert_eq!(run_total(48000, 1, 0.5, 24000), 48000);
    }

    #[test]
    fn test_extreme_tempos() {
        assert_eq!(run_total(48000, 2, 5.0, 48000), 9600);
        assert_eq!(run_total(48000, 2, 0.1, 4800), 48000);
    }

    #[test]
    fn test_tiny_input_flush() {
        // Ten frames at tempo 1.0: flush must synthesize exactly ten.
        assert_eq!(run_total(48000, 2, 1.0, 10), 10);
    }

    #[test]
    fn test_empty_input_flush() {
        let mut st = TempoStretcher::new(48000, 2, 1.5).unwrap();
        st.flush();
        assert_eq!(st.available(), 0);
    }

    #[test]
    fn test_flush_idempotent() {
        let mut st = TempoStretcher::new(44100, 1, 2.0).unwrap();
        st.put_samples(&sine(5000, 1, 220.0, 44100.0));
        st.flush();
        let first = st.available();
        st.flush();
        assert_eq!(st.available(), first);
        assert_eq!(first, 2500);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(TempoStretcher::new(0, 2, 1.0).is_err());
        assert!(TempoStretcher::new(48000, 0, 1.0).is_err());
        assert!(TempoStretcher::new(48000, 2, 0.01).is_err());
        assert!(TempoStretcher::new(48000, 2, 25.0).is_err());
    }

    #[test]
    fn test_output_amplitude_bounded() {
        // Overlap-add of a bounded signal must stay bounded.
        let mut st = TempoStretcher::new(48000, 1, 0.5).unwrap();
        st.put_samples(&sine(48000, 1, 1000.0, 48000.0));
        st.flush();
        let mut buf = vec![0.0f32; 4096];
        loop {
            let n = st.receive_samples(&mut buf);
            if n == 0 {
                break;
            }
            assert!(buf[..n].iter().all(|s| s.abs() <= 1.01));
        }
    }
}
