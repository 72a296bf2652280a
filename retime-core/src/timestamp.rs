//! Time base arithmetic for timestamp rescaling.
//!
//! Timestamps in the engine are plain `i64` tick counts; a [`TimeBase`] gives
//! the duration of one tick. Video streams regenerate PTS in frame units
//! (time base `1/fps`), audio streams in sample units (`1/sample_rate`), and
//! the muxer rescales both into the output stream time bases.

use std::cmp::Ordering;
use std::fmt;

/// Sentinel for an undefined timestamp.
pub const NO_PTS: i64 = i64::MIN;

/// A rational time base: one tick lasts `num / den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBase {
    /// Numerator.
    pub num: i32,
    /// Denominator (always positive).
    pub den: i32,
}

impl TimeBase {
    /// Create a new time base.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    pub fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "time base denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self { num, den }
    }

    /// Millisecond time base (1/1000).
    pub const MILLIS: Self = Self { num: 1, den: 1000 };

    /// Time base for an audio stream: one tick per sample.
    pub fn per_sample(sample_rate: u32) -> Self {
        Self::new(1, sample_rate as i32)
    }

    /// The inverted rate, e.g. a 25/1 frame rate becomes the 1/25 time base.
    pub fn invert(&self) -> Self {
        Self::new(self.den, self.num)
    }

    /// Rescale a tick count from this time base into another.
    ///
    /// Computed in 128-bit intermediates; `NO_PTS` passes through unchanged.
    pub fn rescale(&self, value: i64, target: TimeBase) -> i64 {
        if value == NO_PTS {
            return NO_PTS;
        }
        let num = value as i128 * self.num as i128 * target.den as i128;
        let den = self.den as i128 * target.num as i128;
        (num / den) as i64
    }

    /// Convert a tick count to seconds.
    pub fn to_seconds(&self, value: i64) -> f64 {
        value as f64 * self.num as f64 / self.den as f64
    }

    /// The value of this time base as a float (seconds per tick).
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialOrd for TimeBase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeBase {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for TimeBase {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_frames_to_millis() {
        // Frame 50 at 25 fps is at the 2000 ms mark.
        let frames = TimeBase::new(1, 25);
        assert_eq!(frames.rescale(50, TimeBase::MILLIS), 2000);
    }

    #[test]
    fn test_rescale_samples() {
        let samples = TimeBase::per_sample(48000);
        assert_eq!(samples.rescale(48000, TimeBase::MILLIS), 1000);
        assert_eq!(samples.rescale(1536, TimeBase::new(1, 48000)), 1536);
    }

    #[test]
    fn test_rescale_no_pts() {
        let tb = TimeBase::new(1, 25);
        assert_eq!(tb.rescale(NO_PTS, TimeBase::MILLIS), NO_PTS);
    }

    #[test]
    fn test_invert() {
        let fps = TimeBase::new(30000, 1001);
        let tb = fps.invert();
        assert_eq!(tb, TimeBase::new(1001, 30000));
    }

    #[test]
    fn test_negative_den_normalized() {
        let tb = TimeBase::new(1, -25);
        assert_eq!(tb.num, -1);
        assert_eq!(tb.den, 25);
    }

    #[test]
    fn test_to_seconds() {
        let tb = TimeBase::new(1, 48000);
        assert!((tb.to_seconds(96000) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ordering() {
        assert!(TimeBase::new(1, 25) > TimeBase::new(1, 48000));
    }
}
