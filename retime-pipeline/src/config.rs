//! User-facing pipeline configuration.

use crate::error::{PipelineError, Result};
use retime_core::{ContainerFormat, TargetAudioFormat, VideoCodec};

/// Minimum accepted speed factor.
pub const MIN_SPEED: f64 = 0.1;
/// Maximum accepted speed factor.
pub const MAX_SPEED: f64 = 5.0;

/// All user-facing transcoding parameters.
///
/// The same `speed_factor` drives both the video frame resampler and the
/// audio tempo changer; A/V sync falls out of both processors regenerating
/// timestamps from their emission counters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Playback speed multiplier, applied identically to audio and video.
    pub speed_factor: f64,
    /// Rotation in degrees; 0 disables rotation.
    pub rotation_deg: f32,
    /// 3x3 box blur on luma.
    pub enable_blur: bool,
    /// 3x3 Laplacian sharpen on luma.
    pub enable_sharpen: bool,
    /// Neutralize chroma planes.
    pub enable_grayscale: bool,
    /// Luma gain; 1.0 is neutral.
    pub brightness: f32,
    /// Luma contrast about mid-gray; 1.0 is neutral.
    pub contrast: f32,
    /// Target video codec.
    pub video_codec: VideoCodec,
    /// Target audio format (or packet passthrough).
    pub audio_codec: TargetAudioFormat,
    /// Video bitrate in bits per second.
    pub video_bitrate: u64,
    /// Audio bitrate in bits per second.
    pub audio_bitrate: u64,
    /// Output container format.
    pub container: ContainerFormat,
    /// Stop demuxing after this many video packets; 0 processes everything.
    pub max_frames: u64,
    /// Capacity of every inter-stage queue, in items.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speed_factor: 1.0,
            rotation_deg: 0.0,
            enable_blur: false,
            enable_sharpen: false,
            enable_grayscale: false,
            brightness: 1.0,
            contrast: 1.0,
            video_codec: VideoCodec::Mpeg4,
            audio_codec: TargetAudioFormat::Ac3,
            video_bitrate: 800_000,
            audio_bitrate: 128_000,
            container: ContainerFormat::Avi,
            max_frames: 0,
            queue_capacity: 32,
        }
    }
}

impl PipelineConfig {
    /// Check all parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.speed_factor.is_finite()
            || !(MIN_SPEED..=MAX_SPEED).contains(&self.speed_factor)
        {
            return Err(PipelineError::Config(format!(
                "speed factor {} out of range [{}, {}]",
                self.speed_factor, MIN_SPEED, MAX_SPEED
            )));
        }
        if !self.rotation_deg.is_finite() {
            return Err(PipelineError::Config("rotation must be finite".into()));
        }
        for (name, value) in [("brightness", self.brightness), ("contrast", self.contrast)] {
            if !value.is_finite() || !(0.0..=2.0).contains(&value) {
                return Err(PipelineError::Config(format!(
                    "{} {} out of range [0.0, 2.0]",
                    name, value
                )));
            }
        }
        if self.queue_capacity == 0 {
            return Err(PipelineError::Config("queue capacity must be nonzero".into()));
        }
        Ok(())
    }

    /// Whether any pixel work is configured.
    pub fn has_pixel_work(&self) -> bool {
        self.rotation_deg != 0.0
            || self.enable_blur
            || self.enable_sharpen
            || self.enable_grayscale
            || self.brightness != 1.0
            || self.contrast != 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_speed_bounds_inclusive() {
        let mut config = PipelineConfig {
            speed_factor: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        config.speed_factor = 5.0;
        assert!(config.validate().is_ok());
        config.speed_factor = 5.01;
        assert!(config.validate().is_err());
        config.speed_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_brightness_contrast_ranges() {
        let mut config = PipelineConfig {
            brightness: 2.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.brightness = 1.0;
        config.contrast = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_has_pixel_work() {
        assert!(!PipelineConfig::default().has_pixel_work());
        let config = PipelineConfig {
            enable_grayscale: true,
            ..Default::default()
        };
        assert!(config.has_pixel_work());
    }
}
