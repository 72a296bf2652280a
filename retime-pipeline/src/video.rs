//! Video processor stage: speed resampling, pixel filters, PTS regeneration.

use crate::config::PipelineConfig;
use crate::filters;
use crate::rotate::{CpuRotator, Rotate};
use retime_core::{Queue, VideoFrame};
use std::sync::Arc;
use tracing::{info, warn};

/// The video processor stage worker.
///
/// Speed control resamples the frame sequence: input frame `i` contributes
/// `floor((i+1)/s) - floor(i/s)` output frames, which drops frames uniformly
/// for acceleration and duplicates them for deceleration, with a total of
/// `floor(N/s)` frames either way. Duplicates share pixel storage and differ
/// only in their timestamps.
///
/// Every emitted frame gets a regenerated linear PTS counted from 0 with
/// duration 1; the encoder's `1/fps` time base turns that into wall-clock
/// time.
pub struct VideoStage {
    speed_factor: f64,
    rotation_deg: f32,
    rotator: Option<Box<dyn Rotate>>,
    enable_blur: bool,
    enable_sharpen: bool,
    enable_grayscale: bool,
    brightness: f32,
    contrast: f32,

    /// Emission accumulator, in input frames.
    accumulator: f64,
    /// Output frame counter; doubles as the next PTS.
    total_output_frames: i64,
}

impl VideoStage {
    /// Build the stage from the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        let rotator: Option<Box<dyn Rotate>> = if config.rotation_deg != 0.0 {
            Some(Box::new(CpuRotator::new()))
        } else {
            None
        };
        Self {
            speed_factor: config.speed_factor,
            rotation_deg: config.rotation_deg,
            rotator,
            enable_blur: config.enable_blur,
            enable_sharpen: config.enable_sharpen,
            enable_grayscale: config.enable_grayscale,
            brightness: config.brightness,
            contrast: config.contrast,
            accumulator: 0.0,
            total_output_frames: 0,
        }
    }

    /// Replace the rotation backend (e.g. with a GPU implementation).
    pub fn with_rotator(mut self, rotator: Box<dyn Rotate>) -> Self {
        self.rotator = Some(rotator);
        self
    }

    /// How many output frames the next input frame produces.
    fn emit_count(&mut self) -> usize {
        let ratio = 1.0 / self.speed_factor;
        let prev = (self.accumulator * ratio).floor() as i64;
        self.accumulator += 1.0;
        let next = (self.accumulator * ratio).floor() as i64;
        (next - prev) as usize
    }

    /// Apply the configured pixel operations to a kept frame, in order:
    /// rotation, grayscale, brightness/contrast, blur, sharpen.
    fn process_pixels(&mut self, frame: VideoFrame) -> VideoFrame {
        let mut frame = match &mut self.rotator {
            Some(rotator) => match rotator.rotate(&frame, self.rotation_deg) {
                Ok(rotated) => rotated,
                Err(e) => {
                    warn!("rotation failed, passing frame through: {e}");
                    frame
                }
            },
            None => frame,
        };

        if self.enable_grayscale {
            filters::apply_grayscale(&mut frame);
        }
        if self.brightness != 1.0 || self.contrast != 1.0 {
            filters::apply_brightness_contrast(&mut frame, self.brightness, self.contrast);
        }
        if self.enable_blur {
            filters::apply_box_blur(&mut frame);
        }
        if self.enable_sharpen {
            filters::apply_sharpen(&mut frame);
        }
        frame
    }

    /// Run until the input queue closes. Returns emitted frame count.
    pub fn run(mut self, input: Arc<Queue<VideoFrame>>, output: Arc<Queue<VideoFrame>>) -> u64 {
        info!(
            "video process started, speed {}x, rotation {} deg",
            self.speed_factor, self.rotation_deg
        );

        'outer: while let Some(frame) = input.pop() {
            let copies = self.emit_count();
            if copies == 0 {
                continue;
            }

            // Pixel work once per kept frame; duplicates share the buffer.
            let processed = self.process_pixels(frame);
            for _ in 0..copies {
                let mut out = processed.clone();
                out.pts = self.total_output_frames;
                out.duration = 1;
                self.total_output_frames += 1;
                if !output.push(out) {
                    break 'outer;
                }
            }
        }

        input.finish();
        output.finish();
        info!(
            "video process finished, {} frames emitted",
            self.total_output_frames
        );
        self.total_output_frames as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use retime_core::PixelFormat;

    fn config_with_speed(speed: f64) -> PipelineConfig {
        PipelineConfig {
            speed_factor: speed,
            ..Default::default()
        }
    }

    fn run_stage(config: &PipelineConfig, frames: usize) -> Vec<VideoFrame> {
        let stage = VideoStage::new(config);
        let input = Arc::new(Queue::new(frames.max(1)));
        let output = Arc::new(Queue::new(frames.max(1) * 12));
        for i in 0..frames {
            let mut frame = VideoFrame::new(16, 16, PixelFormat::Yuv420p);
            frame.pts = (i * 1000) as i64; // arbitrary input timestamps
            input.push(frame);
        }
        input.finish();
        stage.run(input, Arc::clone(&output));

        let mut out = Vec::new();
        while let Some(f) = output.pop() {
            out.push(f);
        }
        out
    }

    #[test]
    fn test_passthrough_at_unit_speed() {
        let out = run_stage(&config_with_speed(1.0), 100);
        assert_eq!(out.len(), 100);
        for (i, frame) in out.iter().enumerate() {
            assert_eq!(frame.pts, i as i64);
            assert_eq!(frame.duration, 1);
        }
    }

    #[test]
    fn test_double_speed_halves_count() {
        let out = run_stage(&config_with_speed(2.0), 100);
        assert_eq!(out.len(), 50);
        let pts: Vec<i64> = out.iter().map(|f| f.pts).collect();
        assert_eq!(pts, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_half_speed_duplicates() {
        let out = run_stage(&config_with_speed(0.5), 100);
        assert_eq!(out.len(), 200);
        // Adjacent duplicates share storage but carry distinct PTS.
        assert!(out[0].shares_buffer(&out[1]));
        assert!(!out[1].shares_buffer(&out[2]));
        let pts: Vec<i64> = out.iter().map(|f| f.pts).collect();
        assert_eq!(pts, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_speed_1_5_keeps_two_of_three() {
        let out = run_stage(&config_with_speed(1.5), 99);
        assert_eq!(out.len(), 66);
    }

    #[test]
    fn test_extreme_speeds() {
        assert_eq!(run_stage(&config_with_speed(5.0), 100).len(), 20);
        assert_eq!(run_stage(&config_with_speed(0.1), 10).len(), 100);
    }

    #[test]
    fn test_grayscale_applied_to_output() {
        let config = PipelineConfig {
            enable_grayscale: true,
            ..Default::default()
        };
        let out = run_stage(&config, 3);
        for frame in &out {
            assert!(frame.plane(1).unwrap().iter().all(|&v| v == 128));
            assert!(frame.plane(2).unwrap().iter().all(|&v| v == 128));
        }
    }

    proptest! {
        /// Emitted count is floor(N/s) within one frame for any speed.
        #[test]
        fn emitted_count_matches_floor(
            frames in 0usize..400,
            speed in 0.1f64..5.0,
        ) {
            let out = run_stage(&config_with_speed(speed), frames);
            let expected = (frames as f64 / speed).floor() as i64;
            prop_assert!((out.len() as i64 - expected).abs() <= 1);

            // PTS are always exactly 0..N.
            for (i, frame) in out.iter().enumerate() {
                prop_assert_eq!(frame.pts, i as i64);
            }
        }
    }
}
