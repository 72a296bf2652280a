//! Frame rotation.
//!
//! Rotation is a pluggable backend so a GPU implementation can slot in; the
//! semantics are fixed either way: rotation about the image center, output
//! bounds clipped to the input dimensions, uncovered pixels black. The CPU
//! backend works directly on the YUV planes with inverse-mapped
//! nearest-neighbor sampling, each plane rotating about its own center.
//!
//! A GPU backend owns a thread-affine context; the video processor stage is
//! the only stage allowed to hold one.

use retime_core::{PixelBuffer, Result, VideoFrame};

/// Black luma for limited-range 8-bit YUV.
const LUMA_BLACK: u8 = 16;
/// Neutral chroma for 8-bit YUV.
const CHROMA_NEUTRAL: u8 = 128;

/// Rotation backend interface.
pub trait Rotate: Send {
    /// Rotate a frame by `degrees` about its center.
    fn rotate(&mut self, frame: &VideoFrame, degrees: f32) -> Result<VideoFrame>;
}

/// Software rotation backend.
#[derive(Debug, Default)]
pub struct CpuRotator;

impl CpuRotator {
    /// Create a CPU rotator.
    pub fn new() -> Self {
        Self
    }
}

impl Rotate for CpuRotator {
    fn rotate(&mut self, frame: &VideoFrame, degrees: f32) -> Result<VideoFrame> {
        let format = frame.format();
        let mut out = PixelBuffer::new(frame.width(), frame.height(), format);

        let radians = degrees.to_radians();
        let (sin, cos) = radians.sin_cos();

        for plane in 0..out.num_planes() {
            let (pw, ph) = format.plane_dimensions(plane, frame.width(), frame.height());
            let src_stride = frame.stride(plane);
            let dst_stride = out.stride(plane);
            let src = frame.plane(plane).unwrap_or(&[]);

            let fill = if format.is_planar_yuv() {
                if plane == 0 {
                    LUMA_BLACK
                } else {
                    CHROMA_NEUTRAL
                }
            } else {
                0
            };

            let cx = (pw as f32 - 1.0) / 2.0;
            let cy = (ph as f32 - 1.0) / 2.0;

            let dst = match out.plane_mut(plane) {
                Some(dst) => dst,
                None => continue,
            };

            for y in 0..ph {
                let dy = y as f32 - cy;
                for x in 0..pw {
                    let dx = x as f32 - cx;
                    // Inverse mapping: rotate the output coordinate back by
                    // -degrees to find its source pixel.
                    let sx = (cos * dx + sin * dy + cx).round();
                    let sy = (-sin * dx + cos * dy + cy).round();

                    let value = if sx >= 0.0 && sy >= 0.0 && (sx as usize) < pw && (sy as usize) < ph
                    {
                        src[sy as usize * src_stride + sx as usize]
                    } else {
                        fill
                    };
                    dst[y * dst_stride + x] = value;
                }
            }
        }

        let mut rotated = VideoFrame::from_buffer(out);
        rotated.pts = frame.pts;
        rotated.duration = frame.duration;
        Ok(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_core::PixelFormat;

    fn gradient_frame(width: u32, height: u32) -> VideoFrame {
        let mut frame = VideoFrame::new(width, height, PixelFormat::Yuv420p);
        let stride = frame.stride(0);
        let luma = frame.buffer_mut().plane_mut(0).unwrap();
        for y in 0..height as usize {
            for x in 0..width as usize {
                luma[y * stride + x] = ((x * 7 + y * 13) % 251) as u8;
            }
        }
        frame
    }

    fn luma_at(frame: &VideoFrame, x: usize, y: usize) -> u8 {
        frame.plane(0).unwrap()[y * frame.stride(0) + x]
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let frame = gradient_frame(32, 32);
        let out = CpuRotator::new().rotate(&frame, 0.0).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(luma_at(&out, x, y), luma_at(&frame, x, y));
            }
        }
    }

    #[test]
    fn test_quarter_turn_square() {
        // For a square plane, rotating 90 degrees moves (x, y) so that the
        // inverse map of the output corner lands on another corner.
        let frame = gradient_frame(32, 32);
        let out = CpuRotator::new().rotate(&frame, 90.0).unwrap();
        // Output (0, 0) samples input (0, 31) under a CCW quarter turn.
        assert_eq!(luma_at(&out, 0, 0), luma_at(&frame, 0, 31));
        assert_eq!(luma_at(&out, 31, 0), luma_at(&frame, 0, 0));
    }

    #[test]
    fn test_full_turn_is_identity() {
        let frame = gradient_frame(24, 24);
        let out = CpuRotator::new().rotate(&frame, 360.0).unwrap();
        for y in 0..24 {
            for x in 0..24 {
                assert_eq!(luma_at(&out, x, y), luma_at(&frame, x, y));
            }
        }
    }

    #[test]
    fn test_wide_frame_clips_and_fills() {
        // Rotating a wide frame by 90 degrees pushes the long edge out of
        // bounds; uncovered corners become black.
        let frame = gradient_frame(64, 16);
        let out = CpuRotator::new().rotate(&frame, 90.0).unwrap();
        assert_eq!(out.width(), 64);
        assert_eq!(out.height(), 16);
        assert_eq!(luma_at(&out, 0, 0), 16);
        assert_eq!(luma_at(&out, 63, 15), 16);
    }

    #[test]
    fn test_rotation_preserves_timing() {
        let mut frame = gradient_frame(16, 16);
        frame.pts = 7;
        frame.duration = 1;
        let out = CpuRotator::new().rotate(&frame, 45.0).unwrap();
        assert_eq!(out.pts, 7);
        assert_eq!(out.duration, 1);
    }
}
