//! Pixel filters for the video processor.
//!
//! All filters operate on planar YUV frames: grayscale neutralizes the chroma
//! planes, the remaining filters touch only luma. The convolution filters
//! process interior pixels and leave the one-pixel border unchanged.

use retime_core::VideoFrame;

/// Neutral chroma value for 8-bit YUV.
const CHROMA_NEUTRAL: u8 = 128;

/// Set both chroma planes to neutral, keeping luma.
pub fn apply_grayscale(frame: &mut VideoFrame) {
    if !frame.format().is_planar_yuv() {
        return;
    }
    let buffer = frame.buffer_mut();
    buffer.fill_plane(1, CHROMA_NEUTRAL);
    buffer.fill_plane(2, CHROMA_NEUTRAL);
}

/// Adjust luma contrast about mid-gray, then scale by brightness.
pub fn apply_brightness_contrast(frame: &mut VideoFrame, brightness: f32, contrast: f32) {
    if !frame.format().is_planar_yuv() {
        return;
    }
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let buffer = frame.buffer_mut();
    let stride = buffer.stride(0);
    let Some(luma) = buffer.plane_mut(0) else {
        return;
    };

    for row in luma.chunks_mut(stride).take(height) {
        for pixel in &mut row[..width] {
            let mut value = (*pixel as f32 - 128.0) * contrast + 128.0;
            value *= brightness;
            *pixel = value.clamp(0.0, 255.0) as u8;
        }
    }
}

/// 3x3 box blur on luma, interior pixels only.
pub fn apply_box_blur(frame: &mut VideoFrame) {
    convolve_luma(frame, |src, stride, x, y| {
        let mut sum = 0u32;
        for dy in [-1i32, 0, 1] {
            for dx in [-1i32, 0, 1] {
                let yy = (y as i32 + dy) as usize;
                let xx = (x as i32 + dx) as usize;
                sum += src[yy * stride + xx] as u32;
            }
        }
        (sum / 9) as u8
    });
}

/// 3x3 Laplacian-of-identity sharpen on luma, interior pixels only.
pub fn apply_sharpen(frame: &mut VideoFrame) {
    convolve_luma(frame, |src, stride, x, y| {
        let center = src[y * stride + x] as i32;
        let sum = 5 * center
            - src[(y - 1) * stride + x] as i32
            - src[(y + 1) * stride + x] as i32
            - src[y * stride + (x - 1)] as i32
            - src[y * stride + (x + 1)] as i32;
        sum.clamp(0, 255) as u8
    });
}

fn convolve_luma(frame: &mut VideoFrame, kernel: impl Fn(&[u8], usize, usize, usize) -> u8) {
    if !frame.format().is_planar_yuv() {
        return;
    }
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    if width < 3 || height < 3 {
        return;
    }
    let buffer = frame.buffer_mut();
    let stride = buffer.stride(0);
    let Some(luma) = buffer.plane_mut(0) else {
        return;
    };

    let src = luma.to_vec();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            luma[y * stride + x] = kernel(&src, stride, x, y);
        }
    }
}
