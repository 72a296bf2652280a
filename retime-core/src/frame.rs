//! Decoded video frame abstractions.
//!
//! Pixel storage is reference counted: the video processor emits duplicate
//! frames for deceleration that share one buffer while carrying distinct
//! timestamps. In-place filtering goes through [`VideoFrame::buffer_mut`],
//! which copies only when the buffer is actually shared.

use crate::timestamp::NO_PTS;
use std::fmt;
use std::sync::Arc;

/// Pixel format for video frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp.
    Yuv420p,
    /// Planar YUV 4:2:2, 16bpp.
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp.
    Yuv444p,
    /// Packed RGB, 24bpp.
    Rgb24,
    /// Grayscale, 8bpp.
    Gray8,
}

impl PixelFormat {
    /// Get the number of planes for this pixel format.
    pub fn num_planes(&self) -> usize {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 3,
            Self::Rgb24 | Self::Gray8 => 1,
        }
    }

    /// Check if this is a planar YUV format.
    pub fn is_planar_yuv(&self) -> bool {
        matches!(self, Self::Yuv420p | Self::Yuv422p | Self::Yuv444p)
    }

    /// Get chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p => (2, 2),
            Self::Yuv422p => (2, 1),
            _ => (1, 1),
        }
    }

    /// Width and height of the given plane for frame dimensions.
    pub fn plane_dimensions(&self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        let (hsub, vsub) = self.chroma_subsampling();
        if plane == 0 || !self.is_planar_yuv() {
            (width as usize, height as usize)
        } else {
            (
                (width as usize).div_ceil(hsub as usize),
                (height as usize).div_ceil(vsub as usize),
            )
        }
    }

    /// Bytes per pixel in a single plane (1 except packed RGB).
    fn bytes_per_plane_pixel(&self) -> usize {
        match self {
            Self::Rgb24 => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv420p => write!(f, "yuv420p"),
            Self::Yuv422p => write!(f, "yuv422p"),
            Self::Yuv444p => write!(f, "yuv444p"),
            Self::Rgb24 => write!(f, "rgb24"),
            Self::Gray8 => write!(f, "gray8"),
        }
    }
}

#[derive(Clone)]
struct Plane {
    data: Vec<u8>,
    stride: usize,
}

/// A buffer holding the pixel planes of one video frame.
#[derive(Clone)]
pub struct PixelBuffer {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    planes: Vec<Plane>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer with 32-byte aligned strides.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let mut planes = Vec::with_capacity(format.num_planes());
        for plane in 0..format.num_planes() {
            let (w, h) = format.plane_dimensions(plane, width, height);
            let stride = (w * format.bytes_per_plane_pixel() + 31) & !31;
            planes.push(Plane {
                data: vec![0u8; stride * h],
                stride,
            });
        }
        Self {
            width,
            height,
            format,
            planes,
        }
    }

    /// Get the number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Get a plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(|p| p.data.as_slice())
    }

    /// Get a mutable reference to a plane's data.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(|p| p.data.as_mut_slice())
    }

    /// Get the stride (bytes per row) for a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.planes.get(plane).map(|p| p.stride).unwrap_or(0)
    }

    /// Fill a plane with a constant value.
    pub fn fill_plane(&mut self, plane: usize, value: u8) {
        if let Some(p) = self.planes.get_mut(plane) {
            p.data.fill(value);
        }
    }

    /// Total size of all planes in bytes.
    pub fn total_size(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes.len())
            .finish()
    }
}

/// A decoded video frame: shared pixel storage plus per-frame timing.
#[derive(Clone)]
pub struct VideoFrame {
    buffer: Arc<PixelBuffer>,
    /// Presentation timestamp.
    pub pts: i64,
    /// Frame duration in the same units as `pts`.
    pub duration: i64,
}

impl VideoFrame {
    /// Create a frame with freshly allocated storage.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            buffer: Arc::new(PixelBuffer::new(width, height, format)),
            pts: NO_PTS,
            duration: 0,
        }
    }

    /// Create a frame from an existing buffer.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            buffer: Arc::new(buffer),
            pts: NO_PTS,
            duration: 0,
        }
    }

    /// Get the frame width.
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    /// Get the frame height.
    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Get the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.buffer.format
    }

    /// Get the pixel buffer.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Get mutable pixel storage, copying first if the buffer is shared.
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        Arc::make_mut(&mut self.buffer)
    }

    /// Get a plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.buffer.plane(index)
    }

    /// Get the stride for a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.buffer.stride(plane)
    }

    /// Check whether another frame shares this frame's pixel storage.
    pub fn shares_buffer(&self, other: &VideoFrame) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts)
            .finish()
    }
}
