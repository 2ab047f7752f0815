//! Typed pixel buffers.
//!
//! A [`PixelBuffer`] owns either 8-bit BGRA or half-float RGBA pixels. Both
//! layouts are `Pod`, so the buffer can be viewed as raw bytes without copying
//! and built from raw readback bytes with a single copy.

use bytemuck::{Pod, Zeroable};
use half::f16;

use crate::error::{BakeError, Result};
use crate::request::BitDepth;
use crate::target::PixelFormat;

/// An 8-bit pixel in B, G, R, A byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Bgra8 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }
}

/// A half-float pixel in R, G, B, A order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba16F {
    pub r: f16,
    pub g: f16,
    pub b: f16,
    pub a: f16,
}

impl Rgba16F {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: f16::from_f32(r),
            g: f16::from_f32(g),
            b: f16::from_f32(b),
            a: f16::from_f32(a),
        }
    }

    /// Promotes all channels to f32 as `[r, g, b, a]`.
    pub fn to_f32(self) -> [f32; 4] {
        [self.r.to_f32(), self.g.to_f32(), self.b.to_f32(), self.a.to_f32()]
    }
}

/// Pixel storage, tagged by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Bgra8(Vec<Bgra8>),
    Rgba16F(Vec<Rgba16F>),
}

impl PixelData {
    /// Number of pixels.
    pub fn len(&self) -> usize {
        match self {
            Self::Bgra8(p) => p.len(),
            Self::Rgba16F(p) => p.len(),
        }
    }

    /// Returns true if there are no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Format of the stored pixels.
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Bgra8(_) => PixelFormat::Bgra8,
            Self::Rgba16F(_) => PixelFormat::Rgba16F,
        }
    }
}

/// A CPU-side image produced by readback.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: PixelData,
}

impl PixelBuffer {
    /// Wraps typed pixels, checking the pixel count against the dimensions.
    pub fn new(width: u32, height: u32, data: PixelData) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(BakeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a buffer from raw bytes in the layout of `format`.
    pub fn from_bytes(width: u32, height: u32, format: PixelFormat, bytes: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(BakeError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        // pod_collect_to_vec copies into correctly aligned storage.
        let data = match format {
            PixelFormat::Bgra8 => PixelData::Bgra8(bytemuck::pod_collect_to_vec(bytes)),
            PixelFormat::Rgba16F => PixelData::Rgba16F(bytemuck::pod_collect_to_vec(bytes)),
        };
        Self::new(width, height, data)
    }

    /// Creates a buffer filled with one 8-bit color.
    pub fn filled_bgra8(width: u32, height: u32, pixel: Bgra8) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            data: PixelData::Bgra8(vec![pixel; count]),
        }
    }

    /// Creates a buffer filled with one half-float color.
    pub fn filled_rgba16f(width: u32, height: u32, pixel: Rgba16F) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            data: PixelData::Rgba16F(vec![pixel; count]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.data.format()
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.format().bit_depth()
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    /// Raw bytes in the buffer's native layout.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            PixelData::Bgra8(p) => bytemuck::cast_slice(p),
            PixelData::Rgba16F(p) => bytemuck::cast_slice(p),
        }
    }

    /// Byte length, always `width * height * bytes_per_pixel`.
    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Consumes the buffer and returns its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.data {
            PixelData::Bgra8(p) => bytemuck::cast_slice(&p).to_vec(),
            PixelData::Rgba16F(p) => bytemuck::cast_slice(&p).to_vec(),
        }
    }
}
