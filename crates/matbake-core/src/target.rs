//! Render target configuration derived from a request.

use serde::{Deserialize, Serialize};

use crate::property::PropertyType;
use crate::request::BitDepth;

/// Pixel format of a render target and of its readback buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit unsigned BGRA.
    Bgra8,
    /// 16-bit half-float RGBA.
    Rgba16F,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8 => 4,
            Self::Rgba16F => 8,
        }
    }

    /// Bit depth this format stores.
    pub fn bit_depth(self) -> BitDepth {
        match self {
            Self::Bgra8 => BitDepth::Bit8,
            Self::Rgba16F => BitDepth::Bit16,
        }
    }
}

impl From<BitDepth> for PixelFormat {
    fn from(depth: BitDepth) -> Self {
        match depth {
            BitDepth::Bit8 => Self::Bgra8,
            BitDepth::Bit16 => Self::Rgba16F,
        }
    }
}

/// Render target settings for one bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConfig {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// The target stores linear values with no gamma encoding.
    pub force_linear_gamma: bool,
    /// sRGB applies to this bake. Only true for color-like properties.
    pub effective_srgb: bool,
}

impl TargetConfig {
    /// Derives the target configuration. Never fails.
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        property: PropertyType,
        srgb: bool,
    ) -> Self {
        let effective_srgb = srgb && property.is_color_like();
        Self {
            width,
            height,
            format: PixelFormat::from(bit_depth),
            force_linear_gamma: !effective_srgb,
            effective_srgb,
        }
    }

    /// Whether the target holds HDR (float) data.
    pub fn is_hdr(&self) -> bool {
        self.format == PixelFormat::Rgba16F
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expected byte length of the target contents.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * self.format.bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_only_for_color_properties() {
        for property in PropertyType::ALL {
            let config = TargetConfig::new(4, 4, BitDepth::Bit8, property, true);
            assert_eq!(config.effective_srgb, property.is_color_like());
            assert_eq!(config.force_linear_gamma, !config.effective_srgb);
        }
    }

    #[test]
    fn test_srgb_off_forces_linear() {
        let config = TargetConfig::new(4, 4, BitDepth::Bit16, PropertyType::BaseColor, false);
        assert!(!config.effective_srgb);
        assert!(config.force_linear_gamma);
    }

    #[test]
    fn test_format_from_bit_depth() {
        let config = TargetConfig::new(2, 3, BitDepth::Bit8, PropertyType::Normal, false);
        assert_eq!(config.format, PixelFormat::Bgra8);
        assert!(!config.is_hdr());
        assert_eq!(config.byte_len(), 24);

        let config = TargetConfig::new(2, 3, BitDepth::Bit16, PropertyType::Normal, false);
        assert_eq!(config.format, PixelFormat::Rgba16F);
        assert!(config.is_hdr());
        assert_eq!(config.byte_len(), 48);
    }
}
