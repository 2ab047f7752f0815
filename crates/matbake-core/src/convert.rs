//! Conversion from the intermediate pixel buffer to the raw layout an image
//! encoder expects.

use crate::error::{BakeError, Result};
use crate::pixel::{Bgra8, PixelBuffer, PixelData, Rgba16F};
use crate::request::{BitDepth, OutputType};

/// Gamma used when quantizing to 16-bit unsigned channels.
pub const UNORM16_GAMMA: f32 = 2.2;

/// Channel order and type of a [`RawImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Unsigned integer channels in B, G, R, A order.
    Bgra,
    /// 32-bit float channels in R, G, B, A order.
    RgbaF,
}

/// Uncompressed pixels ready for an encoder.
///
/// Multi-byte channels are stored in native byte order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub bits_per_channel: u32,
    pub bytes: Vec<u8>,
}

impl RawImage {
    /// Expected byte length for the image's dimensions and layout.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4 * (self.bits_per_channel as usize / 8)
    }
}

/// Encodes a linear value with the piecewise sRGB transfer function.
pub fn linear_to_srgb(x: f32) -> f32 {
    if x <= 0.003_130_8 {
        x * 12.92
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Decodes an sRGB-encoded value to linear.
pub fn srgb_to_linear(x: f32) -> f32 {
    if x <= 0.040_45 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Quantizes a [0, 1] value to 8 bits, mapping 1.0 to 255.
pub fn quantize_u8(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.999).floor() as u8
}

/// Quantizes a [0, 1] value to 16 bits with rounding.
pub fn quantize_u16(x: f32) -> u16 {
    (x.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Converts half-float pixels to display-referred 8-bit BGRA.
///
/// With `srgb`, color channels go through the sRGB curve; alpha is always
/// linear.
pub fn to_bgra8(pixels: &[Rgba16F], srgb: bool) -> Vec<Bgra8> {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        quantize_u8(if srgb { linear_to_srgb(c) } else { c })
    };
    pixels
        .iter()
        .map(|p| {
            let [r, g, b, a] = p.to_f32();
            Bgra8::new(encode(r), encode(g), encode(b), quantize_u8(a))
        })
        .collect()
}

/// Converts half-float pixels to 16-bit unsigned channels in B, G, R, A order.
///
/// With `srgb`, color channels are raised to `1 / 2.2` before quantizing.
pub fn to_unorm16_bgra(pixels: &[Rgba16F], srgb: bool) -> Vec<u16> {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        quantize_u16(if srgb { c.powf(1.0 / UNORM16_GAMMA) } else { c })
    };
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        let [r, g, b, a] = p.to_f32();
        out.extend_from_slice(&[encode(b), encode(g), encode(r), quantize_u16(a)]);
    }
    out
}

/// Promotes half-float pixels to 32-bit float RGBA without changing values.
pub fn to_rgba32f(pixels: &[Rgba16F]) -> Vec<f32> {
    pixels.iter().flat_map(|p| p.to_f32()).collect()
}

/// Prepares `buffer` for the file encoder of `output`.
///
/// EXR requires a 16-bit source; any other combination is a configuration
/// error. JPEG is always written at 8 bits. Texture assets take the buffer
/// directly and are not handled here.
pub fn prepare_export(buffer: &PixelBuffer, output: OutputType, srgb: bool) -> Result<RawImage> {
    let (width, height) = (buffer.width(), buffer.height());
    let export_depth = match output {
        OutputType::TextureAsset => {
            return Err(BakeError::Config("texture assets are not encoded as image files".into()));
        }
        OutputType::Jpeg => BitDepth::Bit8,
        OutputType::Png | OutputType::Tga | OutputType::Exr => buffer.bit_depth(),
    };

    let raw = |layout: ChannelLayout, bits_per_channel: u32, bytes: Vec<u8>| RawImage {
        width,
        height,
        layout,
        bits_per_channel,
        bytes,
    };

    match (output, buffer.data()) {
        (OutputType::Exr, PixelData::Rgba16F(pixels)) => {
            let floats = to_rgba32f(pixels);
            Ok(raw(ChannelLayout::RgbaF, 32, bytemuck::cast_slice(&floats).to_vec()))
        }
        (OutputType::Exr, PixelData::Bgra8(_)) => Err(BakeError::Config(
            "EXR output requires 16-bit source data".into(),
        )),
        (_, PixelData::Rgba16F(pixels)) if export_depth == BitDepth::Bit8 => {
            let converted = to_bgra8(pixels, srgb);
            Ok(raw(ChannelLayout::Bgra, 8, bytemuck::cast_slice(&converted).to_vec()))
        }
        (_, PixelData::Rgba16F(pixels)) => {
            let converted = to_unorm16_bgra(pixels, srgb);
            Ok(raw(ChannelLayout::Bgra, 16, bytemuck::cast_slice(&converted).to_vec()))
        }
        (_, PixelData::Bgra8(_)) => Ok(raw(ChannelLayout::Bgra, 8, buffer.as_bytes().to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_half_to_bgra8() {
        let out = to_bgra8(&[Rgba16F::new(1.0, 1.0, 1.0, 1.0)], false);
        assert_eq!(out, vec![Bgra8::new(255, 255, 255, 255)]);
    }

    #[test]
    fn test_half_to_unorm16_reorders_channels() {
        let out = to_unorm16_bgra(&[Rgba16F::new(0.0, 0.5, 1.0, 1.0)], false);
        assert_eq!(out[0], 65535);
        assert!((i32::from(out[1]) - 32767).abs() <= 1);
        assert_eq!(out[2], 0);
        assert_eq!(out[3], 65535);
    }

    #[test]
    fn test_unorm16_gamma_leaves_alpha_linear() {
        let out = to_unorm16_bgra(&[Rgba16F::new(0.25, 0.25, 0.25, 0.25)], true);
        let expected_color = quantize_u16(0.25f32.powf(1.0 / 2.2));
        assert_eq!(out[0], expected_color);
        assert_eq!(out[3], quantize_u16(0.25));
    }

    #[test]
    fn test_values_are_clamped() {
        let out = to_bgra8(&[Rgba16F::new(4.0, -1.0, 0.0, 2.0)], false);
        assert_eq!(out[0], Bgra8::new(255, 0, 0, 255));
        let out = to_unorm16_bgra(&[Rgba16F::new(-3.0, 9.0, 0.0, 0.0)], true);
        assert_eq!(&out[..3], &[0, 65535, 0]);
    }

    #[test]
    fn test_srgb_curve_round_trip() {
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            assert!((srgb_to_linear(linear_to_srgb(x)) - x).abs() < 1e-5);
        }
        assert_eq!(quantize_u8(linear_to_srgb(0.0)), 0);
        assert_eq!(quantize_u8(linear_to_srgb(1.0)), 255);
    }

    #[test]
    fn test_exr_requires_16bit() {
        let buffer = PixelBuffer::filled_bgra8(2, 2, Bgra8::default());
        let err = prepare_export(&buffer, OutputType::Exr, false).unwrap_err();
        assert!(matches!(err, BakeError::Config(_)));
    }

    #[test]
    fn test_exr_promotes_to_f32() {
        let buffer = PixelBuffer::filled_rgba16f(2, 1, Rgba16F::new(0.5, 2.0, 8.0, 1.0));
        let raw = prepare_export(&buffer, OutputType::Exr, true).unwrap();
        assert_eq!(raw.layout, ChannelLayout::RgbaF);
        assert_eq!(raw.bits_per_channel, 32);
        assert_eq!(raw.bytes.len(), raw.expected_len());
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&raw.bytes);
        assert_eq!(&floats[..4], &[0.5, 2.0, 8.0, 1.0]);
    }

    #[test]
    fn test_jpeg_from_16bit_is_8bit() {
        let buffer = PixelBuffer::filled_rgba16f(4, 4, Rgba16F::new(1.0, 0.0, 0.0, 1.0));
        let raw = prepare_export(&buffer, OutputType::Jpeg, false).unwrap();
        assert_eq!(raw.bits_per_channel, 8);
        assert_eq!(raw.bytes.len(), 64);
        assert_eq!(&raw.bytes[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_png_16bit_is_unorm16() {
        let buffer = PixelBuffer::filled_rgba16f(2, 2, Rgba16F::new(0.0, 0.0, 1.0, 1.0));
        let raw = prepare_export(&buffer, OutputType::Png, false).unwrap();
        assert_eq!(raw.bits_per_channel, 16);
        assert_eq!(raw.bytes.len(), raw.expected_len());
        let channels: Vec<u16> = bytemuck::pod_collect_to_vec(&raw.bytes);
        assert_eq!(&channels[..4], &[65535, 0, 0, 65535]);
    }

    #[test]
    fn test_8bit_source_passes_through() {
        let buffer = PixelBuffer::filled_bgra8(1, 1, Bgra8::new(9, 8, 7, 6));
        let raw = prepare_export(&buffer, OutputType::Tga, true).unwrap();
        assert_eq!(raw.bytes, buffer.as_bytes());
    }

    #[test]
    fn test_texture_asset_is_not_exported() {
        let buffer = PixelBuffer::filled_bgra8(1, 1, Bgra8::default());
        assert!(prepare_export(&buffer, OutputType::TextureAsset, false).is_err());
    }
}
