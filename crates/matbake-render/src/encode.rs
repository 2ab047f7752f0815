//! Image file encoding for baked pixels.

use std::io::Cursor;

use exr::prelude::{SpecificChannels, Vec2, WritableImage};
use half::f16;
use image::{DynamicImage, ImageBuffer, Rgba, Rgba32FImage};
use matbake_core::{ChannelLayout, OutputType, RawImage};

/// Compressed image file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFileFormat {
    Png,
    Jpeg,
    Tga,
    Exr,
}

impl ImageFileFormat {
    /// File format for an output type, or `None` for texture assets.
    pub fn from_output(output: OutputType) -> Option<Self> {
        match output {
            OutputType::TextureAsset => None,
            OutputType::Png => Some(Self::Png),
            OutputType::Jpeg => Some(Self::Jpeg),
            OutputType::Tga => Some(Self::Tga),
            OutputType::Exr => Some(Self::Exr),
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Tga => image::ImageFormat::Tga,
            Self::Exr => image::ImageFormat::OpenExr,
        }
    }
}

/// Compresses raw pixels into a file format.
pub trait ImageEncoder {
    /// Encodes `raw`, returning the compressed file contents.
    fn encode(&self, raw: &RawImage) -> Result<Vec<u8>, EncodeError>;
}

/// Creates encoders by format.
pub trait EncoderFactory {
    /// Returns an encoder for `format`, or `None` if unsupported.
    fn create_encoder(&self, format: ImageFileFormat) -> Option<Box<dyn ImageEncoder>>;
}

/// Encoder backed by the `image` crate.
///
/// OpenEXR is the exception: it is written with `exr` so the file stores
/// half-float channels.
#[derive(Debug, Clone, Copy)]
pub struct ImageCrateEncoder {
    format: ImageFileFormat,
}

impl ImageCrateEncoder {
    pub fn new(format: ImageFileFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ImageFileFormat {
        self.format
    }
}

/// Factory for [`ImageCrateEncoder`]s. Supports every [`ImageFileFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateEncoders;

impl EncoderFactory for ImageCrateEncoders {
    fn create_encoder(&self, format: ImageFileFormat) -> Option<Box<dyn ImageEncoder>> {
        Some(Box::new(ImageCrateEncoder::new(format)))
    }
}

/// Decodes a raw buffer into a `DynamicImage` with RGBA channel order.
fn to_dynamic_image(raw: &RawImage) -> Result<DynamicImage, EncodeError> {
    if raw.width == 0 || raw.height == 0 {
        return Err(EncodeError::InvalidImageData);
    }
    let expected = raw.expected_len();
    if raw.bytes.len() != expected {
        return Err(EncodeError::SizeMismatch {
            expected,
            actual: raw.bytes.len(),
        });
    }

    match (raw.layout, raw.bits_per_channel) {
        (ChannelLayout::Bgra, 8) => {
            // Convert BGRA to RGBA
            let mut rgba = raw.bytes.clone();
            for chunk in rgba.chunks_exact_mut(4) {
                chunk.swap(0, 2);
            }
            let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
                ImageBuffer::from_raw(raw.width, raw.height, rgba)
                    .ok_or(EncodeError::InvalidImageData)?;
            Ok(DynamicImage::ImageRgba8(img))
        }
        (ChannelLayout::Bgra, 16) => {
            let mut rgba: Vec<u16> = bytemuck::pod_collect_to_vec(&raw.bytes);
            for chunk in rgba.chunks_exact_mut(4) {
                chunk.swap(0, 2);
            }
            let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
                ImageBuffer::from_raw(raw.width, raw.height, rgba)
                    .ok_or(EncodeError::InvalidImageData)?;
            Ok(DynamicImage::ImageRgba16(img))
        }
        (ChannelLayout::RgbaF, 32) => {
            let rgba: Vec<f32> = bytemuck::pod_collect_to_vec(&raw.bytes);
            let img: ImageBuffer<Rgba<f32>, Vec<f32>> =
                ImageBuffer::from_raw(raw.width, raw.height, rgba)
                    .ok_or(EncodeError::InvalidImageData)?;
            Ok(DynamicImage::ImageRgba32F(img))
        }
        (layout, bits) => Err(EncodeError::UnsupportedLayout { layout, bits }),
    }
}

impl ImageEncoder for ImageCrateEncoder {
    fn encode(&self, raw: &RawImage) -> Result<Vec<u8>, EncodeError> {
        let img = to_dynamic_image(raw)?;

        let img = match self.format {
            ImageFileFormat::Png => match img {
                DynamicImage::ImageRgba32F(_) => {
                    return Err(EncodeError::UnsupportedLayout {
                        layout: raw.layout,
                        bits: raw.bits_per_channel,
                    });
                }
                other => other,
            },
            // JPEG has no alpha
            ImageFileFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            // TGA true-color stores at most 8 bits per channel
            ImageFileFormat::Tga => DynamicImage::ImageRgba8(img.to_rgba8()),
            ImageFileFormat::Exr => return encode_exr(&img.to_rgba32f()),
        };

        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, self.format.image_format())?;
        Ok(buffer.into_inner())
    }
}

/// Writes an RGBA float image as OpenEXR with f16 samples.
fn encode_exr(img: &Rgba32FImage) -> Result<Vec<u8>, EncodeError> {
    let width = img.width() as usize;
    let texels: &[[f32; 4]] = bytemuck::cast_slice(img.as_raw().as_slice());
    let channels = SpecificChannels::rgba(|Vec2(x, y): Vec2<usize>| {
        let [r, g, b, a] = texels[y * width + x];
        (
            f16::from_f32(r),
            f16::from_f32(g),
            f16::from_f32(b),
            f16::from_f32(a),
        )
    });
    let image = exr::image::Image::from_channels((width, img.height() as usize), channels);

    let mut buffer = Cursor::new(Vec::new());
    image.write().to_buffered(&mut buffer)?;
    Ok(buffer.into_inner())
}

/// Error type for encoding operations.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("OpenEXR encoding error: {0}")]
    Exr(#[from] exr::error::Error),

    #[error("Unsupported channel layout {layout:?} at {bits} bits")]
    UnsupportedLayout { layout: ChannelLayout, bits: u32 },

    #[error("Invalid image data")]
    InvalidImageData,

    #[error("Raw data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgra8(width: u32, height: u32, pixel: [u8; 4]) -> RawImage {
        RawImage {
            width,
            height,
            layout: ChannelLayout::Bgra,
            bits_per_channel: 8,
            bytes: pixel.repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_png_8bit_swaps_channels() {
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Png)
            .encode(&bgra8(3, 2, [10, 20, 30, 255]))
            .unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_png_16bit() {
        let channels: Vec<u16> = [0u16, 32768, 65535, 65535].repeat(4);
        let raw = RawImage {
            width: 2,
            height: 2,
            layout: ChannelLayout::Bgra,
            bits_per_channel: 16,
            bytes: bytemuck::cast_slice(&channels).to_vec(),
        };
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Png).encode(&raw).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgba16(_)));
        assert_eq!(decoded.to_rgba16().get_pixel(0, 0).0, [65535, 32768, 0, 65535]);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Jpeg)
            .encode(&bgra8(8, 8, [0, 0, 255, 128]))
            .unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert!(!decoded.color().has_alpha());
        let px = decoded.to_rgb8().get_pixel(4, 4).0;
        assert!(px[0] > 240 && px[1] < 16 && px[2] < 16);
    }

    #[test]
    fn test_tga_round_trip() {
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Tga)
            .encode(&bgra8(2, 2, [1, 2, 3, 4]))
            .unwrap();
        let decoded = image::load_from_memory_with_format(&encoded, image::ImageFormat::Tga)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [3, 2, 1, 4]);
    }

    #[test]
    fn test_exr_keeps_hdr_values() {
        let floats: Vec<f32> = [4.0f32, 0.5, 0.0, 1.0].repeat(4);
        let raw = RawImage {
            width: 2,
            height: 2,
            layout: ChannelLayout::RgbaF,
            bits_per_channel: 32,
            bytes: bytemuck::cast_slice(&floats).to_vec(),
        };
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Exr).encode(&raw).unwrap();
        let decoded = image::load_from_memory_with_format(&encoded, image::ImageFormat::OpenExr)
            .unwrap()
            .to_rgba32f();
        assert_eq!(decoded.get_pixel(1, 1).0, [4.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_exr_channels_are_half_float() {
        let floats: Vec<f32> = [1.5f32, 0.25, 8.0, 1.0].repeat(6);
        let raw = RawImage {
            width: 3,
            height: 2,
            layout: ChannelLayout::RgbaF,
            bits_per_channel: 32,
            bytes: bytemuck::cast_slice(&floats).to_vec(),
        };
        let encoded = ImageCrateEncoder::new(ImageFileFormat::Exr).encode(&raw).unwrap();

        let meta = exr::meta::MetaData::read_from_buffered(Cursor::new(&encoded), false).unwrap();
        let header = &meta.headers[0];
        assert_eq!(header.layer_size, Vec2(3, 2));
        let names: Vec<String> = header
            .channels
            .list
            .iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, ["A", "B", "G", "R"]);
        assert!(header
            .channels
            .list
            .iter()
            .all(|c| c.sample_type == exr::meta::attribute::SampleType::F16));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let mut raw = bgra8(2, 2, [0; 4]);
        raw.bytes.pop();
        let err = ImageCrateEncoder::new(ImageFileFormat::Png).encode(&raw).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_layout() {
        let raw = RawImage {
            width: 1,
            height: 1,
            layout: ChannelLayout::RgbaF,
            bits_per_channel: 16,
            bytes: vec![0; 8],
        };
        let err = ImageCrateEncoder::new(ImageFileFormat::Exr).encode(&raw).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedLayout { .. }));
    }

    #[test]
    fn test_format_from_output() {
        assert_eq!(ImageFileFormat::from_output(OutputType::Tga), Some(ImageFileFormat::Tga));
        assert_eq!(ImageFileFormat::from_output(OutputType::TextureAsset), None);
    }
}
