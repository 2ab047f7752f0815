//! Bake requests and their output parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::property::PropertyType;

/// Storage format of the intermediate pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BitDepth {
    /// 8-bit integer BGRA.
    Bit8,
    /// 16-bit half-float RGBA.
    #[default]
    Bit16,
}

impl BitDepth {
    /// Bytes per pixel of the intermediate buffer.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bit8 => 4,
            Self::Bit16 => 8,
        }
    }

    /// Bits per channel.
    pub fn bits(self) -> u32 {
        match self {
            Self::Bit8 => 8,
            Self::Bit16 => 16,
        }
    }
}

/// Terminal sink of a bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OutputType {
    #[default]
    TextureAsset,
    Png,
    Jpeg,
    Tga,
    Exr,
}

impl OutputType {
    /// File extension including the leading dot, for file sinks.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::TextureAsset => None,
            Self::Png => Some(".png"),
            Self::Jpeg => Some(".jpg"),
            Self::Tga => Some(".tga"),
            Self::Exr => Some(".exr"),
        }
    }

    /// Whether this output is written to the filesystem as an image file.
    pub fn is_file(self) -> bool {
        self.extension().is_some()
    }
}

/// Texture compression hint attached to texture assets.
///
/// Passed through untouched; the pipeline never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CompressionSettings {
    #[default]
    Default,
    Normalmap,
    Masks,
    Grayscale,
    Displacementmap,
    VectorDisplacementmap,
    Hdr,
    EditorIcon,
    Alpha,
    DistanceFieldFont,
    HdrCompressed,
    Bc7,
}

/// Everything needed to perform one bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeRequest {
    /// Material to bake. `None` is rejected by validation.
    pub material: Option<Material>,

    /// Name of the baked asset or file (without extension).
    pub baked_name: String,

    /// Destination: a package path for assets, a directory for files.
    /// `/Game/`-rooted paths map to the content directory.
    pub output_path: PathBuf,

    /// Output width in pixels.
    pub texture_width: u32,

    /// Output height in pixels.
    pub texture_height: u32,

    /// Intermediate buffer storage.
    pub bit_depth: BitDepth,

    /// Material property to bake.
    pub property: PropertyType,

    /// Output sink.
    pub output_type: OutputType,

    /// Compression hint for texture assets.
    pub compression: CompressionSettings,

    /// Requested sRGB output. Ignored for data properties.
    pub srgb: bool,
}

impl Default for BakeRequest {
    fn default() -> Self {
        Self {
            material: None,
            baked_name: String::new(),
            output_path: PathBuf::from("/Game/"),
            texture_width: 1024,
            texture_height: 1024,
            bit_depth: BitDepth::Bit16,
            property: PropertyType::FinalColor,
            output_type: OutputType::TextureAsset,
            compression: CompressionSettings::Default,
            srgb: false,
        }
    }
}

impl BakeRequest {
    /// Creates a request for `material` with default output parameters.
    pub fn new(material: Material, baked_name: impl Into<String>) -> Self {
        Self {
            material: Some(material),
            baked_name: baked_name.into(),
            ..Self::default()
        }
    }

    /// Sets the output size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.texture_width = width;
        self.texture_height = height;
        self
    }

    /// Sets the bit depth.
    #[must_use]
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Sets the property to bake.
    #[must_use]
    pub fn with_property(mut self, property: PropertyType) -> Self {
        self.property = property;
        self
    }

    /// Sets the output sink.
    #[must_use]
    pub fn with_output(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the sRGB flag.
    #[must_use]
    pub fn with_srgb(mut self, srgb: bool) -> Self {
        self.srgb = srgb;
        self
    }

    /// Sets the compression hint.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionSettings) -> Self {
        self.compression = compression;
        self
    }

    /// Number of pixels in the output.
    pub fn pixel_count(&self) -> usize {
        self.texture_width as usize * self.texture_height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(BitDepth::Bit8.bytes_per_pixel(), 4);
        assert_eq!(BitDepth::Bit16.bytes_per_pixel(), 8);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputType::Jpeg.extension(), Some(".jpg"));
        assert!(!OutputType::TextureAsset.is_file());
        assert!(OutputType::Exr.is_file());
    }

    #[test]
    fn test_request_defaults() {
        let request = BakeRequest::default();
        assert!(request.material.is_none());
        assert_eq!(request.texture_width, 1024);
        assert_eq!(request.bit_depth, BitDepth::Bit16);
        assert_eq!(request.output_type, OutputType::TextureAsset);
    }

    #[test]
    fn test_request_json_round_trip() {
        let request = BakeRequest::new(Material::default(), "T_Rock")
            .with_property(PropertyType::Roughness)
            .with_output(OutputType::Png);
        let json = serde_json::to_string(&request).unwrap();
        let back: BakeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
