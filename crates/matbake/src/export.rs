//! Writing baked buffers as image files.

use std::fs;
use std::path::PathBuf;

use matbake_core::{prepare_export, BakeError, BakeRequest, Options, PixelBuffer, Result};
use matbake_render::{EncoderFactory, ImageFileFormat};

/// Encodes `buffer` and writes it to `<output_path>/<baked_name>.<ext>`.
///
/// The file is fully encoded in memory before anything is written, so an
/// encoder failure never leaves a partial file. Missing directories are
/// created; `/Game/` paths resolve against the content directory.
pub fn export_file<E: EncoderFactory + ?Sized>(
    encoders: &E,
    options: &Options,
    request: &BakeRequest,
    buffer: &PixelBuffer,
    srgb: bool,
) -> Result<PathBuf> {
    let (format, extension) = ImageFileFormat::from_output(request.output_type)
        .zip(request.output_type.extension())
        .ok_or_else(|| {
            BakeError::Config(format!("{:?} is not a file output", request.output_type))
        })?;

    let raw = prepare_export(buffer, request.output_type, srgb)?;
    let encoder = encoders
        .create_encoder(format)
        .ok_or_else(|| BakeError::Encode(format!("no encoder available for {format:?}")))?;
    let bytes = encoder
        .encode(&raw)
        .map_err(|e| BakeError::Encode(e.to_string()))?;

    let dir = options.resolve_path(&request.output_path);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}{extension}", request.baked_name));
    fs::write(&path, bytes)?;
    log::debug!("wrote {} ({} bits per channel)", path.display(), raw.bits_per_channel);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matbake_core::{Bgra8, Material, OutputType, Vec3};
    use matbake_render::{ImageCrateEncoders, ImageEncoder};

    struct NoEncoders;

    impl EncoderFactory for NoEncoders {
        fn create_encoder(&self, _format: ImageFileFormat) -> Option<Box<dyn ImageEncoder>> {
            None
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("matbake_export_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_writes_nested_directory() {
        let dir = temp_dir("nested");
        let request = BakeRequest::new(Material::solid("M", Vec3::ONE), "T_White")
            .with_output(OutputType::Tga)
            .with_output_path(dir.join("a/b"));
        let buffer = PixelBuffer::filled_bgra8(2, 2, Bgra8::new(255, 255, 255, 255));

        let path = export_file(
            &ImageCrateEncoders,
            &Options::default(),
            &request,
            &buffer,
            false,
        )
        .unwrap();
        assert_eq!(path, dir.join("a/b/T_White.tga"));
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_resolves_game_paths() {
        let dir = temp_dir("game");
        let options = Options {
            content_dir: dir.clone(),
            ..Options::default()
        };
        let request = BakeRequest::new(Material::default(), "T_Grey")
            .with_output(OutputType::Png)
            .with_output_path("/Game/Baked");
        let buffer = PixelBuffer::filled_bgra8(1, 1, Bgra8::new(128, 128, 128, 255));

        let path = export_file(&ImageCrateEncoders, &options, &request, &buffer, false).unwrap();
        assert_eq!(path, dir.join("Baked").join("T_Grey.png"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_encoder_writes_nothing() {
        let dir = temp_dir("noenc");
        let request = BakeRequest::new(Material::default(), "T_X")
            .with_output(OutputType::Png)
            .with_output_path(&dir);
        let buffer = PixelBuffer::filled_bgra8(1, 1, Bgra8::default());

        let err = export_file(
            &NoEncoders,
            &Options::default(),
            &request,
            &buffer,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, BakeError::Encode(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn test_texture_asset_is_rejected() {
        let request = BakeRequest::new(Material::default(), "T_X");
        let buffer = PixelBuffer::filled_bgra8(1, 1, Bgra8::default());
        let err = export_file(
            &ImageCrateEncoders,
            &Options::default(),
            &request,
            &buffer,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, BakeError::Config(_)));
    }
}
