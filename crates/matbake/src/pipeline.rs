//! Single-request bake orchestration.

use std::fmt;
use std::path::PathBuf;

use matbake_core::{
    naming, post_process, AssetHandle, AssetStore, BakeError, BakeRequest, BakeStage, BitDepth,
    InMemoryAssetStore, Material, Options, OutputType, PixelBuffer, PropertyType, Result,
    TargetConfig, TextureAsset, TextureInfo,
};
use matbake_render::{
    capture_property, read_pixels, CaptureRigDesc, EncoderFactory, ImageCrateEncoders,
    RenderError, RenderTarget, Renderer, SoftwareRenderer,
};

use crate::export::export_file;

/// Where a successful bake ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BakeOutput {
    /// A registered texture asset.
    Asset(AssetHandle),
    /// An image file on disk.
    File(PathBuf),
}

impl fmt::Display for BakeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(handle) => write!(f, "{}", handle.package_path),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Runs bakes against a renderer, an asset store and an encoder factory.
///
/// Bakes are synchronous: [`Baker::bake`] returns only after the renderer has
/// been flushed and the output is persisted.
pub struct Baker<R = SoftwareRenderer, A = InMemoryAssetStore, E = ImageCrateEncoders> {
    renderer: R,
    assets: A,
    encoders: E,
    options: Options,
}

impl Default for Baker {
    fn default() -> Self {
        Self::new(SoftwareRenderer::new(), InMemoryAssetStore::new(), Options::default())
    }
}

impl<R: Renderer, A: AssetStore> Baker<R, A> {
    /// Creates a baker that encodes files with the `image` crate.
    pub fn new(renderer: R, assets: A, options: Options) -> Self {
        Self::with_encoders(renderer, assets, ImageCrateEncoders, options)
    }
}

impl<R: Renderer, A: AssetStore, E: EncoderFactory> Baker<R, A, E> {
    pub fn with_encoders(renderer: R, assets: A, encoders: E, options: Options) -> Self {
        Self {
            renderer,
            assets,
            encoders,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// Builds a request from the configured defaults.
    ///
    /// The baked name gets the property's suffix when `auto_suffix` is on.
    pub fn request(
        &self,
        material: Material,
        base_name: &str,
        property: PropertyType,
    ) -> BakeRequest {
        let name = naming::apply_suffix(base_name, property, self.options.auto_suffix);
        BakeRequest::new(material, name)
            .with_size(self.options.default_width, self.options.default_height)
            .with_bit_depth(self.options.default_bit_depth)
            .with_output(self.options.default_output)
            .with_property(property)
    }

    /// Bakes a single request.
    ///
    /// Configuration problems are reported before the renderer or the
    /// filesystem is touched. Any failure ends the bake; nothing is retried
    /// and no partial output is written.
    pub fn bake(&mut self, request: &BakeRequest) -> Result<BakeOutput> {
        let material = check_request(request)?;
        let config = TargetConfig::new(
            request.texture_width,
            request.texture_height,
            request.bit_depth,
            request.property,
            request.srgb,
        );
        log::debug!(
            "baking {} of '{}' as '{}' ({}x{}, {}-bit, {:?})",
            request.property,
            material.name,
            request.baked_name,
            config.width,
            config.height,
            request.bit_depth.bits(),
            request.output_type
        );
        progress(BakeStage::Configured, request);

        let mut target = RenderTarget::new(config).map_err(capture_error)?;
        let desc = CaptureRigDesc::from_options(&self.options);
        capture_property(
            &mut self.renderer,
            material,
            request.property,
            &mut target,
            &desc,
        )
        .map_err(capture_error)?;
        progress(BakeStage::Captured, request);

        let mut buffer = read_pixels(&mut self.renderer, &target)
            .map_err(|e| BakeError::Readback(e.to_string()))?;
        progress(BakeStage::ReadBack, request);

        post_process::apply(&mut buffer, request.property, material.blend_mode);
        progress(BakeStage::PostProcessed, request);

        let output = if request.output_type == OutputType::TextureAsset {
            let handle = self.persist_asset(request, &config, buffer)?;
            progress(BakeStage::Persisted, request);
            BakeOutput::Asset(handle)
        } else {
            let path = export_file(
                &self.encoders,
                &self.options,
                request,
                &buffer,
                config.effective_srgb,
            )?;
            progress(BakeStage::Encoded, request);
            BakeOutput::File(path)
        };

        progress(BakeStage::Done, request);
        log::info!("baked '{}' to {output}", request.baked_name);
        Ok(output)
    }

    fn persist_asset(
        &mut self,
        request: &BakeRequest,
        config: &TargetConfig,
        buffer: PixelBuffer,
    ) -> Result<AssetHandle> {
        let info = TextureInfo {
            width: config.width,
            height: config.height,
            format: config.format,
            compression: request.compression,
            srgb: config.effective_srgb,
        };
        let texture = TextureAsset::new(info, buffer.into_bytes())?;
        let name = self
            .assets
            .create_unique_name(&request.output_path, &request.baked_name);
        if name != request.baked_name {
            log::debug!("'{}' exists, using '{name}'", request.baked_name);
        }
        let handle = self
            .assets
            .create_asset(&request.output_path, &name, texture)?;
        self.assets.register_asset(&handle)?;
        Ok(handle)
    }
}

/// Checks the parts of a request that must hold before any work starts.
fn check_request(request: &BakeRequest) -> Result<&Material> {
    let material = request
        .material
        .as_ref()
        .ok_or_else(|| BakeError::Validation("no material selected".into()))?;
    if request.baked_name.is_empty() {
        return Err(BakeError::Validation("baked name is empty".into()));
    }
    if request.texture_width == 0 || request.texture_height == 0 {
        return Err(BakeError::Config(format!(
            "texture size must be positive, got {}x{}",
            request.texture_width, request.texture_height
        )));
    }
    if request.output_type == OutputType::Exr && request.bit_depth != BitDepth::Bit16 {
        return Err(BakeError::Config("EXR output requires 16-bit depth".into()));
    }
    Ok(material)
}

fn capture_error(err: RenderError) -> BakeError {
    match err {
        RenderError::NoContext => BakeError::Setup(err.to_string()),
        other => BakeError::Capture(other.to_string()),
    }
}

fn progress(stage: BakeStage, request: &BakeRequest) {
    log::debug!("'{}' {stage}", request.baked_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use matbake_core::{BakeErrorKind, Vec3};
    use matbake_render::FailurePoint;

    fn red_request() -> BakeRequest {
        BakeRequest::new(Material::solid("M_Red", Vec3::X), "T_Red").with_size(4, 4)
    }

    #[test]
    fn test_bake_to_asset() {
        let mut baker: Baker = Baker::default();
        let output = baker.bake(&red_request()).unwrap();
        let BakeOutput::Asset(handle) = output else {
            panic!("expected an asset");
        };
        assert_eq!(handle.package_path, "/Game/T_Red");
        assert!(baker.assets().contains("/Game/T_Red"));
        assert_eq!(baker.renderer().flushes(), 1);
    }

    #[test]
    fn test_missing_material_is_validation_error() {
        let mut baker: Baker = Baker::default();
        let request = BakeRequest {
            baked_name: "T_None".into(),
            ..BakeRequest::default()
        };
        let err = baker.bake(&request).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Validation);
    }

    #[test]
    fn test_zero_size_is_config_error() {
        let mut baker: Baker = Baker::default();
        let err = baker.bake(&red_request().with_size(0, 8)).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Config);
        assert_eq!(baker.renderer().rigs_spawned(), 0);
    }

    #[test]
    fn test_no_context_is_setup_error() {
        let renderer = SoftwareRenderer::new().failing_at(FailurePoint::Context);
        let mut baker = Baker::new(renderer, InMemoryAssetStore::new(), Options::default());
        let err = baker.bake(&red_request()).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Setup);
        assert!(baker.assets().is_empty());
    }

    #[test]
    fn test_readback_failure_is_distinct_from_capture() {
        let renderer = SoftwareRenderer::new().failing_at(FailurePoint::Readback);
        let mut baker = Baker::new(renderer, InMemoryAssetStore::new(), Options::default());
        let err = baker.bake(&red_request()).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Readback);

        let renderer = SoftwareRenderer::new().failing_at(FailurePoint::Capture);
        let mut baker = Baker::new(renderer, InMemoryAssetStore::new(), Options::default());
        let request = red_request().with_property(PropertyType::Roughness);
        let err = baker.bake(&request).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Capture);
        assert_eq!(baker.renderer().live_rigs(), 0);
    }

    #[test]
    fn test_request_uses_options() {
        let options = Options {
            default_width: 64,
            default_height: 32,
            ..Options::default()
        };
        let baker = Baker::new(SoftwareRenderer::new(), InMemoryAssetStore::new(), options);
        let request = baker.request(Material::default(), "T_Rock", PropertyType::Normal);
        assert_eq!(request.baked_name, "T_Rock_N");
        assert_eq!((request.texture_width, request.texture_height), (64, 32));
        assert_eq!(request.property, PropertyType::Normal);
    }
}
