//! matbake: bake material properties into texture assets or image files.
//!
//! A bake captures one property of a material (final color, base color,
//! normal, roughness, ...) into an offscreen target, reads the pixels back,
//! fixes up channels, and hands the result to a texture asset store or an
//! image file encoder.
//!
//! # Quick Start
//!
//! ```no_run
//! use matbake::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     let mut baker: Baker = Baker::default();
//!     let request = BakeRequest::new(Material::solid("M_Red", Vec3::X), "T_Red")
//!         .with_size(256, 256)
//!         .with_bit_depth(BitDepth::Bit8)
//!         .with_output(OutputType::Png)
//!         .with_output_path("/tmp/baked")
//!         .with_srgb(true);
//!
//!     let output = baker.bake(&request)?;
//!     println!("wrote {output}");
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! - [`TargetConfig`] derives the target format and gamma handling
//! - [`capture_property`] drives the [`Renderer`]
//! - [`read_pixels`] copies the target into a [`PixelBuffer`]
//! - [`post_process::apply`] fixes opacity and alpha channels in place
//! - [`export_file`] or an [`AssetStore`] consumes the buffer
//!
//! Batches go through [`validate_batch`] first and then run one request at a
//! time via [`Baker::bake_batch`].

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod batch;
mod export;
mod pipeline;

pub use batch::{validate_batch, BakeQueue, BatchOutcome, BatchReport, CancelToken};
pub use export::export_file;
pub use pipeline::{BakeOutput, Baker};

// Re-export core types
pub use matbake_core::{
    naming, post_process, AssetHandle, AssetStore, BakeError, BakeErrorKind, BakeRequest,
    BakeStage, BitDepth, BlendMode, CompressionSettings, DirectoryAssetStore,
    InMemoryAssetStore, Material, Options, OutputType, PixelBuffer, PixelFormat, PropertyType,
    Result, TargetConfig, TextureAsset, TextureInfo, Vec3, Vec4,
};

// Re-export render types
pub use matbake_render::{
    capture_property, read_pixels, CaptureRigDesc, EncoderFactory, FailurePoint,
    ImageCrateEncoders, ImageEncoder, ImageFileFormat, RenderError, Renderer, SoftwareRenderer,
};

/// Initializes logging.
///
/// Safe to call more than once; later calls leave the existing logger alone.
pub fn init() {
    let _ = env_logger::try_init();
    log::debug!("matbake initialized");
}
