//! Core abstractions for matbake.
//!
//! This crate provides the engine-independent parts of the bake pipeline:
//! - [`BakeRequest`] and its output parameters
//! - The per-property rule table ([`PropertyType::info`])
//! - Typed pixel buffers and in-place channel post-processing
//! - Conversion to encoder-ready raw images
//! - Texture asset persistence and configuration options

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel dimensions are u32 and buffer lengths usize throughout
#![allow(clippy::cast_possible_truncation)]
// Quantization clamps to [0, 1] before casting
#![allow(clippy::cast_sign_loss)]

pub mod asset;
pub mod convert;
pub mod error;
pub mod material;
pub mod naming;
pub mod options;
pub mod pixel;
pub mod post_process;
pub mod property;
pub mod request;
pub mod stage;
pub mod target;

pub use asset::{
    AssetHandle, AssetStore, DirectoryAssetStore, InMemoryAssetStore, TextureAsset, TextureInfo,
};
pub use convert::{prepare_export, ChannelLayout, RawImage};
pub use error::{BakeError, BakeErrorKind, Result};
pub use material::{BlendMode, Material};
pub use options::Options;
pub use pixel::{Bgra8, PixelBuffer, PixelData, Rgba16F};
pub use property::{CaptureMode, PostProcessRule, PropertyInfo, PropertyType, SceneAttribute};
pub use request::{BakeRequest, BitDepth, CompressionSettings, OutputType};
pub use stage::BakeStage;
pub use target::{PixelFormat, TargetConfig};

// Re-export glam types for convenience
pub use glam::{Vec3, Vec4};
