//! Capture and encoding backends for matbake.
//!
//! This crate provides the renderer-facing half of the bake pipeline:
//! - The [`Renderer`] contract and a CPU [`SoftwareRenderer`]
//! - Render targets and scoped capture sessions
//! - Pixel readback into typed buffers
//! - Image file encoders backed by the `image` crate

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel math converts between f32 channels and integer storage
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod capture;
pub mod encode;
pub mod error;
pub mod readback;
pub mod render_target;
pub mod renderer;
pub mod software;

pub use capture::{capture_property, CaptureSession};
pub use encode::{
    EncodeError, EncoderFactory, ImageCrateEncoder, ImageCrateEncoders, ImageEncoder,
    ImageFileFormat,
};
pub use error::{RenderError, RenderResult};
pub use readback::read_pixels;
pub use render_target::RenderTarget;
pub use renderer::{CaptureRigDesc, CaptureSource, Renderer, RigId, ShowFlags};
pub use software::{FailurePoint, SoftwareRenderer};
