//! Rendering error types.

use thiserror::Error;

/// Errors raised by the renderer boundary.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No rendering context is available.
    #[error("no rendering context available")]
    NoContext,

    /// Render target dimensions are not usable.
    #[error("invalid render target size {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },

    /// The reference surface or capture camera could not be created.
    #[error("capture rig unavailable: {0}")]
    RigUnavailable(String),

    /// The buffer visualization target cannot be selected.
    #[error("buffer visualization target is not available")]
    VisualizationUnavailable,

    /// The capture step failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The target has not been rendered to.
    #[error("render target resource is not ready")]
    TargetNotReady,

    /// Reading pixels back from the target failed.
    #[error("pixel readback failed: {0}")]
    ReadbackFailed(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
