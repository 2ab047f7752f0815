//! Error types for matbake.

use thiserror::Error;

use crate::stage::BakeStage;

/// The main error type for bake operations.
///
/// Every variant is terminal for the request that raised it; nothing is
/// retried automatically.
#[derive(Error, Debug)]
pub enum BakeError {
    /// No rendering context is available.
    #[error("setup error: {0}")]
    Setup(String),

    /// The capture rig or render target could not be obtained, or the
    /// capture step itself failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// The render target resource or its pixels could not be read back.
    #[error("readback error: {0}")]
    Readback(String),

    /// Incompatible request configuration (e.g. EXR with 8-bit depth).
    #[error("configuration error: {0}")]
    Config(String),

    /// The encoder rejected the raw buffer.
    #[error("encode error: {0}")]
    Encode(String),

    /// Batch-level validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Discriminant of [`BakeError`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BakeErrorKind {
    Setup,
    Capture,
    Readback,
    Config,
    Encode,
    Validation,
    SizeMismatch,
    Io,
    Json,
}

impl BakeError {
    /// Returns the payload-free kind of this error.
    pub fn kind(&self) -> BakeErrorKind {
        match self {
            Self::Setup(_) => BakeErrorKind::Setup,
            Self::Capture(_) => BakeErrorKind::Capture,
            Self::Readback(_) => BakeErrorKind::Readback,
            Self::Config(_) => BakeErrorKind::Config,
            Self::Encode(_) => BakeErrorKind::Encode,
            Self::Validation(_) => BakeErrorKind::Validation,
            Self::SizeMismatch { .. } => BakeErrorKind::SizeMismatch,
            Self::Io(_) => BakeErrorKind::Io,
            Self::Json(_) => BakeErrorKind::Json,
        }
    }

    /// Returns the last stage that completed before this error, if the error
    /// belongs to a single bake.
    ///
    /// Batch validation and file-format errors are not tied to a stage.
    pub fn stage(&self) -> Option<BakeStage> {
        match self {
            Self::Setup(_) | Self::Capture(_) | Self::Config(_) => Some(BakeStage::Configured),
            Self::Readback(_) => Some(BakeStage::Captured),
            Self::SizeMismatch { .. } | Self::Encode(_) | Self::Io(_) => {
                Some(BakeStage::PostProcessed)
            }
            Self::Validation(_) | Self::Json(_) => None,
        }
    }
}

/// A specialized Result type for bake operations.
pub type Result<T> = std::result::Result<T, BakeError>;
