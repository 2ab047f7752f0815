//! Offscreen render targets.

use matbake_core::TargetConfig;

use crate::error::{RenderError, RenderResult};

/// An offscreen buffer the renderer draws into.
///
/// The contents stay empty until a renderer writes a full frame.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    config: TargetConfig,
    contents: Option<Vec<u8>>,
}

impl RenderTarget {
    /// Creates a target. Both dimensions must be positive.
    pub fn new(config: TargetConfig) -> RenderResult<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(RenderError::InvalidTarget {
                width: config.width,
                height: config.height,
            });
        }
        Ok(Self {
            config,
            contents: None,
        })
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Replaces the contents with a full frame in the target's pixel format.
    pub fn write(&mut self, bytes: Vec<u8>) -> RenderResult<()> {
        let expected = self.config.byte_len();
        if bytes.len() != expected {
            return Err(RenderError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        self.contents = Some(bytes);
        Ok(())
    }

    /// Rendered contents, if any.
    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }

    /// Returns true once a frame has been written.
    pub fn is_rendered(&self) -> bool {
        self.contents.is_some()
    }
}
