//! Copying rendered targets back to typed CPU buffers.

use matbake_core::PixelBuffer;

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;
use crate::renderer::Renderer;

/// Reads `target` into a [`PixelBuffer`].
///
/// 8-bit targets yield BGRA8 pixels, 16-bit targets half-float RGBA. The
/// bytes are copied as-is; no conversion happens here.
pub fn read_pixels<R: Renderer + ?Sized>(
    renderer: &mut R,
    target: &RenderTarget,
) -> RenderResult<PixelBuffer> {
    if !target.is_rendered() {
        return Err(RenderError::TargetNotReady);
    }
    let bytes = renderer.read_target(target)?;
    let config = target.config();
    let expected = config.byte_len();
    if bytes.len() != expected {
        return Err(RenderError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    PixelBuffer::from_bytes(config.width, config.height, config.format, &bytes)
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))
}
