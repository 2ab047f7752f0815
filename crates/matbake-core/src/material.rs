//! Surface descriptions handed to the renderer.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// How a material's surface is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BlendMode {
    /// Fully non-transparent; alpha carries no meaning.
    #[default]
    Opaque,
    /// Binary coverage from an opacity mask.
    Masked,
    /// Alpha blended.
    Translucent,
    /// Added on top of the background.
    Additive,
    /// Multiplied with the background.
    Modulate,
}

impl BlendMode {
    /// Returns true when the material's alpha channel is not meaningful.
    pub fn is_opaque(self) -> bool {
        matches!(self, Self::Opaque)
    }
}

/// A flat shaded surface description.
///
/// All attributes are uniform across the surface. Colors are linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name (for logs and default baked names).
    pub name: String,

    /// Blend mode.
    pub blend_mode: BlendMode,

    /// Linear base color.
    pub base_color: Vec3,

    /// Tangent-space normal.
    pub normal: Vec3,

    /// Roughness in [0, 1].
    pub roughness: f32,

    /// Metallic in [0, 1].
    pub metallic: f32,

    /// Specular in [0, 1].
    pub specular: f32,

    /// Opacity in [0, 1].
    pub opacity: f32,

    /// Linear emissive color, may exceed 1.
    pub emissive: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("M_Default"),
            blend_mode: BlendMode::Opaque,
            base_color: Vec3::splat(0.5),
            normal: Vec3::Z,
            roughness: 0.5,
            metallic: 0.0,
            specular: 0.5,
            opacity: 1.0,
            emissive: Vec3::ZERO,
        }
    }
}

impl Material {
    /// Creates an opaque material with a uniform base color.
    pub fn solid(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            name: name.into(),
            base_color: color,
            ..Self::default()
        }
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the roughness.
    #[must_use]
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Sets the metallic value.
    #[must_use]
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    /// Sets the emissive color.
    #[must_use]
    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = emissive;
        self
    }

    /// Unlit final color as seen by a direct material draw.
    ///
    /// Alpha is the opacity for non-opaque materials and 1 otherwise.
    pub fn final_color(&self) -> Vec4 {
        let alpha = if self.blend_mode.is_opaque() {
            1.0
        } else {
            self.opacity
        };
        (self.base_color + self.emissive).extend(alpha)
    }

    /// Normal remapped from [-1, 1] into [0, 1] color space.
    pub fn encoded_normal(&self) -> Vec3 {
        self.normal.normalize_or_zero() * 0.5 + Vec3::splat(0.5)
    }
}
