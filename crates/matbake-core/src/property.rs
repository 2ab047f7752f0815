//! Material properties that can be baked, and the per-property rules that
//! drive capture, post-processing, and naming.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A material property to bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PropertyType {
    #[default]
    FinalColor,
    BaseColor,
    Normal,
    Roughness,
    Metallic,
    Specular,
    Opacity,
    EmissiveColor,
}

/// Material attribute buffers written directly by a scene capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAttribute {
    BaseColor,
    Normal,
}

/// How the renderer produces the pixels for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Draw the material straight into the target.
    DirectDraw,
    /// Scene capture of a material attribute buffer.
    SceneAttribute(SceneAttribute),
    /// Scene capture with the named buffer visualization selected.
    BufferVisualization(&'static str),
    /// Scene capture of the HDR final color with lighting, post-processing,
    /// and tonemapping disabled.
    EmissiveHdr,
}

/// Channel fix-up applied after readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessRule {
    /// Replicate R into G, B, and A.
    ReplicateRed,
    /// Force alpha to fully opaque when the material is opaque.
    ClampOpaqueAlpha,
}

/// Static description of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    pub display_name: &'static str,
    pub capture: CaptureMode,
    pub post_process: PostProcessRule,
    /// Whether sRGB output is meaningful for this property.
    pub color_like: bool,
    /// Suffix appended to baked names when automatic suffixing is enabled.
    pub suffix: Option<&'static str>,
}

const PROPERTY_TABLE: [(PropertyType, PropertyInfo); 8] = [
    (
        PropertyType::FinalColor,
        PropertyInfo {
            display_name: "Final Color",
            capture: CaptureMode::DirectDraw,
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: true,
            suffix: None,
        },
    ),
    (
        PropertyType::BaseColor,
        PropertyInfo {
            display_name: "Base Color",
            capture: CaptureMode::SceneAttribute(SceneAttribute::BaseColor),
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: true,
            suffix: Some("_BC"),
        },
    ),
    (
        PropertyType::Normal,
        PropertyInfo {
            display_name: "Normal",
            capture: CaptureMode::SceneAttribute(SceneAttribute::Normal),
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: false,
            suffix: Some("_N"),
        },
    ),
    (
        PropertyType::Roughness,
        PropertyInfo {
            display_name: "Roughness",
            capture: CaptureMode::BufferVisualization("Roughness"),
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: false,
            suffix: Some("_R"),
        },
    ),
    (
        PropertyType::Metallic,
        PropertyInfo {
            display_name: "Metallic",
            capture: CaptureMode::BufferVisualization("Metallic"),
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: false,
            suffix: Some("_M"),
        },
    ),
    (
        PropertyType::Specular,
        PropertyInfo {
            display_name: "Specular",
            capture: CaptureMode::BufferVisualization("Specular"),
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: false,
            suffix: None,
        },
    ),
    (
        PropertyType::Opacity,
        PropertyInfo {
            display_name: "Opacity",
            capture: CaptureMode::BufferVisualization("Opacity"),
            post_process: PostProcessRule::ReplicateRed,
            color_like: false,
            suffix: Some("_O"),
        },
    ),
    (
        PropertyType::EmissiveColor,
        PropertyInfo {
            display_name: "Emissive Color",
            capture: CaptureMode::EmissiveHdr,
            post_process: PostProcessRule::ClampOpaqueAlpha,
            color_like: true,
            suffix: Some("_E"),
        },
    ),
];

impl PropertyType {
    /// All properties, in declaration order.
    pub const ALL: [PropertyType; 8] = [
        Self::FinalColor,
        Self::BaseColor,
        Self::Normal,
        Self::Roughness,
        Self::Metallic,
        Self::Specular,
        Self::Opacity,
        Self::EmissiveColor,
    ];

    /// Returns the table entry for this property.
    pub fn info(self) -> &'static PropertyInfo {
        // The table is declared in the same order as the enum.
        &PROPERTY_TABLE[self as usize].1
    }

    /// Whether sRGB output applies to this property.
    pub fn is_color_like(self) -> bool {
        self.info().color_like
    }

    /// Name suffix for automatic naming, if any.
    pub fn suffix(self) -> Option<&'static str> {
        self.info().suffix
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.info().display_name)
    }
}
