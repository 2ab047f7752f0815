//! The renderer contract the bake pipeline drives.

use glam::Vec3;
use matbake_core::{Material, Options};

use crate::error::RenderResult;
use crate::render_target::RenderTarget;

/// Scene features a capture can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowFlags {
    pub atmosphere: bool,
    pub fog: bool,
    pub ambient_occlusion: bool,
    pub screen_space_reflections: bool,
    pub lighting: bool,
    pub post_processing: bool,
    pub tonemapper: bool,
}

impl Default for ShowFlags {
    fn default() -> Self {
        Self {
            atmosphere: true,
            fog: true,
            ambient_occlusion: true,
            screen_space_reflections: true,
            lighting: true,
            post_processing: true,
            tonemapper: true,
        }
    }
}

impl ShowFlags {
    /// Flags for a calibrated capture: every scene effect off.
    ///
    /// The tonemapper stays on; only emissive captures disable it.
    pub fn calibrated() -> Self {
        Self {
            atmosphere: false,
            fog: false,
            ambient_occlusion: false,
            screen_space_reflections: false,
            lighting: false,
            post_processing: false,
            tonemapper: true,
        }
    }

    /// Flags for capturing the unlit emissive contribution only.
    #[must_use]
    pub fn emissive_only(self) -> Self {
        Self {
            lighting: false,
            post_processing: false,
            tonemapper: false,
            ..self
        }
    }
}

/// Which renderer output a scene capture writes into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    FinalColorLdr,
    FinalColorHdr,
    BaseColor,
    Normal,
}

/// Placement of the reference surface and capture camera.
///
/// The camera looks straight down at a flat surface through an orthographic
/// projection exactly as wide as the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRigDesc {
    pub camera_location: Vec3,
    /// Pitch, yaw, roll in degrees.
    pub camera_rotation: Vec3,
    pub ortho_width: f32,
}

impl Default for CaptureRigDesc {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl CaptureRigDesc {
    pub fn from_options(options: &Options) -> Self {
        Self {
            camera_location: Vec3::new(0.0, 0.0, options.capture_height),
            camera_rotation: Vec3::new(-90.0, 0.0, -90.0),
            ortho_width: options.ortho_width,
        }
    }
}

/// Handle to a transient reference surface plus capture camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigId(pub u64);

/// A renderer able to draw materials into offscreen targets.
///
/// Buffer visualization state is process-wide: callers must restore anything
/// they change. [`crate::capture::CaptureSession`] does this automatically.
pub trait Renderer {
    /// Returns true when a rendering context exists.
    fn is_ready(&self) -> bool;

    /// Draws the material's final color directly into `target`.
    fn draw_final_color(&mut self, material: &Material, target: &mut RenderTarget)
        -> RenderResult<()>;

    /// Spawns a reference surface with `material` and a capture camera.
    /// New rigs start with [`ShowFlags::calibrated`].
    fn spawn_capture_rig(&mut self, material: &Material, desc: &CaptureRigDesc)
        -> RenderResult<RigId>;

    /// Destroys a rig. Unknown ids are ignored.
    fn destroy_capture_rig(&mut self, rig: RigId);

    /// Current show flags of a rig.
    fn show_flags(&self, rig: RigId) -> Option<ShowFlags>;

    /// Replaces the show flags of a rig.
    fn set_show_flags(&mut self, rig: RigId, flags: ShowFlags);

    /// Renders the rig into `target`.
    fn capture_scene(
        &mut self,
        rig: RigId,
        source: CaptureSource,
        target: &mut RenderTarget,
    ) -> RenderResult<()>;

    /// Current buffer visualization target, or `None` if unsupported.
    fn visualization_target(&self) -> Option<String>;

    /// Selects a buffer visualization by name. Empty means off.
    fn set_visualization_target(&mut self, name: &str);

    /// Blocks until all submitted rendering work has finished.
    fn flush(&mut self);

    /// Copies the rendered contents of `target` to CPU memory.
    fn read_target(&mut self, target: &RenderTarget) -> RenderResult<Vec<u8>> {
        target
            .contents()
            .map(<[u8]>::to_vec)
            .ok_or(crate::error::RenderError::TargetNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrated_flags() {
        let flags = ShowFlags::calibrated();
        assert!(!flags.lighting);
        assert!(!flags.fog);
        assert!(flags.tonemapper);
        assert!(!flags.emissive_only().tonemapper);
    }

    #[test]
    fn test_rig_desc_from_options() {
        let desc = CaptureRigDesc::default();
        assert_eq!(desc.camera_location, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(desc.ortho_width, 200.0);
    }
}
