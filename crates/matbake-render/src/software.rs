//! A CPU renderer for flat materials.
//!
//! Every material is uniform, so each capture fills the whole target with a
//! single value. Useful for headless baking and for tests, including failure
//! injection at each renderer step.

use std::collections::HashMap;

use glam::{Vec3, Vec4};
use matbake_core::convert::{linear_to_srgb, quantize_u8};
use matbake_core::{Bgra8, Material, PixelFormat, Rgba16F};

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;
use crate::renderer::{CaptureRigDesc, CaptureSource, Renderer, RigId, ShowFlags};

/// A renderer step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// No rendering context.
    Context,
    /// Rig creation fails.
    RigSpawn,
    /// Drawing or capturing fails.
    Capture,
    /// Reading pixels back fails.
    Readback,
    /// Buffer visualization is not supported.
    Visualization,
}

struct Rig {
    material: Material,
    show_flags: ShowFlags,
}

/// CPU renderer that evaluates flat materials.
pub struct SoftwareRenderer {
    visualization: Option<String>,
    rigs: HashMap<RigId, Rig>,
    next_rig: u64,
    failure: Option<FailurePoint>,
    rigs_spawned: usize,
    flushes: usize,
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self {
            visualization: Some(String::new()),
            rigs: HashMap::new(),
            next_rig: 0,
            failure: None,
            rigs_spawned: 0,
            flushes: 0,
        }
    }
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the given step fail on every call.
    #[must_use]
    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.failure = Some(point);
        if point == FailurePoint::Visualization {
            self.visualization = None;
        }
        self
    }

    /// Number of rigs currently alive.
    pub fn live_rigs(&self) -> usize {
        self.rigs.len()
    }

    /// Number of rigs spawned so far.
    pub fn rigs_spawned(&self) -> usize {
        self.rigs_spawned
    }

    /// Number of completed flushes.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.failure == Some(point)
    }

    fn evaluate(&self, rig: &Rig, source: CaptureSource) -> Vec4 {
        let material = &rig.material;
        let alpha = material.final_color().w;
        match source {
            CaptureSource::BaseColor => material.base_color.extend(alpha),
            CaptureSource::Normal => material.encoded_normal().extend(alpha),
            CaptureSource::FinalColorLdr | CaptureSource::FinalColorHdr => {
                let color = match self.visualization.as_deref() {
                    Some("Roughness") => Vec3::splat(material.roughness).extend(alpha),
                    Some("Metallic") => Vec3::splat(material.metallic).extend(alpha),
                    Some("Specular") => Vec3::splat(material.specular).extend(alpha),
                    // Scalar opacity lands in R only.
                    Some("Opacity") => Vec4::new(material.opacity, 0.0, 0.0, 1.0),
                    _ if !rig.show_flags.lighting && !rig.show_flags.tonemapper => {
                        material.emissive.extend(alpha)
                    }
                    _ => material.final_color(),
                };
                if source == CaptureSource::FinalColorLdr {
                    color.clamp(Vec4::ZERO, Vec4::ONE)
                } else {
                    color
                }
            }
        }
    }
}

/// Fills `target` with one linear color in the target's format.
fn fill(target: &mut RenderTarget, color: Vec4) -> RenderResult<()> {
    let config = *target.config();
    let count = config.pixel_count();
    let bytes = match config.format {
        PixelFormat::Bgra8 => {
            let encode = |c: f32| {
                let c = c.clamp(0.0, 1.0);
                quantize_u8(if config.force_linear_gamma {
                    c
                } else {
                    linear_to_srgb(c)
                })
            };
            let pixel = Bgra8::new(
                encode(color.x),
                encode(color.y),
                encode(color.z),
                quantize_u8(color.w),
            );
            bytemuck::cast_slice::<_, u8>(&vec![pixel; count]).to_vec()
        }
        PixelFormat::Rgba16F => {
            let pixel = Rgba16F::new(color.x, color.y, color.z, color.w);
            bytemuck::cast_slice::<_, u8>(&vec![pixel; count]).to_vec()
        }
    };
    target.write(bytes)
}

impl Renderer for SoftwareRenderer {
    fn is_ready(&self) -> bool {
        !self.fails_at(FailurePoint::Context)
    }

    fn draw_final_color(
        &mut self,
        material: &Material,
        target: &mut RenderTarget,
    ) -> RenderResult<()> {
        if self.fails_at(FailurePoint::Capture) {
            return Err(RenderError::CaptureFailed("draw rejected".into()));
        }
        fill(target, material.final_color())
    }

    fn spawn_capture_rig(
        &mut self,
        material: &Material,
        _desc: &CaptureRigDesc,
    ) -> RenderResult<RigId> {
        if self.fails_at(FailurePoint::RigSpawn) {
            return Err(RenderError::RigUnavailable("reference surface missing".into()));
        }
        let id = RigId(self.next_rig);
        self.next_rig += 1;
        self.rigs_spawned += 1;
        self.rigs.insert(
            id,
            Rig {
                material: material.clone(),
                show_flags: ShowFlags::calibrated(),
            },
        );
        Ok(id)
    }

    fn destroy_capture_rig(&mut self, rig: RigId) {
        self.rigs.remove(&rig);
    }

    fn show_flags(&self, rig: RigId) -> Option<ShowFlags> {
        self.rigs.get(&rig).map(|r| r.show_flags)
    }

    fn set_show_flags(&mut self, rig: RigId, flags: ShowFlags) {
        if let Some(r) = self.rigs.get_mut(&rig) {
            r.show_flags = flags;
        }
    }

    fn capture_scene(
        &mut self,
        rig: RigId,
        source: CaptureSource,
        target: &mut RenderTarget,
    ) -> RenderResult<()> {
        if self.fails_at(FailurePoint::Capture) {
            return Err(RenderError::CaptureFailed("scene capture rejected".into()));
        }
        let rig = self
            .rigs
            .get(&rig)
            .ok_or_else(|| RenderError::RigUnavailable(format!("unknown rig {rig:?}")))?;
        let color = self.evaluate(rig, source);
        fill(target, color)
    }

    fn visualization_target(&self) -> Option<String> {
        self.visualization.clone()
    }

    fn set_visualization_target(&mut self, name: &str) {
        if self.visualization.is_some() {
            self.visualization = Some(name.to_string());
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn read_target(&mut self, target: &RenderTarget) -> RenderResult<Vec<u8>> {
        if self.fails_at(FailurePoint::Readback) {
            return Err(RenderError::ReadbackFailed("resource unavailable".into()));
        }
        target
            .contents()
            .map(<[u8]>::to_vec)
            .ok_or(RenderError::TargetNotReady)
    }
}
