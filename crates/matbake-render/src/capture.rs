//! Capturing a material property into a render target.
//!
//! Non-final-color properties need a transient reference surface and may
//! change process-wide renderer state. [`CaptureSession`] owns all of that
//! for the duration of one capture and undoes it on drop, including on early
//! returns.

use std::sync::{Mutex, MutexGuard, PoisonError};

use matbake_core::{CaptureMode, Material, PropertyType, SceneAttribute};

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;
use crate::renderer::{CaptureRigDesc, CaptureSource, Renderer, RigId, ShowFlags};

/// Serializes captures, and with them global visualization state.
static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

fn lock_captures() -> MutexGuard<'static, ()> {
    CAPTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scoped ownership of a capture rig and any state changed through it.
pub struct CaptureSession<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
    rig: RigId,
    saved_visualization: Option<String>,
    saved_show_flags: Option<ShowFlags>,
    _lock: Option<MutexGuard<'static, ()>>,
}

impl<'a, R: Renderer + ?Sized> CaptureSession<'a, R> {
    /// Acquires the capture lock and spawns a rig for `material`.
    pub fn begin(
        renderer: &'a mut R,
        material: &Material,
        desc: &CaptureRigDesc,
    ) -> RenderResult<Self> {
        Self::spawn(renderer, material, desc, Some(lock_captures()))
    }

    /// Spawns a rig. A caller passing `None` must already hold the lock.
    fn spawn(
        renderer: &'a mut R,
        material: &Material,
        desc: &CaptureRigDesc,
        lock: Option<MutexGuard<'static, ()>>,
    ) -> RenderResult<Self> {
        let rig = renderer.spawn_capture_rig(material, desc)?;
        log::debug!("spawned capture rig {rig:?} for '{}'", material.name);
        Ok(Self {
            renderer,
            rig,
            saved_visualization: None,
            saved_show_flags: None,
            _lock: lock,
        })
    }

    pub fn rig(&self) -> RigId {
        self.rig
    }

    /// Selects a buffer visualization, remembering the previous value.
    pub fn select_visualization(&mut self, name: &str) -> RenderResult<()> {
        let current = self
            .renderer
            .visualization_target()
            .ok_or(RenderError::VisualizationUnavailable)?;
        if self.saved_visualization.is_none() {
            self.saved_visualization = Some(current);
        }
        self.renderer.set_visualization_target(name);
        Ok(())
    }

    /// Current show flags of the rig.
    pub fn show_flags(&self) -> ShowFlags {
        self.renderer.show_flags(self.rig).unwrap_or_else(ShowFlags::calibrated)
    }

    /// Changes the rig's show flags, remembering the previous value.
    pub fn set_show_flags(&mut self, flags: ShowFlags) {
        if self.saved_show_flags.is_none() {
            self.saved_show_flags = Some(self.show_flags());
        }
        self.renderer.set_show_flags(self.rig, flags);
    }

    /// Renders the rig into `target`.
    pub fn capture(
        &mut self,
        source: CaptureSource,
        target: &mut RenderTarget,
    ) -> RenderResult<()> {
        self.renderer.capture_scene(self.rig, source, target)
    }
}

impl<R: Renderer + ?Sized> Drop for CaptureSession<'_, R> {
    fn drop(&mut self) {
        if let Some(previous) = self.saved_visualization.take() {
            self.renderer.set_visualization_target(&previous);
        }
        if let Some(previous) = self.saved_show_flags.take() {
            self.renderer.set_show_flags(self.rig, previous);
        }
        self.renderer.destroy_capture_rig(self.rig);
        log::debug!("released capture rig {:?}", self.rig);
    }
}

/// Renders `property` of `material` into `target`, then flushes.
///
/// Final color is drawn directly. Every other property is captured from a
/// reference surface in a [`CaptureSession`]. The capture lock is held from
/// the first renderer call through the flush.
pub fn capture_property<R: Renderer + ?Sized>(
    renderer: &mut R,
    material: &Material,
    property: PropertyType,
    target: &mut RenderTarget,
    desc: &CaptureRigDesc,
) -> RenderResult<()> {
    let _lock = lock_captures();
    if !renderer.is_ready() {
        return Err(RenderError::NoContext);
    }

    let hdr = target.config().is_hdr();
    match property.info().capture {
        CaptureMode::DirectDraw => renderer.draw_final_color(material, target)?,
        CaptureMode::SceneAttribute(attribute) => {
            let source = match attribute {
                SceneAttribute::BaseColor => CaptureSource::BaseColor,
                SceneAttribute::Normal => CaptureSource::Normal,
            };
            let mut session = CaptureSession::spawn(&mut *renderer, material, desc, None)?;
            session.capture(source, target)?;
        }
        CaptureMode::BufferVisualization(name) => {
            let source = if hdr {
                CaptureSource::FinalColorHdr
            } else {
                CaptureSource::FinalColorLdr
            };
            let mut session = CaptureSession::spawn(&mut *renderer, material, desc, None)?;
            session.select_visualization(name)?;
            session.capture(source, target)?;
        }
        CaptureMode::EmissiveHdr => {
            let mut session = CaptureSession::spawn(&mut *renderer, material, desc, None)?;
            let flags = session.show_flags().emissive_only();
            session.set_show_flags(flags);
            session.capture(CaptureSource::FinalColorHdr, target)?;
        }
    }

    renderer.flush();
    Ok(())
}
