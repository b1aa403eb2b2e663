//! Frame driver tying the camera, store, and cull gate together.
//!
//! One [`Engine`] per viewport. The host calls [`Engine::tick`] once per
//! animation frame, then [`Engine::render`] with its drawing surface. The
//! cull pass is threshold-gated: it re-runs only when the camera range has
//! drifted past the gate's trigger or after an explicit invalidation.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, trace};

use crate::camera::{Camera, Point, Viewport};
use crate::doc::{CullGate, ShapeStore, SlotId};
use crate::hit;
use crate::num::Num;
use crate::render::{self, RenderContext, TextMeasurer};
use crate::shape::Shape;

pub struct Engine {
    camera: Camera,
    store: ShapeStore,
    gate: CullGate,
    viewport: Viewport,
}

impl Engine {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            camera: Camera::new(),
            store: ShapeStore::new(),
            gate: CullGate::new(),
            viewport,
        }
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[must_use]
    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
        self.gate.invalidate();
    }

    /// Advance the camera, then re-cull if the gate triggers.
    pub fn tick(&mut self, dt_seconds: f64) {
        self.camera.tick(dt_seconds);
        if self.gate.should_cull(self.camera.range()) {
            self.store.reevaluate(&self.camera, self.viewport);
            self.gate.mark(self.camera.range());
        }
    }

    /// Draw the active set in slot order (z-order).
    pub fn render(&self, ctx: &mut dyn RenderContext) {
        for (_, shape) in self.store.active() {
            render::draw(shape, &self.camera, self.viewport, ctx);
        }
    }

    /// Insert a shape. It renders starting this frame; the gate is
    /// invalidated so the next tick re-culls it properly.
    pub fn add_shape(&mut self, shape: Shape) -> SlotId {
        trace!(id = %shape.id, "add shape");
        self.gate.invalidate();
        self.store.insert(shape)
    }

    pub fn delete_shape(&mut self, id: SlotId) -> Option<Shape> {
        self.gate.invalidate();
        let removed = self.store.remove(id);
        if let Some(shape) = &removed {
            trace!(id = %shape.id, "delete shape");
        }
        removed
    }

    pub fn shape(&self, id: SlotId) -> Option<&Shape> {
        self.store.get(id)
    }

    pub fn shape_mut(&mut self, id: SlotId) -> Option<&mut Shape> {
        self.gate.invalidate();
        self.store.get_mut(id)
    }

    /// Reset the camera to the startup view and force a full re-cull now.
    pub fn reset(&mut self) {
        debug!("camera reset");
        self.camera.reset();
        self.store.reevaluate(&self.camera, self.viewport);
        self.gate.mark(self.camera.range());
    }

    /// Topmost active shape under a screen point.
    #[must_use]
    pub fn pick(&self, point: Point, measurer: &dyn TextMeasurer) -> Option<SlotId> {
        hit::pick(&self.store, &self.camera, self.viewport, point, measurer)
    }

    /// Convenience passthroughs for input handlers.
    pub fn set_target_range(&mut self, range: &Num) {
        self.camera.set_target_range(range);
    }

    pub fn zoom_toward(&mut self, target_range: &Num, anchor: Point) {
        self.camera.zoom_toward(target_range, anchor, self.viewport);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}
