#![allow(clippy::float_cmp)]

use super::*;

use num_traits::Zero;

use crate::num;
use crate::shape::ImageHandle;
use crate::vec2::Vector2;

fn n(s: &str) -> Num {
    num::parse(s).unwrap()
}

fn v(x: &str, y: &str) -> Vector2 {
    Vector2::new(n(x), n(y))
}

fn engine() -> Engine {
    Engine::new(Viewport::new(800.0, 600.0))
}

/// Minimal context that records which shapes were drawn, in order.
#[derive(Default)]
struct TraceCtx {
    arcs: Vec<f64>,
    rects: usize,
}

impl crate::render::TextMeasurer for TraceCtx {
    fn measure_text(&self, text: &str, font_size_px: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size_px * 0.6
    }
}

impl RenderContext for TraceCtx {
    fn set_alpha(&mut self, _alpha: f64) {}
    fn set_fill_paint(&mut self, _paint: &crate::paint::Paint) {}
    fn set_stroke_paint(&mut self, _paint: &crate::paint::Paint) {}
    fn set_line_width(&mut self, _width_px: f64) {}
    fn begin_path(&mut self) {}
    fn move_to(&mut self, _x: f64, _y: f64) {}
    fn line_to(&mut self, _x: f64, _y: f64) {}
    fn quadratic_to(&mut self, _cx: f64, _cy: f64, _x: f64, _y: f64) {}
    fn arc(&mut self, _cx: f64, _cy: f64, radius: f64) {
        self.arcs.push(radius);
    }
    fn rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.rects += 1;
    }
    fn close_path(&mut self) {}
    fn fill(&mut self) {}
    fn stroke(&mut self) {}
    fn draw_image(
        &mut self,
        _source: ImageHandle,
        _center_x: f64,
        _center_y: f64,
        _width_px: f64,
        _height_px: f64,
        _rotation_degrees: f64,
        _filter: &crate::render::ResolvedFilter,
    ) {
    }
    fn fill_text(
        &mut self,
        _text: &str,
        _x: f64,
        _y: f64,
        _font_size_px: f64,
        _font_family: &str,
        _h_align: crate::shape::HAlign,
        _v_align: crate::shape::VAlign,
    ) {
    }
}

// --- Lifecycle ---

#[test]
fn new_engine_is_empty_at_the_default_view() {
    let e = engine();
    assert!(e.store().is_empty());
    assert_eq!(*e.camera().range(), n("5"));
}

#[test]
fn added_shapes_render_immediately() {
    let mut e = engine();
    e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    let mut ctx = TraceCtx::default();
    e.render(&mut ctx);
    assert_eq!(ctx.arcs.len(), 1);
}

#[test]
fn shapes_render_in_insertion_order() {
    let mut e = engine();
    e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    e.add_shape(Shape::circle(Vector2::zero(), n("2")));
    let mut ctx = TraceCtx::default();
    e.render(&mut ctx);
    assert_eq!(ctx.arcs, vec![120.0, 240.0], "later slot paints over earlier");
}

#[test]
fn delete_shape_stops_rendering_it() {
    let mut e = engine();
    let id = e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    assert!(e.delete_shape(id).is_some());
    assert!(e.shape(id).is_none());
    let mut ctx = TraceCtx::default();
    e.render(&mut ctx);
    assert!(ctx.arcs.is_empty());
}

// --- Tick and the cull gate ---

#[test]
fn first_tick_culls_off_screen_shapes() {
    let mut e = engine();
    e.add_shape(Shape::circle(v("1000", "0"), n("1")));
    e.tick(0.016);
    assert_eq!(e.store().active_count(), 0);
    assert_eq!(e.store().dormant_count(), 1);
}

#[test]
fn cull_is_skipped_while_range_is_stable() {
    let mut e = engine();
    e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    e.tick(0.016);
    assert_eq!(e.store().active_count(), 1);

    // Teleport the camera without touching the range. The gate only
    // watches range drift, so the stale active set survives until an
    // explicit invalidation.
    e.camera_mut().jump_to(v("1e6", "0"), &n("5"));
    e.tick(0.016);
    assert_eq!(e.store().active_count(), 1, "cull should have been skipped");

    e.set_viewport(800.0, 600.0);
    e.tick(0.016);
    assert_eq!(e.store().dormant_count(), 1, "invalidation forces the cull");
}

#[test]
fn zooming_past_the_threshold_triggers_a_cull() {
    let mut e = engine();
    e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    e.tick(0.016);
    assert_eq!(e.store().active_count(), 1);

    // Range 5 -> 1e6 demotes a unit circle far below the scale band.
    e.set_target_range(&n("1e6"));
    for _ in 0..200 {
        e.tick(0.1);
    }
    assert_eq!(e.store().dormant_count(), 1);
}

#[test]
fn mutating_a_shape_invalidates_the_gate() {
    let mut e = engine();
    let id = e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    e.tick(0.016);
    if let Some(s) = e.shape_mut(id) {
        s.translate(&n("1000"), &Num::zero());
    }
    e.tick(0.016);
    assert_eq!(e.store().dormant_count(), 1, "moved shape should demote on next tick");
}

#[test]
fn reset_restores_the_view_and_reculls_immediately() {
    let mut e = engine();
    let id = e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    e.camera_mut().jump_to(v("1e6", "0"), &n("5"));
    e.add_shape(Shape::circle(v("1e6", "0"), n("1")));
    e.tick(0.016);
    assert_eq!(e.store().dormant_count(), 1);

    e.reset();
    assert_eq!(*e.camera().range(), n("5"));
    assert_eq!(*e.camera().position(), Vector2::zero());
    assert!(e.shape(id).is_some());
    assert_eq!(e.store().active_count(), 1, "origin shape is active again before any tick");
}

// --- Picking ---

#[test]
fn pick_goes_through_active_shapes() {
    let mut e = engine();
    let id = e.add_shape(Shape::circle(Vector2::zero(), n("1")));
    let ctx = TraceCtx::default();
    assert_eq!(e.pick(Point::new(400.0, 300.0), &ctx), Some(id));
    assert_eq!(e.pick(Point::new(0.0, 0.0), &ctx), None);
}

// --- Zoom passthrough ---

#[test]
fn zoom_toward_uses_the_engine_viewport() {
    let mut e = engine();
    e.zoom_toward(&n("1"), Point::new(400.0, 300.0));
    assert_eq!(*e.camera().target_range(), n("1"));
    assert_eq!(*e.camera().target_position(), Vector2::zero());
}

#[test]
fn end_to_end_frame() {
    let mut e = engine();
    e.add_shape(Shape::circle(Vector2::zero(), n("2")));
    e.add_shape(Shape::circle(Vector2::zero(), n("10000")));
    e.tick(0.016);
    assert_eq!(e.store().active_count(), 1, "oversized circle is outside the scale band");
    let s = e.camera().world_to_screen(&Vector2::zero(), e.viewport());
    assert_eq!(s, v("400", "300"));
    let mut ctx = TraceCtx::default();
    e.render(&mut ctx);
    assert_eq!(ctx.arcs, vec![240.0]);
}
