#![allow(clippy::float_cmp)]

use super::*;

use crate::num::{self, Num};
use crate::shape::ImageHandle;
use crate::vec2::Vector2;

/// Measurer returning a fixed width, enough for box-test geometry.
struct FixedMeasurer(f64);

impl TextMeasurer for FixedMeasurer {
    fn measure_text(&self, _text: &str, _font_size_px: f64, _font_family: &str) -> f64 {
        self.0
    }
}

fn n(s: &str) -> Num {
    num::parse(s).unwrap()
}

fn v(x: &str, y: &str) -> Vector2 {
    Vector2::new(n(x), n(y))
}

fn cam() -> Camera {
    // Default camera: origin, range 5. In an 800x600 viewport the origin
    // lands at (400, 300) and one world unit is 120 px.
    Camera::new()
}

fn vp() -> Viewport {
    Viewport::new(800.0, 600.0)
}

fn hit(shape: &Shape, x: f64, y: f64) -> bool {
    hit_shape(shape, &cam(), vp(), Point::new(x, y), &FixedMeasurer(0.0))
}

// --- Circle ---

#[test]
fn circle_hit_inside_and_on_boundary() {
    let c = Shape::circle(Vector2::zero(), n("1"));
    assert!(hit(&c, 400.0, 300.0));
    assert!(hit(&c, 520.0, 300.0), "boundary point is inside");
    assert!(!hit(&c, 521.0, 300.0));
}

#[test]
fn circle_hit_uses_euclidean_distance() {
    let c = Shape::circle(Vector2::zero(), n("1"));
    // (85, 85) px offset is outside a 120 px radius.
    assert!(!hit(&c, 485.0, 385.0));
    assert!(hit(&c, 480.0, 380.0));
}

// --- Rect and images ---

#[test]
fn rect_hit_is_axis_aligned_box() {
    let r = Shape::rect(Vector2::zero(), n("2"), n("1"));
    assert!(hit(&r, 400.0, 300.0));
    assert!(hit(&r, 520.0, 360.0), "corner is inside");
    assert!(!hit(&r, 521.0, 300.0));
    assert!(!hit(&r, 400.0, 361.0));
}

#[test]
fn rotated_image_still_hit_tests_as_axis_aligned() {
    // Rotation is drawn but deliberately ignored by hit testing.
    let mut img = Shape::raster(Vector2::zero(), n("2"), n("1"), ImageHandle(0));
    img.set_rotation(90.0);
    assert!(hit(&img, 519.0, 300.0));
    assert!(!hit(&img, 400.0, 420.0));
}

// --- Polygon ---

#[test]
fn closed_polygon_uses_even_odd_test() {
    // Unit right triangle at the origin: (0,0) (1,0) (0,1).
    let p = Shape::polygon(vec![v("0", "0"), v("1", "0"), v("0", "1")], true, false);
    assert!(hit(&p, 430.0, 330.0), "centroid-ish point");
    assert!(!hit(&p, 500.0, 400.0), "outside the hypotenuse");
}

#[test]
fn open_polyline_hits_within_slop_of_segments() {
    let p = Shape::polygon(vec![v("-1", "0"), v("1", "0")], false, false);
    // The segment runs from (280,300) to (520,300).
    assert!(hit(&p, 400.0, 305.0));
    assert!(!hit(&p, 400.0, 320.0));
    assert!(!hit(&p, 600.0, 300.0), "beyond the endpoint");
}

// --- Text ---

#[test]
fn text_hit_box_is_centered_by_default() {
    let t = Shape::text(Vector2::zero(), "hi".to_string(), n("1"));
    let measurer = FixedMeasurer(100.0);
    // Centered 100 px wide, 150 px tall box around (400, 300).
    assert!(hit_shape(&t, &cam(), vp(), Point::new(400.0, 300.0), &measurer));
    assert!(hit_shape(&t, &cam(), vp(), Point::new(352.0, 300.0), &measurer));
    assert!(!hit_shape(&t, &cam(), vp(), Point::new(348.0, 300.0), &measurer));
}

#[test]
fn text_alignment_offsets_the_hit_box() {
    let mut t = Shape::text(Vector2::zero(), "hi".to_string(), n("1"));
    if let crate::shape::ShapeKind::Text { h_align, v_align, .. } = &mut t.kind {
        *h_align = HAlign::Left;
        *v_align = VAlign::Top;
    }
    let measurer = FixedMeasurer(100.0);
    assert!(hit_shape(&t, &cam(), vp(), Point::new(450.0, 350.0), &measurer));
    assert!(!hit_shape(&t, &cam(), vp(), Point::new(350.0, 250.0), &measurer));
}

// --- pick ---

#[test]
fn pick_returns_topmost_hit() {
    let mut store = ShapeStore::new();
    let bottom = store.insert(Shape::circle(Vector2::zero(), n("1")));
    let top = store.insert(Shape::circle(Vector2::zero(), n("0.5")));
    let m = FixedMeasurer(0.0);
    let center = Point::new(400.0, 300.0);
    assert_eq!(pick(&store, &cam(), vp(), center, &m), Some(top));
    // Outside the small circle but inside the big one.
    let edge = Point::new(500.0, 300.0);
    assert_eq!(pick(&store, &cam(), vp(), edge, &m), Some(bottom));
    assert_eq!(pick(&store, &cam(), vp(), Point::new(10.0, 10.0), &m), None);
}

#[test]
fn pick_ignores_dormant_shapes() {
    let mut store = ShapeStore::new();
    store.insert(Shape::circle(Vector2::zero(), n("1")));
    let mut far = Camera::new();
    far.jump_to(v("1e6", "0"), &n("5"));
    store.reevaluate(&far, vp());
    assert_eq!(store.dormant_count(), 1);
    let m = FixedMeasurer(0.0);
    assert_eq!(pick(&store, &cam(), vp(), Point::new(400.0, 300.0), &m), None);
}

// --- Inner markup picking ---

fn vector_shape(markup: &str) -> Shape {
    Shape::vector(Vector2::zero(), markup.to_string(), n("1")).unwrap()
}

#[test]
fn inner_pick_maps_through_view_box() {
    // Square view box; the shape spans 120x120 px around (400, 300).
    let s = vector_shape(
        r#"<svg viewBox="0 0 100 100"><rect x="70" y="40" width="20" height="20"/></svg>"#,
    );
    // (430, 300) is 75% across, 50% down: view-box point (75, 50).
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(430.0, 300.0)), Some(0));
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(370.0, 300.0)), None);
}

#[test]
fn inner_pick_returns_last_hit_in_document_order() {
    let s = vector_shape(
        r#"<svg viewBox="0 0 100 100"><rect width="100" height="100"/><circle cx="50" cy="50" r="10"/></svg>"#,
    );
    let center = Point::new(400.0, 300.0);
    assert_eq!(pick_markup_node(&s, &cam(), vp(), center), Some(1));
    // Off the circle but still on the backdrop rect.
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(440.0, 340.0)), Some(0));
}

#[test]
fn inner_pick_accounts_for_rotation() {
    // Node fills the right half of the view box. With the shape rotated a
    // quarter turn, that half appears below the center on screen.
    let s = {
        let mut s = vector_shape(
            r#"<svg viewBox="0 0 100 100"><rect x="50" width="50" height="100"/></svg>"#,
        );
        s.set_rotation(90.0);
        s
    };
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(400.0, 330.0)), Some(0));
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(400.0, 270.0)), None);
}

#[test]
fn inner_pick_slop_averages_both_axis_scales() {
    // Squash the image to a quarter of its height: 120x30 px on screen, so
    // the x scale is 100/120 and the y scale 100/30. The slop must reflect
    // both, not just x.
    let mut s = vector_shape(
        r#"<svg viewBox="0 0 100 100"><line x1="0" y1="50" x2="100" y2="50"/></svg>"#,
    );
    s.set_image_size(n("1"), n("0.25"));
    // (400, 303) is 10 view-box units below the line: inside the averaged
    // slop (~16.7), outside an x-only slop (~6.7).
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(400.0, 303.0)), Some(0));
    // 20 units below is outside even the averaged slop.
    assert_eq!(pick_markup_node(&s, &cam(), vp(), Point::new(400.0, 306.0)), None);
}

#[test]
fn inner_pick_rejects_non_vector_kinds() {
    let c = Shape::circle(Vector2::zero(), n("1"));
    assert_eq!(pick_markup_node(&c, &cam(), vp(), Point::new(400.0, 300.0)), None);
}
