//! Screen-space hit testing for selection and picking.
//!
//! Used by external pick/select logic, never by culling. Rects and images
//! are tested as axis-aligned boxes even when drawn rotated; this mirrors
//! how they cull and is a documented limitation.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Viewport};
use crate::consts::{HIT_SLOP_PX, LINE_HEIGHT_FACTOR};
use crate::doc::{ShapeStore, SlotId};
use crate::markup::{Node, Subpath};
use crate::render::TextMeasurer;
use crate::shape::{HAlign, Shape, ShapeKind, VAlign};

/// Precise hit test for one shape against a screen point.
pub fn hit_shape(
    shape: &Shape,
    camera: &Camera,
    viewport: Viewport,
    point: Point,
    measurer: &dyn TextMeasurer,
) -> bool {
    let center = camera.world_to_screen_px(&shape.position, viewport);
    match &shape.kind {
        ShapeKind::Circle { radius } => {
            let r = camera.world_len_to_px(radius, viewport);
            let dx = point.x - center.x;
            let dy = point.y - center.y;
            dx * dx + dy * dy <= r * r
        }
        ShapeKind::Rect { width, height }
        | ShapeKind::Raster { width, height, .. }
        | ShapeKind::Vector { width, height, .. } => {
            let hw = camera.world_len_to_px(width, viewport) * 0.5;
            let hh = camera.world_len_to_px(height, viewport) * 0.5;
            (point.x - center.x).abs() <= hw && (point.y - center.y).abs() <= hh
        }
        ShapeKind::Polygon { points, closed, .. } => {
            let px: Vec<(f64, f64)> = points
                .iter()
                .map(|p| {
                    let s = camera.world_to_screen_px(p, viewport);
                    (s.x, s.y)
                })
                .collect();
            if *closed {
                point_in_poly(&px, point.x, point.y)
            } else {
                near_polyline(&px, point.x, point.y, HIT_SLOP_PX)
            }
        }
        ShapeKind::Text { text, font_size, font_family, h_align, v_align } => {
            let font_size_px = camera.world_len_to_px(font_size, viewport);
            let w = measurer.measure_text(text, font_size_px, font_family);
            let h = font_size_px * LINE_HEIGHT_FACTOR;
            let left = match h_align {
                HAlign::Left => center.x,
                HAlign::Center => center.x - w * 0.5,
                HAlign::Right => center.x - w,
            };
            let top = match v_align {
                VAlign::Top => center.y,
                VAlign::Middle => center.y - h * 0.5,
                VAlign::Bottom => center.y - h,
            };
            point.x >= left && point.x <= left + w && point.y >= top && point.y <= top + h
        }
    }
}

/// Topmost active shape under a screen point. Later slot index is higher
/// z-order, so the last hit wins.
pub fn pick(
    store: &ShapeStore,
    camera: &Camera,
    viewport: Viewport,
    point: Point,
    measurer: &dyn TextMeasurer,
) -> Option<SlotId> {
    let mut found = None;
    for (id, shape) in store.active() {
        if hit_shape(shape, camera, viewport, point, measurer) {
            found = Some(id);
        }
    }
    found
}

/// Inner-element picking for vector images: map the screen point into the
/// markup's local space through position, rotation, and view-box scale,
/// then hit test the parsed primitives in document order. Returns the index
/// of the topmost (last) hit node. `None` for other kinds, degenerate
/// sizes, or no hit.
pub fn pick_markup_node(
    shape: &Shape,
    camera: &Camera,
    viewport: Viewport,
    point: Point,
) -> Option<usize> {
    let ShapeKind::Vector { width, height, rotation, .. } = &shape.kind else {
        return None;
    };
    let center = camera.world_to_screen_px(&shape.position, viewport);
    let w_px = camera.world_len_to_px(width, viewport);
    let h_px = camera.world_len_to_px(height, viewport);
    if w_px <= 0.0 || h_px <= 0.0 {
        return None;
    }

    let theta = rotation.to_radians();
    let (sin, cos) = theta.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    // Inverse rotation back into the image's unrotated frame.
    let local_x = dx * cos + dy * sin;
    let local_y = -dx * sin + dy * cos;

    shape.with_markup_doc(|doc| {
        let vb = doc.view_box;
        let x = vb.x + (local_x / w_px + 0.5) * vb.width;
        let y = vb.y + (local_y / h_px + 0.5) * vb.height;
        // Mean of the two axis scales, so a size override that breaks the
        // aspect coupling does not shrink the slop along one axis.
        let slop = HIT_SLOP_PX * 0.5 * (vb.width / w_px + vb.height / h_px);

        let mut found = None;
        for (i, node) in doc.nodes.iter().enumerate() {
            if hit_node(node, x, y, slop) {
                found = Some(i);
            }
        }
        found
    })?
}

fn hit_node(node: &Node, x: f64, y: f64, slop: f64) -> bool {
    match node {
        Node::Rect { x: rx, y: ry, width, height } => {
            x >= *rx && x <= rx + width && y >= *ry && y <= ry + height
        }
        Node::Circle { cx, cy, r } => {
            let dx = x - cx;
            let dy = y - cy;
            dx * dx + dy * dy <= r * r
        }
        Node::Ellipse { cx, cy, rx, ry } => {
            if *rx <= 0.0 || *ry <= 0.0 {
                return false;
            }
            let nx = (x - cx) / rx;
            let ny = (y - cy) / ry;
            nx * nx + ny * ny <= 1.0
        }
        Node::Line { x1, y1, x2, y2 } => {
            segment_distance((*x1, *y1), (*x2, *y2), (x, y)) <= slop
        }
        Node::Poly { points, closed } => {
            if *closed {
                point_in_poly(points, x, y)
            } else {
                near_polyline(points, x, y, slop)
            }
        }
        Node::Path { subpaths } => subpaths.iter().any(|sp| hit_subpath(sp, x, y, slop)),
    }
}

fn hit_subpath(sp: &Subpath, x: f64, y: f64, slop: f64) -> bool {
    if sp.closed {
        point_in_poly(&sp.points, x, y)
    } else {
        near_polyline(&sp.points, x, y, slop)
    }
}

/// Even-odd point-in-polygon over an implicitly closed vertex list.
fn point_in_poly(points: &[(f64, f64)], x: f64, y: f64) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn near_polyline(points: &[(f64, f64)], x: f64, y: f64, slop: f64) -> bool {
    points
        .windows(2)
        .any(|w| segment_distance(w[0], w[1], (x, y)) <= slop)
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (px, py) = p;
    let abx = bx - ax;
    let aby = by - ay;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((px - ax) * abx + (py - ay) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = ax + abx * t;
    let cy = ay + aby * t;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}
