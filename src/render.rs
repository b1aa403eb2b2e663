//! Rendering backend trait and per-kind draw dispatch.
//!
//! The core never talks to a real canvas. [`RenderContext`] is the seam: a
//! Canvas2D-shaped surface the host implements (and tests implement with a
//! recording stub). All coordinates handed to the context are screen pixels;
//! every world-to-pixel conversion happens here.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point, Viewport};
use crate::consts::{IMAGE_FILL, PLACEHOLDER_FILL, PLACEHOLDER_STROKE};
use crate::paint::{self, Fill, GradientKind, Paint};
use crate::shape::{HAlign, ImageFilter, ImageHandle, Shape, ShapeKind, VAlign};
use crate::vec2::Vector2;

/// Text measurement, needed by text hit-testing and gradient anchoring as
/// well as by drawing.
pub trait TextMeasurer {
    /// Width in pixels of `text` at `font_size_px` in `font_family`.
    fn measure_text(&self, text: &str, font_size_px: f64, font_family: &str) -> f64;
}

/// Raster filter with the blur already converted to pixels at the current
/// zoom. Color adjustments are zoom-independent percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFilter {
    pub blur_px: f64,
    pub hue: f64,
    pub brightness: f64,
    pub saturation: f64,
    pub contrast: f64,
}

/// The drawing surface contract, modeled on the 2D canvas API.
pub trait RenderContext: TextMeasurer {
    fn set_alpha(&mut self, alpha: f64);
    fn set_fill_paint(&mut self, paint: &Paint);
    fn set_stroke_paint(&mut self, paint: &Paint);
    fn set_line_width(&mut self, width_px: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    /// Full circle centered at `(cx, cy)`.
    fn arc(&mut self, cx: f64, cy: f64, radius: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn draw_image(
        &mut self,
        source: ImageHandle,
        center_x: f64,
        center_y: f64,
        width_px: f64,
        height_px: f64,
        rotation_degrees: f64,
        filter: &ResolvedFilter,
    );
    #[allow(clippy::too_many_arguments)]
    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size_px: f64,
        font_family: &str,
        h_align: HAlign,
        v_align: VAlign,
    );
}

/// Draw one shape. The operation order is fixed: alpha, fill paint, stroke
/// paint, stroke width, path, fill, stroke, alpha restored to opaque.
/// Stroke width is a world-space quantity converted at the current zoom,
/// not a fixed pixel width.
pub fn draw(shape: &Shape, camera: &Camera, viewport: Viewport, ctx: &mut dyn RenderContext) {
    ctx.set_alpha(shape.opacity);

    let fill_paint = resolve_style(shape, &shape.fill, camera, viewport, ctx);
    ctx.set_fill_paint(&fill_paint);
    let stroke_paint = resolve_style(shape, &shape.stroke, camera, viewport, ctx);
    ctx.set_stroke_paint(&stroke_paint);
    ctx.set_line_width(camera.world_len_to_px(&shape.stroke_width, viewport));

    let center = camera.world_to_screen_px(&shape.position, viewport);
    match &shape.kind {
        ShapeKind::Circle { radius } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, camera.world_len_to_px(radius, viewport));
            ctx.fill();
            if shape.stroke_enabled {
                ctx.stroke();
            }
        }
        ShapeKind::Rect { width, height } => {
            let w = camera.world_len_to_px(width, viewport);
            let h = camera.world_len_to_px(height, viewport);
            ctx.begin_path();
            ctx.rect(center.x - w * 0.5, center.y - h * 0.5, w, h);
            ctx.fill();
            if shape.stroke_enabled {
                ctx.stroke();
            }
        }
        ShapeKind::Polygon { points, closed, smooth, .. } => {
            if points.len() < 2 {
                ctx.set_alpha(1.0);
                return;
            }
            ctx.begin_path();
            trace_polygon(points, *smooth, camera, viewport, ctx);
            if *closed {
                ctx.close_path();
                ctx.fill();
            }
            if shape.stroke_enabled {
                ctx.stroke();
            }
        }
        ShapeKind::Text { text, font_size, font_family, h_align, v_align } => {
            let font_size_px = camera.world_len_to_px(font_size, viewport);
            ctx.fill_text(text, center.x, center.y, font_size_px, font_family, *h_align, *v_align);
        }
        ShapeKind::Raster { width, height, rotation, source, filter } => {
            let w = camera.world_len_to_px(width, viewport);
            let h = camera.world_len_to_px(height, viewport);
            ctx.draw_image(
                *source,
                center.x,
                center.y,
                w,
                h,
                *rotation,
                &resolve_filter(filter, camera, viewport),
            );
        }
        ShapeKind::Vector { width, height, rotation, decode, .. } => {
            let w = camera.world_len_to_px(width, viewport);
            let h = camera.world_len_to_px(height, viewport);
            if let Some(raster) = decode.get() {
                ctx.draw_image(
                    raster,
                    center.x,
                    center.y,
                    w,
                    h,
                    *rotation,
                    &resolve_filter(&ImageFilter::default(), camera, viewport),
                );
            } else {
                draw_placeholder(center, w, h, ctx);
            }
        }
    }

    ctx.set_alpha(1.0);
}

/// Neutral box drawn while a vector image's backing raster has not decoded.
fn draw_placeholder(center: Point, w: f64, h: f64, ctx: &mut dyn RenderContext) {
    ctx.set_fill_paint(&Paint::Solid(PLACEHOLDER_FILL.to_string()));
    ctx.set_stroke_paint(&Paint::Solid(PLACEHOLDER_STROKE.to_string()));
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.rect(center.x - w * 0.5, center.y - h * 0.5, w, h);
    ctx.fill();
    ctx.stroke();
}

fn trace_polygon(
    points: &[Vector2],
    smooth: bool,
    camera: &Camera,
    viewport: Viewport,
    ctx: &mut dyn RenderContext,
) {
    let px: Vec<Point> = points
        .iter()
        .map(|p| camera.world_to_screen_px(p, viewport))
        .collect();
    ctx.move_to(px[0].x, px[0].y);
    if smooth {
        // Every other vertex is a quadratic control point.
        let mut i = 1;
        while i + 1 < px.len() {
            ctx.quadratic_to(px[i].x, px[i].y, px[i + 1].x, px[i + 1].y);
            i += 2;
        }
        if i < px.len() {
            ctx.line_to(px[i].x, px[i].y);
        }
    } else {
        for p in &px[1..] {
            ctx.line_to(p.x, p.y);
        }
    }
}

/// Resolve a fill or stroke style into a screen-space paint. Image kinds
/// never carry a gradient; they resolve to the fixed white fill since the
/// raster itself supplies the color.
fn resolve_style(
    shape: &Shape,
    style: &Fill,
    camera: &Camera,
    viewport: Viewport,
    ctx: &dyn RenderContext,
) -> Paint {
    match style {
        Fill::Solid(color) => Paint::Solid(color.clone()),
        Fill::Gradient(g) => {
            if matches!(shape.kind, ShapeKind::Raster { .. } | ShapeKind::Vector { .. }) {
                return Paint::Solid(IMAGE_FILL.to_string());
            }
            let radial = matches!(g.kind, GradientKind::Radial);
            let (anchor, scale_px) = gradient_geometry(shape, radial, camera, viewport, ctx);
            paint::resolve(style, anchor, scale_px)
        }
    }
}

/// Screen-space anchor and radius-equivalent scale for gradient resolution.
fn gradient_geometry(
    shape: &Shape,
    radial: bool,
    camera: &Camera,
    viewport: Viewport,
    ctx: &dyn RenderContext,
) -> (Point, f64) {
    let center = camera.world_to_screen_px(&shape.position, viewport);
    match &shape.kind {
        ShapeKind::Circle { radius } => (center, camera.world_len_to_px(radius, viewport)),
        ShapeKind::Rect { width, height } => {
            let longer = if width > height { width } else { height };
            let px = camera.world_len_to_px(longer, viewport);
            // max/2 along the axis; max/sqrt(2) radially, to reach corners.
            let scale = if radial { px / std::f64::consts::SQRT_2 } else { px * 0.5 };
            (center, scale)
        }
        ShapeKind::Polygon { .. } => shape.fresh_bounds().map_or((center, 0.0), |b| {
            (
                camera.world_to_screen_px(&b.center, viewport),
                camera.world_len_to_px(&b.extent, viewport),
            )
        }),
        ShapeKind::Text { text, font_size, font_family, .. } => {
            let font_size_px = camera.world_len_to_px(font_size, viewport);
            let width = ctx.measure_text(text, font_size_px, font_family);
            (center, width * 0.5)
        }
        // Unreachable through resolve_style; kept total.
        ShapeKind::Raster { .. } | ShapeKind::Vector { .. } => (center, 0.0),
    }
}

fn resolve_filter(filter: &ImageFilter, camera: &Camera, viewport: Viewport) -> ResolvedFilter {
    ResolvedFilter {
        blur_px: camera.world_len_to_px(&filter.blur, viewport),
        hue: filter.hue,
        brightness: filter.brightness,
        saturation: filter.saturation,
        contrast: filter.contrast,
    }
}
