//! Shape model: kinds, geometry, styling, renderability, serde.
//!
//! A [`Shape`] is common placement/styling plus a closed [`ShapeKind`]
//! discriminated union. The kind is fixed at construction; only the fields
//! of the active variant are ever meaningful. Shapes serialize to JSON with
//! a lowercase `kind` tag and scientific-notation strings for every
//! big-decimal field, so a round trip preserves coordinates exactly at any
//! magnitude.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::camera::{Camera, Viewport};
use crate::consts::{
    DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, IMAGE_FILL, IMAGE_SCALE_MIN_EXP,
    LINE_HEIGHT_FACTOR, SCALE_MAX_EXP, SCALE_MIN_EXP, TEXT_WIDTH_FACTOR,
};
use crate::markup::{self, MarkupDoc, MarkupError};
use crate::num::{self, Num};
use crate::paint::Fill;
use crate::vec2::Vector2;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("unsupported shape kind: {0}")]
    UnsupportedKind(String),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// Opaque reference to decoded pixel data owned by the asset layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle(pub u64);

/// Promise-like handle for an in-flight vector-image rasterization. The
/// asset layer holds a clone and calls [`DecodeHandle::complete`] when the
/// backing raster is ready; the render path polls [`DecodeHandle::get`]
/// each frame. Single-threaded by design.
#[derive(Debug, Clone, Default)]
pub struct DecodeHandle {
    inner: Rc<Cell<Option<ImageHandle>>>,
}

impl DecodeHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&self, handle: ImageHandle) {
        self.inner.set(Some(handle));
    }

    #[must_use]
    pub fn get(&self) -> Option<ImageHandle> {
        self.inner.get()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}

impl PartialEq for DecodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.get() == other.inner.get()
    }
}

/// Raster compositing filter. Blur is a world-space length so it scales
/// with zoom; the color adjustments are fixed percentages and do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFilter {
    #[serde(with = "num::serde_num", default = "Num::zero")]
    pub blur: Num,
    #[serde(default)]
    pub hue: f64,
    #[serde(default = "full_percent")]
    pub brightness: f64,
    #[serde(default = "full_percent")]
    pub saturation: f64,
    #[serde(default = "full_percent")]
    pub contrast: f64,
}

fn full_percent() -> f64 {
    100.0
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            blur: Num::zero(),
            hue: 0.0,
            brightness: 100.0,
            saturation: 100.0,
            contrast: 100.0,
        }
    }
}

impl ImageFilter {
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.blur.is_zero()
            && self.hue == 0.0
            && self.brightness == 100.0
            && self.saturation == 100.0
            && self.contrast == 100.0
    }
}

/// Cached polygon bounding data: centroid of the vertices and the largest
/// vertex distance from it. Consumed by gradient anchoring and, loosely, by
/// the cull test.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyBounds {
    pub center: Vector2,
    pub extent: Num,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeKind {
    Circle {
        #[serde(with = "num::serde_num")]
        radius: Num,
    },
    /// Axis-aligned rectangle centered on the shape position.
    Rect {
        #[serde(with = "num::serde_num")]
        width: Num,
        #[serde(with = "num::serde_num")]
        height: Num,
    },
    Polygon {
        points: Vec<Vector2>,
        closed: bool,
        /// Draw every other vertex as a quadratic control point.
        smooth: bool,
        #[serde(skip)]
        bounds: RefCell<Option<PolyBounds>>,
        #[serde(skip)]
        bounds_dirty: Cell<bool>,
    },
    Text {
        text: String,
        #[serde(with = "num::serde_num")]
        font_size: Num,
        font_family: String,
        h_align: HAlign,
        v_align: VAlign,
    },
    Raster {
        #[serde(with = "num::serde_num")]
        width: Num,
        #[serde(with = "num::serde_num")]
        height: Num,
        rotation: f64,
        source: ImageHandle,
        #[serde(default)]
        filter: ImageFilter,
    },
    Vector {
        #[serde(with = "num::serde_num")]
        width: Num,
        #[serde(with = "num::serde_num")]
        height: Num,
        rotation: f64,
        markup: String,
        aspect_ratio: f64,
        #[serde(skip)]
        doc: RefCell<Option<MarkupDoc>>,
        #[serde(skip)]
        decode: DecodeHandle,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: Uuid,
    pub position: Vector2,
    pub fill: Fill,
    pub stroke_enabled: bool,
    pub stroke: Fill,
    #[serde(with = "num::serde_num")]
    pub stroke_width: Num,
    pub opacity: f64,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    fn base(position: Vector2, kind: ShapeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            fill: Fill::solid(DEFAULT_FILL),
            stroke_enabled: false,
            stroke: Fill::solid(DEFAULT_STROKE),
            stroke_width: num::from_f64(DEFAULT_STROKE_WIDTH),
            opacity: 1.0,
            kind,
        }
    }

    #[must_use]
    pub fn circle(position: Vector2, radius: Num) -> Self {
        Self::base(position, ShapeKind::Circle { radius })
    }

    #[must_use]
    pub fn rect(position: Vector2, width: Num, height: Num) -> Self {
        Self::base(position, ShapeKind::Rect { width, height })
    }

    /// The shape position mirrors the first vertex; an empty point list
    /// places the shape at the origin until a vertex is added.
    #[must_use]
    pub fn polygon(points: Vec<Vector2>, closed: bool, smooth: bool) -> Self {
        let position = points.first().cloned().unwrap_or_else(Vector2::zero);
        Self::base(
            position,
            ShapeKind::Polygon {
                points,
                closed,
                smooth,
                bounds: RefCell::new(None),
                bounds_dirty: Cell::new(false),
            },
        )
    }

    #[must_use]
    pub fn text(position: Vector2, text: String, font_size: Num) -> Self {
        Self::base(
            position,
            ShapeKind::Text {
                text,
                font_size,
                font_family: "sans-serif".to_string(),
                h_align: HAlign::Center,
                v_align: VAlign::Middle,
            },
        )
    }

    #[must_use]
    pub fn raster(position: Vector2, width: Num, height: Num, source: ImageHandle) -> Self {
        let mut shape = Self::base(
            position,
            ShapeKind::Raster {
                width,
                height,
                rotation: 0.0,
                source,
                filter: ImageFilter::default(),
            },
        );
        shape.fill = Fill::solid(IMAGE_FILL);
        shape
    }

    /// Build a vector-image shape. The markup is validated here; height is
    /// derived from `width` and the markup's aspect ratio.
    ///
    /// # Errors
    /// Returns the parse error for unusable markup; no shape is constructed.
    pub fn vector(position: Vector2, markup: String, width: Num) -> Result<Self, MarkupError> {
        let doc = markup::parse(&markup)?;
        let aspect_ratio = doc.aspect_ratio();
        let height = &width / &num::from_f64(aspect_ratio);
        let mut shape = Self::base(
            position,
            ShapeKind::Vector {
                width,
                height,
                rotation: 0.0,
                markup,
                aspect_ratio,
                doc: RefCell::new(Some(doc)),
                decode: DecodeHandle::new(),
            },
        );
        shape.fill = Fill::solid(IMAGE_FILL);
        Ok(shape)
    }

    // --- Styling mutators ---

    pub fn set_fill(&mut self, fill: Fill) {
        self.fill = fill;
        self.mark_bounds_dirty();
    }

    pub fn set_stroke(&mut self, stroke: Fill) {
        self.stroke = stroke;
        self.mark_bounds_dirty();
    }

    pub fn set_stroke_enabled(&mut self, enabled: bool) {
        self.stroke_enabled = enabled;
    }

    pub fn set_stroke_width(&mut self, width: Num) {
        self.stroke_width = width;
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    }

    // --- Geometry mutators ---

    pub fn translate(&mut self, dx: &Num, dy: &Num) {
        let delta = Vector2::new(dx.clone(), dy.clone());
        if let ShapeKind::Polygon { points, bounds_dirty, .. } = &mut self.kind {
            for p in points.iter_mut() {
                *p = p.add(&delta);
            }
            bounds_dirty.set(true);
        }
        self.position = self.position.add(&delta);
    }

    /// Append a polygon vertex. No-op for other kinds.
    pub fn push_point(&mut self, point: Vector2) {
        if let ShapeKind::Polygon { points, bounds_dirty, .. } = &mut self.kind {
            points.push(point);
            bounds_dirty.set(true);
            if let Some(first) = points.first() {
                self.position = first.clone();
            }
        }
    }

    /// Replace a polygon vertex. Out-of-range indices and non-polygon kinds
    /// are ignored.
    pub fn set_point(&mut self, index: usize, point: Vector2) {
        if let ShapeKind::Polygon { points, bounds_dirty, .. } = &mut self.kind {
            if let Some(slot) = points.get_mut(index) {
                *slot = point;
                bounds_dirty.set(true);
            }
            if let Some(first) = points.first() {
                self.position = first.clone();
            }
        }
    }

    /// Replace a vector image's markup, keeping width and re-deriving
    /// height from the new aspect ratio. The previous state is untouched
    /// when the new markup does not parse. `Ok` no-op for other kinds.
    ///
    /// # Errors
    /// Returns the parse error for unusable markup.
    pub fn set_markup(&mut self, new_markup: String) -> Result<(), MarkupError> {
        if let ShapeKind::Vector { width, height, markup, aspect_ratio, doc, decode, .. } =
            &mut self.kind
        {
            let parsed = markup::parse(&new_markup)?;
            *aspect_ratio = parsed.aspect_ratio();
            *height = &*width / &num::from_f64(*aspect_ratio);
            *markup = new_markup;
            *doc.borrow_mut() = Some(parsed);
            // The old raster no longer matches the markup.
            *decode = DecodeHandle::new();
        }
        Ok(())
    }

    /// Explicit size override for image kinds; breaks the aspect-ratio
    /// coupling on vector images.
    pub fn set_image_size(&mut self, new_width: Num, new_height: Num) {
        match &mut self.kind {
            ShapeKind::Raster { width, height, .. } | ShapeKind::Vector { width, height, .. } => {
                *width = new_width;
                *height = new_height;
            }
            _ => {}
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        match &mut self.kind {
            ShapeKind::Raster { rotation, .. } | ShapeKind::Vector { rotation, .. } => {
                *rotation = degrees;
            }
            _ => {}
        }
    }

    // --- Geometry queries ---

    /// Per-kind size used by the scale-band test: circle radius, average of
    /// width and height for rects and images, bounding extent for polygons,
    /// font size for text.
    #[must_use]
    pub fn characteristic_size(&self) -> Num {
        match &self.kind {
            ShapeKind::Circle { radius } => radius.clone(),
            ShapeKind::Rect { width, height }
            | ShapeKind::Raster { width, height, .. }
            | ShapeKind::Vector { width, height, .. } => (width + height) / num::from_f64(2.0),
            ShapeKind::Polygon { .. } => {
                self.cached_bounds().map_or_else(Num::zero, |b| b.extent)
            }
            ShapeKind::Text { font_size, .. } => font_size.clone(),
        }
    }

    /// Bounding data as last computed, tolerating staleness after geometry
    /// mutations. Computes once when no cache exists yet. `None` for
    /// non-polygon kinds and empty polygons.
    #[must_use]
    pub fn cached_bounds(&self) -> Option<PolyBounds> {
        let ShapeKind::Polygon { points, bounds, .. } = &self.kind else {
            return None;
        };
        if bounds.borrow().is_none() {
            *bounds.borrow_mut() = compute_bounds(points);
        }
        bounds.borrow().clone()
    }

    /// Bounding data recomputed if a geometry mutation marked it dirty.
    /// Gradient anchoring goes through here; the cull test does not.
    #[must_use]
    pub fn fresh_bounds(&self) -> Option<PolyBounds> {
        let ShapeKind::Polygon { points, bounds, bounds_dirty, .. } = &self.kind else {
            return None;
        };
        if bounds_dirty.replace(false) || bounds.borrow().is_none() {
            *bounds.borrow_mut() = compute_bounds(points);
        }
        bounds.borrow().clone()
    }

    /// Parsed markup for vector images, parsing on first use after
    /// deserialization. `None` for other kinds or unusable markup.
    pub fn with_markup_doc<R>(&self, f: impl FnOnce(&MarkupDoc) -> R) -> Option<R> {
        let ShapeKind::Vector { markup, doc, .. } = &self.kind else {
            return None;
        };
        if doc.borrow().is_none() {
            if let Ok(parsed) = markup::parse(markup) {
                *doc.borrow_mut() = Some(parsed);
            } else {
                return None;
            }
        }
        doc.borrow().as_ref().map(f)
    }

    /// Decode handle for vector images, for the asset layer to complete.
    #[must_use]
    pub fn decode_handle(&self) -> Option<DecodeHandle> {
        match &self.kind {
            ShapeKind::Vector { decode, .. } => Some(decode.clone()),
            _ => None,
        }
    }

    /// Half-extent of the screen-space bounding box, in world units, as
    /// `(half_width, half_height)`. Rotation is intentionally ignored for
    /// rects and images.
    #[must_use]
    pub fn half_extent(&self) -> (Num, Num) {
        let two = num::from_f64(2.0);
        match &self.kind {
            ShapeKind::Circle { radius } => (radius.clone(), radius.clone()),
            ShapeKind::Rect { width, height }
            | ShapeKind::Raster { width, height, .. }
            | ShapeKind::Vector { width, height, .. } => (width / &two, height / &two),
            ShapeKind::Polygon { .. } => {
                let extent = self
                    .cached_bounds()
                    .map_or_else(Num::zero, |b| b.extent);
                (extent.clone(), extent)
            }
            ShapeKind::Text { text, font_size, .. } => {
                let glyphs = num::from_f64(text.chars().count().max(1) as f64 * TEXT_WIDTH_FACTOR);
                let lines = num::from_f64(LINE_HEIGHT_FACTOR);
                (font_size * &glyphs / &two, font_size * &lines / &two)
            }
        }
    }

    /// Center of the screen-space bounding box in world units: the cached
    /// bounds center for polygons, the shape position otherwise.
    #[must_use]
    pub fn bbox_center(&self) -> Vector2 {
        match &self.kind {
            ShapeKind::Polygon { .. } => self
                .cached_bounds()
                .map_or_else(|| self.position.clone(), |b| b.center),
            _ => self.position.clone(),
        }
    }

    // --- Visibility ---

    /// Two-part cull test: the characteristic size over the camera range
    /// must fall inside the scale band (1e-3..1e3; images widen the lower
    /// bound to 1e-6), and the screen bounding box must overlap the
    /// viewport. The band comparison is exact big-decimal arithmetic so the
    /// boundary cases hold.
    #[must_use]
    pub fn is_renderable(&self, camera: &Camera, viewport: Viewport) -> bool {
        self.passes_scale_band(camera.range()) && self.overlaps_viewport(camera, viewport)
    }

    fn passes_scale_band(&self, range: &Num) -> bool {
        let size = self.characteristic_size();
        let min_exp = match self.kind {
            ShapeKind::Raster { .. } | ShapeKind::Vector { .. } => IMAGE_SCALE_MIN_EXP,
            _ => SCALE_MIN_EXP,
        };
        // size / range >= 10^min_exp, done multiplicatively to stay exact.
        let lower_ok = &size * &num::pow10_int(-min_exp) >= *range;
        let upper_ok = size <= range * &num::pow10_int(SCALE_MAX_EXP);
        lower_ok && upper_ok
    }

    fn overlaps_viewport(&self, camera: &Camera, viewport: Viewport) -> bool {
        let center = camera.world_to_screen_px(&self.bbox_center(), viewport);
        let (hx_world, hy_world) = self.half_extent();
        let hx = camera.world_len_to_px(&hx_world, viewport);
        let hy = camera.world_len_to_px(&hy_world, viewport);
        center.x + hx >= 0.0
            && center.x - hx <= viewport.width()
            && center.y + hy >= 0.0
            && center.y - hy <= viewport.height()
    }

    // --- Serde ---

    /// # Errors
    /// `InvalidShape` when serialization fails (non-finite floats only).
    pub fn to_json(&self) -> Result<String, ShapeError> {
        serde_json::to_string(self).map_err(|e| ShapeError::InvalidShape(e.to_string()))
    }

    /// Decode one shape from JSON. An unknown `kind` tag is reported as
    /// [`ShapeError::UnsupportedKind`]; any other structural problem as
    /// [`ShapeError::InvalidShape`]. Vector-image markup is re-validated so
    /// a decoded shape is never carrying unusable markup, and opacity is
    /// clamped back into `0..=1`.
    ///
    /// # Errors
    /// See above; no partially constructed shape is ever returned.
    pub fn from_json(json: &str) -> Result<Self, ShapeError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ShapeError::InvalidShape(e.to_string()))?;
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ShapeError::InvalidShape("missing kind tag".to_string()))?;
        if !KNOWN_KINDS.contains(&kind) {
            return Err(ShapeError::UnsupportedKind(kind.to_string()));
        }
        let mut shape: Self = serde_json::from_value(value)
            .map_err(|e| ShapeError::InvalidShape(e.to_string()))?;
        // Serde bypasses the setters; re-apply the opacity invariant.
        let opacity = shape.opacity;
        shape.set_opacity(opacity);
        if let ShapeKind::Vector { markup, doc, .. } = &shape.kind {
            *doc.borrow_mut() = Some(markup::parse(markup)?);
        }
        Ok(shape)
    }

    fn mark_bounds_dirty(&self) {
        if let ShapeKind::Polygon { bounds_dirty, .. } = &self.kind {
            bounds_dirty.set(true);
        }
    }
}

const KNOWN_KINDS: [&str; 6] = ["circle", "rect", "polygon", "text", "raster", "vector"];

fn compute_bounds(points: &[Vector2]) -> Option<PolyBounds> {
    if points.is_empty() {
        return None;
    }
    let count = num::from_f64(points.len() as f64);
    let sum = points
        .iter()
        .fold(Vector2::zero(), |acc, p| acc.add(p));
    let center = sum.div(&count);
    let extent = points
        .iter()
        .map(|p| p.sub(&center).magnitude())
        .fold(Num::zero(), |acc, d| if d > acc { d } else { acc });
    Some(PolyBounds { center, extent })
}
