//! Fill styles and the screen-space gradient resolver.
//!
//! Shapes carry a [`Fill`] (a CSS color string or an abstract [`Gradient`]).
//! At draw time the gradient is resolved into a [`Paint`] anchored to the
//! shape's current screen bounds, which is what the rendering backend
//! consumes.

#[cfg(test)]
#[path = "paint_test.rs"]
mod paint_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Fill or stroke style as stored on a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    /// CSS color string, e.g. `"#D94B4B"` or `"rgba(0,0,0,0.5)"`.
    Solid(String),
    Gradient(Gradient),
}

impl Fill {
    #[must_use]
    pub fn solid(color: &str) -> Self {
        Self::Solid(color.to_string())
    }

    #[must_use]
    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::Gradient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient axis, 0..1. Strictly increasing offsets
    /// are recommended but not enforced; stops apply in sequence order.
    pub offset: f64,
    pub color: String,
}

/// Abstract gradient description, independent of any shape's placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    /// Rotation of the gradient axis in degrees (linear only).
    #[serde(default)]
    pub rotation: f64,
    pub stops: Vec<GradientStop>,
}

/// Screen-space paint, ready for the rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(String),
    Linear { from: Point, to: Point, stops: Vec<GradientStop> },
    Radial { center: Point, radius: f64, stops: Vec<GradientStop> },
}

/// Resolve a fill against a shape's screen-space anchor (center) and
/// radius-equivalent scale in pixels.
///
/// Linear gradients run along a line centered on the anchor, rotated by
/// `rotation + 90°`, with half-length `scale_px`. Radial gradients are
/// centered on the anchor with radius `scale_px`.
#[must_use]
pub fn resolve(fill: &Fill, anchor: Point, scale_px: f64) -> Paint {
    match fill {
        Fill::Solid(color) => Paint::Solid(color.clone()),
        Fill::Gradient(g) => match g.kind {
            GradientKind::Linear => {
                let theta = (g.rotation + 90.0).to_radians();
                let dx = theta.cos() * scale_px;
                let dy = theta.sin() * scale_px;
                Paint::Linear {
                    from: Point::new(anchor.x - dx, anchor.y - dy),
                    to: Point::new(anchor.x + dx, anchor.y + dy),
                    stops: g.stops.clone(),
                }
            }
            GradientKind::Radial => Paint::Radial {
                center: anchor,
                radius: scale_px.max(0.0),
                stops: g.stops.clone(),
            },
        },
    }
}
