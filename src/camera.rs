//! Pan/zoom camera and coordinate conversions.
//!
//! The camera holds a *rendered* state (`position`, `range`) and a
//! *commanded* state (`target_position`, `target_range`) set by the host's
//! input handlers. The two converge each tick: position by exponential
//! decay, range by interpolation in log10 space. The range spans ~1.8
//! billion orders of magnitude, so linear interpolation would be both
//! numerically meaningless and perceptually non-uniform.
//!
//! `range` is the world-space height mapped to one screen height; larger
//! range means more zoomed out. Screen height (not width) is the scale
//! reference, so horizontal and vertical scale are identical under
//! non-square viewports.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{
    DEFAULT_RANGE, MAX_TICK_DT, POSITION_SMOOTHING, RANGE_EXP, RANGE_SNAP_LOG10, ZOOM_SMOOTHING,
};
use crate::num::{self, Num};
use crate::vec2::Vector2;

/// A point in screen space, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport dimensions in CSS pixels. Dimensions are floored at 1 so the
/// transform math can never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(1.0), height: height.max(1.0) }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Camera state for one viewport.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector2,
    target_position: Vector2,
    range: Num,
    target_range: Num,
    min_range: Num,
    max_range: Num,
    position_smoothing: f64,
    zoom_smoothing: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector2::zero(),
            target_position: Vector2::zero(),
            range: num::from_f64(DEFAULT_RANGE),
            target_range: num::from_f64(DEFAULT_RANGE),
            min_range: num::pow10_int(-RANGE_EXP),
            max_range: num::pow10_int(RANGE_EXP),
            position_smoothing: POSITION_SMOOTHING,
            zoom_smoothing: ZOOM_SMOOTHING,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- State access ---

    /// Rendered position (world space).
    #[must_use]
    pub fn position(&self) -> &Vector2 {
        &self.position
    }

    /// Commanded position (world space).
    #[must_use]
    pub fn target_position(&self) -> &Vector2 {
        &self.target_position
    }

    /// Rendered range: world height spanned by one screen height.
    #[must_use]
    pub fn range(&self) -> &Num {
        &self.range
    }

    /// Commanded range.
    #[must_use]
    pub fn target_range(&self) -> &Num {
        &self.target_range
    }

    // --- Commands ---

    /// Set the commanded position; the rendered position converges over the
    /// following ticks.
    pub fn set_target_position(&mut self, position: Vector2) {
        self.target_position = position;
    }

    /// Set the commanded range, clamped into the supported zoom envelope.
    /// Zero or negative input clamps to the minimum range; an invalid range
    /// never propagates.
    pub fn set_target_range(&mut self, range: &Num) {
        self.target_range = self.clamp_range(range);
    }

    /// Jump both rendered and commanded state at once (bookmark restore,
    /// snapshot load). No smoothing is applied.
    pub fn jump_to(&mut self, position: Vector2, range: &Num) {
        self.range = self.clamp_range(range);
        self.target_range = self.range.clone();
        self.target_position = position.clone();
        self.position = position;
    }

    /// Return to the startup view: origin, range 5. The caller is expected
    /// to force a full re-cull afterwards.
    pub fn reset(&mut self) {
        self.position = Vector2::zero();
        self.target_position = Vector2::zero();
        self.range = num::from_f64(DEFAULT_RANGE);
        self.target_range = self.range.clone();
    }

    /// Anchor-preserving zoom: command `target_range` while keeping the
    /// world point currently under `anchor` at the same screen position
    /// once the zoom completes.
    pub fn zoom_toward(&mut self, target_range: &Num, anchor: Point, viewport: Viewport) {
        let anchor_world = self.screen_to_world(anchor, viewport);
        let new_range = self.clamp_range(target_range);
        let ratio = &new_range / &self.range;
        let offset = anchor_world.sub(&self.position).mul(&ratio);
        self.target_position = anchor_world.sub(&offset);
        self.target_range = new_range;
    }

    // --- Per-frame advance ---

    /// Advance the rendered state toward the commanded state.
    ///
    /// Position: `position += (target - position) * dt * smoothing`
    /// (exponential decay, asymptotic). Range: the same decay applied to
    /// `log10(range)`, snapping exactly onto the target once within
    /// [`RANGE_SNAP_LOG10`] of it. The result is monotonic and never
    /// overshoots; `range` stays clamped inside the zoom envelope.
    pub fn tick(&mut self, dt_seconds: f64) {
        let dt = if dt_seconds.is_finite() { dt_seconds.clamp(0.0, MAX_TICK_DT) } else { 0.0 };
        if dt <= 0.0 {
            return;
        }

        if self.position != self.target_position {
            let alpha = num::from_f64((dt * self.position_smoothing).min(1.0));
            let step = self.target_position.sub(&self.position).mul(&alpha);
            self.position = self.position.add(&step);
        }

        if self.range != self.target_range {
            let beta = (dt * self.zoom_smoothing).min(1.0);
            self.advance_range(beta);
            self.range = num::clamp(&self.range, &self.min_range, &self.max_range);
        }
    }

    fn advance_range(&mut self, beta: f64) {
        let (Some(current), Some(target)) = (num::log10(&self.range), num::log10(&self.target_range))
        else {
            // Degenerate state (non-positive range) cannot arise through the
            // public API; recover by snapping to the clamped target.
            self.range = self.clamp_range(&self.target_range.clone());
            return;
        };

        let next = current + (target - current) * beta;
        if beta >= 1.0 || (target - next).abs() < RANGE_SNAP_LOG10 {
            self.range = self.target_range.clone();
        } else {
            self.range = num::pow10(next);
        }
    }

    // --- Transforms ---

    /// Project a world point into screen space, exactly:
    /// `(world - position) / range * height + (width/2, height/2)`.
    #[must_use]
    pub fn world_to_screen(&self, world: &Vector2, viewport: Viewport) -> Vector2 {
        let height = num::from_f64(viewport.height());
        let center = Vector2::from_f64(viewport.width() * 0.5, viewport.height() * 0.5);
        world
            .sub(&self.position)
            .div(&self.range)
            .mul(&height)
            .add(&center)
    }

    /// Project a world point into screen pixels as machine floats,
    /// saturating far off-screen values.
    #[must_use]
    pub fn world_to_screen_px(&self, world: &Vector2, viewport: Viewport) -> Point {
        let s = self.world_to_screen(world, viewport);
        Point::new(num::to_f64_clamped(&s.x), num::to_f64_clamped(&s.y))
    }

    /// Exact inverse of [`Self::world_to_screen`].
    #[must_use]
    pub fn screen_to_world(&self, screen: Point, viewport: Viewport) -> Vector2 {
        let height = num::from_f64(viewport.height());
        let center = Vector2::from_f64(viewport.width() * 0.5, viewport.height() * 0.5);
        Vector2::from_f64(screen.x, screen.y)
            .sub(&center)
            .div(&height)
            .mul(&self.range)
            .add(&self.position)
    }

    /// Convert a world-space length to screen pixels at the current zoom.
    #[must_use]
    pub fn world_len_to_px(&self, len: &Num, viewport: Viewport) -> f64 {
        let ratio = num::to_f64_clamped(&(len / &self.range));
        (ratio * viewport.height()).clamp(0.0, crate::consts::SCREEN_SATURATION_PX)
    }

    fn clamp_range(&self, range: &Num) -> Num {
        if *range <= num::from_f64(0.0) {
            return self.min_range.clone();
        }
        num::clamp(range, &self.min_range, &self.max_range)
    }
}
