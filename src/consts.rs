//! Shared numeric constants for the canvas core.

// ── Camera ──────────────────────────────────────────────────────

/// World-space height spanned by one screen height at startup.
pub const DEFAULT_RANGE: f64 = 5.0;

/// Decimal exponent of the supported zoom envelope: the camera range is
/// clamped to `[1e-RANGE_EXP, 1e+RANGE_EXP]`.
pub const RANGE_EXP: i64 = 900_000_000;

/// Per-second convergence factor for pan smoothing (higher = snappier).
pub const POSITION_SMOOTHING: f64 = 8.0;

/// Per-second convergence factor for zoom smoothing.
pub const ZOOM_SMOOTHING: f64 = 8.0;

/// Tick deltas are capped here so a background-tab pause doesn't teleport
/// the camera on the next frame.
pub const MAX_TICK_DT: f64 = 0.1;

/// Once the interpolated range is within this many log10 units of the
/// target, it snaps to the target exactly.
pub const RANGE_SNAP_LOG10: f64 = 1e-6;

// ── Culling ─────────────────────────────────────────────────────

/// Scale band for most shapes: renderable while
/// `10^SCALE_MIN_EXP <= size/range <= 10^SCALE_MAX_EXP`.
pub const SCALE_MIN_EXP: i64 = -3;
pub const SCALE_MAX_EXP: i64 = 3;

/// Images stay visible down to native-pixel scale, so their lower bound is
/// wider than the generic band.
pub const IMAGE_SCALE_MIN_EXP: i64 = -6;

/// The cull pass re-runs when the range has drifted more than 10% from the
/// value it was last evaluated at. Expressed as `|range - last| * 10 > last`
/// so the trigger test needs no division.
pub const CULL_TRIGGER_RATIO: f64 = 0.1;

// ── Screen-space ────────────────────────────────────────────────

/// Screen coordinates are saturated at this magnitude; anything further out
/// is equally off-screen and saturating avoids inf/NaN propagation.
pub const SCREEN_SATURATION_PX: f64 = 1e12;

/// Screen-space hit slop in pixels for thin geometry (lines, open paths).
pub const HIT_SLOP_PX: f64 = 8.0;

// ── Text ────────────────────────────────────────────────────────

/// Rough advance width per glyph as a fraction of font size, used when a
/// real measurer is not available (culling must not require one).
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.25;

// ── Styling ─────────────────────────────────────────────────────

/// Default fill color for new shapes.
pub const DEFAULT_FILL: &str = "#D94B4B";

/// Default stroke color for new shapes.
pub const DEFAULT_STROKE: &str = "#1F1A17";

/// Default stroke width in world units.
pub const DEFAULT_STROKE_WIDTH: f64 = 0.05;

/// Fill used for image shapes (images carry their own color; gradients are
/// never applied to them).
pub const IMAGE_FILL: &str = "#FFFFFF";

/// Placeholder fill drawn while a vector image has not finished decoding.
pub const PLACEHOLDER_FILL: &str = "#ECECEC";

/// Placeholder border drawn while a vector image has not finished decoding.
pub const PLACEHOLDER_STROKE: &str = "#B8B8B8";
