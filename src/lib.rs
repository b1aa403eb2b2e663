//! Core engine for an effectively infinite 2D canvas.
//!
//! The camera can pan and zoom across a coordinate space spanning roughly
//! 1e-900000000 to 1e900000000 world units without losing significance:
//! every quantity that can span that range (positions, sizes, the camera's
//! range) is an arbitrary-precision decimal rather than a float. Shapes are
//! transformed, culled, and drawn each frame; anything outside the viewport
//! or outside a significance band relative to the current zoom is parked in
//! a dormant set and revived when the camera comes back.
//!
//! The host application owns tools, input decoding, persistence, and the
//! actual drawing surface; it reaches the surface through the
//! [`render::RenderContext`] trait and drives one [`engine::Engine`] per
//! viewport.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Frame driver: tick, threshold-gated cull, render pass |
//! | [`camera`] | Pan/zoom camera, smoothing, world↔screen transforms |
//! | [`doc`] | Shape arena with Active/Dormant/Empty slots and the cull pass |
//! | [`shape`] | Shape kinds, geometry, styling, renderability, serde |
//! | [`hit`] | Screen-space hit-testing, including markup inner picking |
//! | [`render`] | Render context trait and per-kind draw dispatch |
//! | [`paint`] | Fill styles, gradients, screen-space paint resolution |
//! | [`markup`] | Vector-image markup parsing |
//! | [`vec2`] | Immutable 2D vector over the big-number type |
//! | [`num`] | Arbitrary-precision number plumbing |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod markup;
pub mod num;
pub mod paint;
pub mod render;
pub mod shape;
pub mod vec2;
