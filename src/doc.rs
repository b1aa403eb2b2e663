//! Shape storage and the visibility cull pass.
//!
//! All shapes live in one slot arena. Each slot is `Active` (handed to the
//! renderer this frame), `Dormant` (geometrically present but outside the
//! renderable range), or `Empty` (deleted). Slot indices are stable for the
//! life of the store and double as z-order: later index paints over earlier
//! index. Deleted slots are tombstoned, never reused, so z-order can never
//! shift under a collaborator holding an id.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use tracing::debug;

use crate::camera::{Camera, Viewport};
use crate::consts::CULL_TRIGGER_RATIO;
use crate::num::Num;
use crate::shape::Shape;

/// Stable handle to a slot in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone)]
pub enum Slot {
    Active(Shape),
    Dormant(Shape),
    Empty,
}

impl Slot {
    #[must_use]
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Active(s) | Self::Dormant(s) => Some(s),
            Self::Empty => None,
        }
    }
}

/// The shape arena.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    slots: Vec<Slot>,
}

impl ShapeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a shape as active. It participates in rendering immediately;
    /// the next cull pass may demote it.
    pub fn insert(&mut self, shape: Shape) -> SlotId {
        self.slots.push(Slot::Active(shape));
        SlotId(self.slots.len() - 1)
    }

    /// Delete a shape, leaving a tombstone. Returns the shape if the slot
    /// held one.
    pub fn remove(&mut self, id: SlotId) -> Option<Shape> {
        let slot = self.slots.get_mut(id.0)?;
        match std::mem::replace(slot, Slot::Empty) {
            Slot::Active(s) | Slot::Dormant(s) => Some(s),
            Slot::Empty => None,
        }
    }

    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&Shape> {
        self.slots.get(id.0).and_then(Slot::shape)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Shape> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Active(s) | Slot::Dormant(s)) => Some(s),
            _ => None,
        }
    }

    /// Live shapes (active and dormant) in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Shape)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.shape().map(|s| (SlotId(i), s)))
    }

    /// Active shapes in index order, which is render order and z-order.
    pub fn active(&self) -> impl Iterator<Item = (SlotId, &Shape)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Active(s) => Some((SlotId(i), s)),
            _ => None,
        })
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Active(_)))
            .count()
    }

    #[must_use]
    pub fn dormant_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Dormant(_)))
            .count()
    }

    /// Live shape count (active plus dormant).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.shape().is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cull pass: promote every dormant shape that became renderable,
    /// then demote every active shape that no longer is. Both passes run in
    /// full; a shape is moved, never dropped.
    pub fn reevaluate(&mut self, camera: &Camera, viewport: Viewport) {
        let mut promoted = 0usize;
        for slot in &mut self.slots {
            if matches!(slot, Slot::Dormant(_)) {
                let Slot::Dormant(shape) = std::mem::replace(slot, Slot::Empty) else {
                    continue;
                };
                if shape.is_renderable(camera, viewport) {
                    promoted += 1;
                    *slot = Slot::Active(shape);
                } else {
                    *slot = Slot::Dormant(shape);
                }
            }
        }
        let mut demoted = 0usize;
        for slot in &mut self.slots {
            if matches!(slot, Slot::Active(_)) {
                let Slot::Active(shape) = std::mem::replace(slot, Slot::Empty) else {
                    continue;
                };
                if shape.is_renderable(camera, viewport) {
                    *slot = Slot::Active(shape);
                } else {
                    demoted += 1;
                    *slot = Slot::Dormant(shape);
                }
            }
        }
        debug!(promoted, demoted, active = self.active_count(), "cull pass");
    }
}

/// Decides when the cull pass is worth re-running: after the camera range
/// has drifted more than 10% from the value at the last evaluation, or
/// after an explicit invalidation (reset, shape added or removed). Skipping
/// a cull only defers work; it never corrupts state.
#[derive(Debug, Clone, Default)]
pub struct CullGate {
    last_range: Option<Num>,
}

impl CullGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn should_cull(&self, range: &Num) -> bool {
        match &self.last_range {
            None => true,
            Some(last) => {
                // |range - last| / last > CULL_TRIGGER_RATIO, kept exact by
                // multiplying through instead of dividing.
                let drift = if range > last { range - last } else { last - range };
                drift * ratio_reciprocal() > *last
            }
        }
    }

    /// Record the range the store was just evaluated at.
    pub fn mark(&mut self, range: &Num) {
        self.last_range = Some(range.clone());
    }

    /// Force the next [`Self::should_cull`] to answer yes.
    pub fn invalidate(&mut self) {
        self.last_range = None;
    }
}

fn ratio_reciprocal() -> Num {
    crate::num::from_f64(1.0 / CULL_TRIGGER_RATIO)
}
