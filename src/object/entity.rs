//! The world object record stored in the world arena
//!
//! Relationship fields (`contents`, `parts`, `parent`, `placement`) are only
//! mutated by `World`, which keeps both sides of every link in agreement.

use rand_chacha::ChaCha8Rng;

use crate::core::types::{GridPos, Layer, ObjectId};
use crate::object::attributes::Attributes;
use crate::object::components::Components;
use crate::object::material::Material;

/// Where a root object sits on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: GridPos,
    pub layer: Layer,
}

/// Cached presentation state
///
/// Recomputed only when `dirty` is set. Anything that changes a
/// state-relevant attribute must call `WorldObject::mark_dirty`.
#[derive(Debug, Clone, Default)]
pub struct DisplayCache {
    pub state: String,
    pub description: String,
    pub dirty: bool,
}

/// Per-tick markers, cleared at the start of each of the object's ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickMarkers {
    pub reacted: bool,
    pub replenished: bool,
    pub temperature_changed: bool,
    pub grew: bool,
}

impl TickMarkers {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct WorldObject {
    id: ObjectId,
    kind: String,
    pub name: String,
    pub attributes: Attributes,
    pub materials: Vec<Material>,
    pub components: Components,
    pub markers: TickMarkers,

    pub(crate) contents: Vec<ObjectId>,
    pub(crate) parts: Vec<ObjectId>,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) placement: Option<Placement>,
    pub(crate) pos: GridPos,
    pub(crate) tick_completed: bool,
    pub(crate) display: DisplayCache,
    pub(crate) rng: ChaCha8Rng,
}

impl WorldObject {
    pub(crate) fn new(id: ObjectId, kind: &str, rng: ChaCha8Rng) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            name: kind.replace('_', " "),
            attributes: Attributes::default(),
            materials: Vec::new(),
            components: Components::default(),
            markers: TickMarkers::default(),
            contents: Vec::new(),
            parts: Vec::new(),
            parent: None,
            placement: None,
            pos: GridPos::default(),
            tick_completed: false,
            display: DisplayCache {
                dirty: true,
                ..DisplayCache::default()
            },
            rng,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn contents(&self) -> &[ObjectId] {
        &self.contents
    }

    pub fn parts(&self) -> &[ObjectId] {
        &self.parts
    }

    /// Container or composite owner, if any
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Grid placement, only set for root objects
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// World coordinates (inherited from the root ancestor)
    pub fn position(&self) -> GridPos {
        self.pos
    }

    pub fn is_tick_completed(&self) -> bool {
        self.tick_completed
    }

    pub fn is_substance(&self) -> bool {
        self.components.substance.is_some()
    }

    pub fn display_state(&self) -> &str {
        &self.display.state
    }

    pub fn description(&self) -> &str {
        &self.display.description
    }

    pub fn needs_refresh(&self) -> bool {
        self.display.dirty
    }

    /// Flag the display state for recomputation on the next tick or query
    pub fn mark_dirty(&mut self) {
        self.display.dirty = true;
    }

    /// Sum of a numeric property over all attached materials
    pub fn material_sum(&self, f: impl Fn(&Material) -> f64) -> f64 {
        self.materials.iter().map(f).sum()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
