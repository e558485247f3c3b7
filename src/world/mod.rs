//! The world: object arena, spatial index and containment graph
//!
//! All relationship edits go through `World` so that the two sides of every
//! link stay in agreement:
//! - an object has at most one owner (container, composite owner, or grid cell)
//! - `parent` matches exactly one owner's `contents` or `parts`
//! - nested objects share the grid coordinates of their root

pub mod display;
pub mod factory;
pub mod grid;
pub mod snapshot;

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{GridPos, Layer, ObjectId, Step};
use crate::object::entity::{Placement, WorldObject};
use crate::object::material::MaterialIndex;
use crate::simulation::tick::SimulationEvent;

pub use factory::{BuildContext, ObjectFactory, SpawnArgs};
pub use grid::SpatialIndex;
pub use snapshot::{ObjectSnapshot, WorldSnapshot};

/// Which list of the owner an object is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Contents,
    Parts,
}

/// Options for `World::objects_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectQuery {
    /// Do not look inside closed containers
    pub respect_open_state: bool,
    pub include_contents: bool,
    pub include_parts: bool,
}

impl ObjectQuery {
    /// Only the root objects placed in the cell
    pub fn roots() -> Self {
        Self {
            respect_open_state: false,
            include_contents: false,
            include_parts: false,
        }
    }

    /// What an observer standing there could see
    pub fn visible() -> Self {
        Self {
            respect_open_state: true,
            include_contents: true,
            include_parts: true,
        }
    }

    /// Everything physically present, closed containers included
    pub fn everything() -> Self {
        Self {
            respect_open_state: false,
            include_contents: true,
            include_parts: true,
        }
    }
}

/// The simulated world
pub struct World {
    config: SimulationConfig,
    objects: AHashMap<ObjectId, WorldObject>,
    grid: SpatialIndex,
    factory: ObjectFactory,
    materials: MaterialIndex,
    /// Random number generator (deterministic)
    rng: ChaCha8Rng,
    next_id: u64,
    step: Step,
    events: Vec<SimulationEvent>,
}

impl World {
    /// World with the default factory and material catalog
    ///
    /// Fails with `SimError::Config` if the config is inconsistent.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_registries(config, ObjectFactory::with_defaults(), MaterialIndex::with_defaults())
    }

    /// Default world with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        // Only the seed differs from the defaults, which always validate
        Self::assemble(
            SimulationConfig {
                seed,
                ..SimulationConfig::default()
            },
            ObjectFactory::with_defaults(),
            MaterialIndex::with_defaults(),
        )
    }

    pub fn with_registries(
        config: SimulationConfig,
        factory: ObjectFactory,
        materials: MaterialIndex,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, factory, materials))
    }

    fn assemble(config: SimulationConfig, factory: ObjectFactory, materials: MaterialIndex) -> Self {
        Self {
            grid: SpatialIndex::new(config.grid_width, config.grid_height),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            objects: AHashMap::new(),
            factory,
            materials,
            next_id: 1,
            step: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialIndex {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialIndex {
        &mut self.materials
    }

    pub fn factory_mut(&mut self) -> &mut ObjectFactory {
        &mut self.factory
    }

    pub fn grid(&self) -> &SpatialIndex {
        &self.grid
    }

    /// Number of completed steps
    pub fn step_count(&self) -> Step {
        self.step
    }

    /// World-scoped random source
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // === ARENA ===

    /// Create an object of a registered kind with default arguments
    pub fn spawn(&mut self, kind: &str) -> Result<ObjectId> {
        self.spawn_with(kind, &SpawnArgs::default())
    }

    /// Create an object of a registered kind
    ///
    /// The new object is not placed anywhere; put it on the grid or into a
    /// container before it takes part in ticks.
    pub fn spawn_with(&mut self, kind: &str, args: &SpawnArgs) -> Result<ObjectId> {
        if !self.factory.has_kind(kind) {
            return Err(SimError::UnknownKind(kind.to_string()));
        }

        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let stream = ChaCha8Rng::seed_from_u64(self.rng.gen::<u64>());

        let mut obj = WorldObject::new(id, kind, stream);
        obj.attributes.temperature_c = self.config.ambient_temperature_c;

        let ctx = BuildContext {
            config: &self.config,
            materials: &self.materials,
        };
        self.factory.build(&mut obj, args, &ctx)?;

        if let Some(name) = &args.name {
            obj.name = name.clone();
        }
        obj.materials.extend(self.materials.resolve(&args.materials));
        obj.materials.extend(args.inline_materials.iter().cloned());
        for (key, value) in &args.attrs {
            obj.attributes.set(key.clone(), value.clone());
        }

        tracing::trace!("Spawned {} '{}' ({})", id, obj.name, kind);
        self.objects.insert(id, obj);
        Ok(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every live handle, sorted
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Every live object of a kind, sorted by handle
    pub fn objects_of_kind(&self, kind: &str) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|o| o.is_kind(kind))
            .map(|o| o.id())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn get(&self, id: ObjectId) -> Result<&WorldObject> {
        self.objects.get(&id).ok_or(SimError::ObjectNotFound(id))
    }

    // === SPATIAL INDEX ===

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(GridPos::new(x, y))
    }

    /// Place an object directly on the grid
    ///
    /// Detaches it from any container or previous cell first. Out-of-bounds
    /// positions are rejected and leave the object where it was.
    pub fn place(&mut self, x: i32, y: i32, layer: Layer, id: ObjectId) -> Result<()> {
        let pos = GridPos::new(x, y);
        if !self.grid.in_bounds(pos) {
            return Err(SimError::OutOfBounds { x, y });
        }
        self.get(id)?;

        self.detach(id);
        self.grid.insert(pos, layer, id)?;
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.placement = Some(Placement { pos, layer });
        }
        self.sync_position(id, pos);
        Ok(())
    }

    /// Remove a root object from the grid
    ///
    /// Contents stay owned by the object. Returns false if it was not placed.
    pub fn unplace(&mut self, id: ObjectId) -> bool {
        let Some(obj) = self.objects.get_mut(&id) else {
            return false;
        };
        let Some(placement) = obj.placement.take() else {
            return false;
        };
        self.grid.remove(placement.pos, placement.layer, id)
    }

    /// Objects in a cell across all layers, bottom layer first
    pub fn objects_at(&self, x: i32, y: i32, query: ObjectQuery) -> Vec<ObjectId> {
        let Some(cell) = self.grid.cell(GridPos::new(x, y)) else {
            return Vec::new();
        };
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for root in cell.all() {
            self.collect_closure(
                root,
                query.include_contents,
                query.include_parts,
                query.respect_open_state,
                &mut seen,
                &mut out,
            );
        }
        out
    }

    /// Root objects on one layer of a cell
    pub fn objects_at_layer(&self, x: i32, y: i32, layer: Layer) -> Vec<ObjectId> {
        self.grid.at(GridPos::new(x, y), layer).to_vec()
    }

    // === CONTAINMENT ===

    /// Move `obj` into the contents of `container`
    ///
    /// No capacity or open-state checks happen here; agent-facing verbs
    /// check those before calling in.
    pub fn add_object(&mut self, container: ObjectId, obj: ObjectId) -> Result<()> {
        self.attach(container, obj, Slot::Contents)
    }

    /// Attach `part` permanently to `owner`
    pub fn add_part(&mut self, owner: ObjectId, part: ObjectId) -> Result<()> {
        self.attach(owner, part, Slot::Parts)
    }

    fn attach(&mut self, owner: ObjectId, obj: ObjectId, slot: Slot) -> Result<()> {
        self.get(owner)?;
        self.get(obj)?;
        if owner == obj || self.is_ancestor(obj, owner) {
            return Err(SimError::ContainmentCycle {
                container: owner,
                object: obj,
            });
        }

        self.detach(obj);

        let pos = match self.objects.get_mut(&owner) {
            Some(owner_obj) => {
                match slot {
                    Slot::Contents => owner_obj.contents.push(obj),
                    Slot::Parts => owner_obj.parts.push(obj),
                }
                owner_obj.mark_dirty();
                owner_obj.pos
            }
            None => return Err(SimError::ObjectNotFound(owner)),
        };
        if let Some(child) = self.objects.get_mut(&obj) {
            child.parent = Some(owner);
        }
        self.sync_position(obj, pos);
        Ok(())
    }

    /// Remove `obj` from the contents or parts of `container`
    ///
    /// Clears the back-reference but leaves the coordinates untouched; the
    /// caller decides where the object goes next. Returns whether a removal
    /// occurred.
    pub fn remove_object(&mut self, container: ObjectId, obj: ObjectId) -> bool {
        let Some(owner) = self.objects.get_mut(&container) else {
            return false;
        };
        let before = owner.contents.len() + owner.parts.len();
        owner.contents.retain(|&c| c != obj);
        owner.parts.retain(|&p| p != obj);
        let removed = owner.contents.len() + owner.parts.len() < before;
        if !removed {
            return false;
        }
        owner.mark_dirty();
        if let Some(child) = self.objects.get_mut(&obj) {
            if child.parent == Some(container) {
                child.parent = None;
            }
        }
        true
    }

    /// Detach an object from whatever currently owns it
    ///
    /// Returns false if it was neither contained nor placed.
    pub fn detach(&mut self, id: ObjectId) -> bool {
        let parent = self.objects.get(&id).and_then(|o| o.parent);
        if let Some(parent) = parent {
            return self.remove_object(parent, id);
        }
        self.unplace(id)
    }

    /// Destroy an object together with everything inside it or attached to it
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        if !self.objects.contains_key(&id) {
            return false;
        }
        let subtree = self.all_contained_and_parts(id, true, true);
        self.detach(id);
        for member in subtree {
            if let Some(obj) = self.objects.remove(&member) {
                // Members below the root have parents, so only a stray
                // placement on the root itself needs clearing
                if let Some(placement) = obj.placement {
                    self.grid.remove(placement.pos, placement.layer, member);
                }
            }
        }
        tracing::trace!("Deleted {}", id);
        true
    }

    /// Whether `ancestor` appears in the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = self.objects.get(&id).and_then(|o| o.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.objects.get(&parent).and_then(|o| o.parent);
        }
        false
    }

    /// Topmost ancestor of an object (the object itself if it has no parent)
    pub fn root_of(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        while let Some(parent) = self.objects.get(&current).and_then(|o| o.parent) {
            current = parent;
        }
        current
    }

    /// Propagate a position to an object and its whole subtree
    fn sync_position(&mut self, id: ObjectId, pos: GridPos) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(obj) = self.objects.get_mut(&current) {
                obj.pos = pos;
                stack.extend(obj.contents.iter().copied());
                stack.extend(obj.parts.iter().copied());
            }
        }
    }

    /// Find contents of a given kind
    ///
    /// With `respect_open_state`, closed containers hide their contents
    /// (the starting container included). `max_matches` of `None` means no
    /// limit.
    pub fn contained_by_kind(
        &self,
        container: ObjectId,
        kind: &str,
        max_matches: Option<usize>,
        recursive: bool,
        respect_open_state: bool,
    ) -> Vec<ObjectId> {
        let limit = max_matches.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        let mut stack = vec![container];
        let mut visited = AHashSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(obj) = self.objects.get(&current) else {
                continue;
            };
            if respect_open_state && obj.attributes.is_closed_container() {
                continue;
            }
            let mut nested = Vec::new();
            for &child_id in &obj.contents {
                let Some(child) = self.objects.get(&child_id) else {
                    continue;
                };
                if child.is_kind(kind) {
                    out.push(child_id);
                    if out.len() >= limit {
                        return out;
                    }
                }
                if recursive {
                    nested.push(child_id);
                }
            }
            // Reverse so the stack visits children in content order
            stack.extend(nested.into_iter().rev());
        }
        out
    }

    /// The object plus everything transitively inside it or attached to it
    ///
    /// Each object appears once even if reachable along two paths.
    pub fn all_contained_and_parts(
        &self,
        id: ObjectId,
        include_contents: bool,
        include_parts: bool,
    ) -> Vec<ObjectId> {
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        self.collect_closure(id, include_contents, include_parts, false, &mut seen, &mut out);
        out
    }

    fn collect_closure(
        &self,
        id: ObjectId,
        include_contents: bool,
        include_parts: bool,
        respect_open_state: bool,
        seen: &mut AHashSet<ObjectId>,
        out: &mut Vec<ObjectId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        out.push(id);

        if include_contents && !(respect_open_state && obj.attributes.is_closed_container()) {
            for &child in &obj.contents {
                self.collect_closure(child, include_contents, include_parts, respect_open_state, seen, out);
            }
        }
        if include_parts {
            for &part in &obj.parts {
                self.collect_closure(part, include_contents, include_parts, respect_open_state, seen, out);
            }
        }
    }

    /// The outermost closed container between this object and the grid
    ///
    /// Answers "what must be opened to reach this object".
    pub fn outermost_closed_container(&self, id: ObjectId) -> Option<ObjectId> {
        let mut found = None;
        let mut current = self.objects.get(&id).and_then(|o| o.parent);
        while let Some(parent) = current {
            let Some(obj) = self.objects.get(&parent) else {
                break;
            };
            if obj.attributes.is_closed_container() {
                found = Some(parent);
            }
            current = obj.parent;
        }
        found
    }

    // === TICKING ===

    /// Run one object's update for the current step
    ///
    /// No-op if the object already ticked this step. Otherwise clears its
    /// per-tick markers, marks it complete, runs its behaviors, refreshes the
    /// display state if dirty and then ticks its contents and parts. The
    /// child list is snapshotted after the behaviors ran; children that left
    /// during the pass are skipped.
    pub fn tick_object(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        if obj.tick_completed {
            return;
        }
        obj.markers.clear();
        obj.tick_completed = true;

        crate::behaviors::run(self, id);

        // Behaviors may have replaced or destroyed this object
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        if obj.needs_refresh() {
            self.recompute_display(id);
        }

        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        let pos = obj.pos;
        let children: Vec<ObjectId> = obj.contents.iter().chain(obj.parts.iter()).copied().collect();

        for child in children {
            let Some(c) = self.objects.get_mut(&child) else {
                continue;
            };
            // Left this object earlier in the pass
            if c.parent != Some(id) {
                continue;
            }
            c.pos = pos;
            self.tick_object(child);
        }
    }

    /// Advance the simulation by one step
    pub fn step(&mut self) -> Vec<SimulationEvent> {
        crate::simulation::tick::run_simulation_tick(self)
    }

    /// Clear every completion flag before a new step
    pub(crate) fn reset_tick_flags(&mut self) {
        for obj in self.objects.values_mut() {
            obj.tick_completed = false;
        }
    }

    /// Snapshot of the root objects in traversal order
    pub(crate) fn roots(&self) -> Vec<ObjectId> {
        self.grid.roots()
    }

    pub(crate) fn advance_step(&mut self) {
        self.step += 1;
    }

    pub(crate) fn push_event(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    // === DISPLAY STATE ===

    /// Flag an object's display state for recomputation
    pub fn mark_dirty(&mut self, id: ObjectId) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.mark_dirty();
        }
    }

    /// Give an object a new name
    ///
    /// The owner's description lists its children by name, so it goes stale
    /// along with the renamed object.
    pub fn rename(&mut self, id: ObjectId, name: impl Into<String>) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        obj.name = name.into();
        obj.mark_dirty();
        if let Some(parent) = obj.parent {
            self.mark_dirty(parent);
        }
    }

    /// Recompute an object's display state and description now
    pub fn recompute_display(&mut self, id: ObjectId) {
        display::recompute(self, id);
    }

    /// Current display state, recomputed first if stale
    pub fn display_state(&mut self, id: ObjectId) -> Option<String> {
        if self.objects.get(&id)?.needs_refresh() {
            self.recompute_display(id);
        }
        self.objects.get(&id).map(|o| o.display_state().to_string())
    }

    /// Current description, recomputed first if stale
    pub fn describe(&mut self, id: ObjectId) -> Option<String> {
        if self.objects.get(&id)?.needs_refresh() {
            self.recompute_display(id);
        }
        self.objects.get(&id).map(|o| o.description().to_string())
    }
}
