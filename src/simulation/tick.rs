//! Tick system - advances the world one discrete step
//!
//! Each step clears every completion flag, then ticks a snapshot of the root
//! objects taken from the spatial index. Every root's tick cascades into its
//! contents and parts. Objects created during the pass are skipped if they
//! land in an already-visited region, since their completion flag is only
//! checked, never relied on for ordering.

use serde::{Deserialize, Serialize};

use crate::core::types::{ObjectId, Step};
use crate::world::World;

/// Events generated during a simulation step
///
/// Returned by `run_simulation_tick` for drivers that log or score progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    /// Sibling substances merged into a new product
    Reacted {
        product: ObjectId,
        reactants: Vec<ObjectId>,
    },
    /// A seed was replaced by the plant it grew into
    Sprouted { seed: ObjectId, plant: ObjectId },
    /// An auto-filling container created one item
    Replenished { container: ObjectId, item: ObjectId },
    /// A key's rust level dropped
    RustChanged { key: ObjectId, level: u8 },
    /// Food reached cooking temperature
    Cooked { object: ObjectId },
    /// A living object left its survivable temperature range
    Died { object: ObjectId },
    HoleDug { soil: ObjectId },
    HoleFilled { soil: ObjectId },
}

/// Run one simulation step and return what happened during it
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    world.reset_tick_flags();

    let roots = world.roots();
    for id in roots {
        // Roots can be deleted or swallowed by a container earlier in the pass
        let is_root = world.object(id).is_some_and(|o| o.parent().is_none());
        if is_root {
            world.tick_object(id);
        }
    }

    world.advance_step();
    let events = world.take_events();
    if !events.is_empty() {
        tracing::debug!("Step {}: {} events", world.step_count(), events.len());
    }
    events
}

/// Run several steps, collecting every event
pub fn run_steps(world: &mut World, steps: Step) -> Vec<SimulationEvent> {
    let mut events = Vec::new();
    for _ in 0..steps {
        events.extend(run_simulation_tick(world));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Layer;
    use crate::object::kinds;

    #[test]
    fn test_step_counter_advances() {
        let mut world = World::with_seed(1);
        assert_eq!(world.step_count(), 0);
        run_simulation_tick(&mut world);
        run_simulation_tick(&mut world);
        assert_eq!(world.step_count(), 2);
    }

    #[test]
    fn test_every_nested_object_ticks_once() {
        let mut world = World::with_seed(1);
        let chest = world.spawn(kinds::CHEST).unwrap();
        let jar = world.spawn(kinds::JAR).unwrap();
        let rock = world.spawn(kinds::ROCK).unwrap();
        let loose = world.spawn(kinds::ROCK).unwrap();
        world.place(2, 2, Layer::Furniture, chest).unwrap();
        world.add_object(chest, jar).unwrap();
        world.add_object(jar, rock).unwrap();

        run_simulation_tick(&mut world);

        for id in [chest, jar, rock] {
            assert!(world.object(id).unwrap().is_tick_completed(), "{id} not ticked");
        }
        // Unplaced objects are outside the world and never tick
        assert!(!world.object(loose).unwrap().is_tick_completed());
    }

    #[test]
    fn test_flags_reset_between_steps() {
        let mut world = World::with_seed(1);
        let bag = world.spawn(kinds::FERTILIZER_BAG).unwrap();
        world.place(0, 0, Layer::Object, bag).unwrap();

        let first = run_simulation_tick(&mut world);
        assert!(first
            .iter()
            .any(|e| matches!(e, SimulationEvent::Replenished { container, .. } if *container == bag)));
        assert!(world.object(bag).unwrap().is_tick_completed());

        world.reset_tick_flags();
        assert!(!world.object(bag).unwrap().is_tick_completed());
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let event = SimulationEvent::Sprouted {
            seed: ObjectId(1),
            plant: ObjectId(2),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "sprouted");
        assert_eq!(json["plant"], 2);
    }
}
