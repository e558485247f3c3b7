//! Auto-replenishing containers and substance dispensers

use crate::actions::ActionResult;
use crate::core::types::ObjectId;
use crate::object::kinds;
use crate::simulation::tick::SimulationEvent;
use crate::world::{SpawnArgs, World};

/// Keep an auto-fill container stocked
///
/// The first tick fills the container straight up to its target count.
/// After that it creates one item per elapsed cooldown while below target,
/// and otherwise counts the cooldown down.
pub fn tick_auto_fill(world: &mut World, id: ObjectId) {
    let Some(fill) = world.object(id).and_then(|o| o.components.auto_fill.clone()) else {
        return;
    };
    let count = world
        .contained_by_kind(id, &fill.item_kind, None, false, false)
        .len();

    let to_create = if !fill.primed {
        fill.target_count.saturating_sub(count)
    } else if count < fill.target_count && fill.cooldown_remaining == 0 {
        1
    } else {
        0
    };

    let mut created = 0;
    for _ in 0..to_create {
        match create_item(world, id, &fill.item_kind) {
            Some(_) => created += 1,
            None => break,
        }
    }

    let Some(state) = world
        .object_mut(id)
        .and_then(|o| o.components.auto_fill.as_mut())
    else {
        return;
    };
    if !state.primed || created > 0 {
        state.primed = true;
        state.cooldown_remaining = state.cooldown_ticks;
    } else {
        state.cooldown_remaining = state.cooldown_remaining.saturating_sub(1);
    }

    if created > 0 {
        if let Some(obj) = world.object_mut(id) {
            obj.markers.replenished = true;
            obj.mark_dirty();
        }
    }
}

fn create_item(world: &mut World, container: ObjectId, kind: &str) -> Option<ObjectId> {
    let item = match world.spawn(kind) {
        Ok(item) => item,
        Err(e) => {
            tracing::warn!("Container {} cannot create '{}': {}", container, kind, e);
            return None;
        }
    };
    if let Err(e) = world.add_object(container, item) {
        tracing::error!("Failed to add {} to {}: {}", item, container, e);
        world.delete_object(item);
        return None;
    }
    tracing::debug!("Container {} replenished {} {}", container, kind, item);
    world.push_event(SimulationEvent::Replenished { container, item });
    Some(item)
}

/// Pour one unit of a dispenser's substance into an open container
pub fn dispense(world: &mut World, dispenser: ObjectId, substance: &str, patient: ObjectId) -> ActionResult {
    let Some(target) = world.object(patient) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !target.attributes.is_container {
        return ActionResult::fail(format!("The {} can't hold a substance.", target.name));
    }
    if !target.attributes.is_open_container {
        return ActionResult::fail(format!("The {} is closed.", target.name));
    }
    let target_name = target.name.clone();

    let unit = match world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named(substance)) {
        Ok(unit) => unit,
        Err(e) => {
            tracing::error!("Dispenser {} failed to create {}: {}", dispenser, substance, e);
            return ActionResult::fail("The dispenser sputters but nothing comes out.");
        }
    };
    if let Err(e) = world.add_object(patient, unit) {
        tracing::error!("Dispenser {} failed to fill {}: {}", dispenser, patient, e);
        world.delete_object(unit);
        return ActionResult::fail("The dispenser sputters but nothing comes out.");
    }
    ActionResult::ok(format!("You dispense some {} into the {}.", substance, target_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pellets(world: &World, bag: ObjectId) -> usize {
        world
            .contained_by_kind(bag, kinds::FERTILIZER_PELLET, None, false, false)
            .len()
    }

    fn cooldown(world: &World, bag: ObjectId) -> u32 {
        world
            .object(bag)
            .unwrap()
            .components
            .auto_fill
            .as_ref()
            .unwrap()
            .cooldown_remaining
    }

    #[test]
    fn test_first_tick_fills_to_target() {
        let mut world = World::with_seed(6);
        let bag = world.spawn(kinds::FERTILIZER_BAG).unwrap();
        tick_auto_fill(&mut world, bag);
        assert_eq!(pellets(&world, bag), 3);
        assert!(world.object(bag).unwrap().markers.replenished);
    }

    #[test]
    fn test_refill_waits_for_cooldown() {
        let mut world = World::with_seed(6);
        let bag = world.spawn(kinds::FERTILIZER_BAG).unwrap();
        tick_auto_fill(&mut world, bag);
        let cooldown_ticks = world.config().dispenser_cooldown_ticks;

        // Take one pellet out
        let taken = world.object(bag).unwrap().contents()[0];
        world.delete_object(taken);

        for _ in 0..cooldown_ticks {
            tick_auto_fill(&mut world, bag);
            assert_eq!(pellets(&world, bag), 2);
        }
        assert_eq!(cooldown(&world, bag), 0);

        tick_auto_fill(&mut world, bag);
        assert_eq!(pellets(&world, bag), 3);
        assert_eq!(cooldown(&world, bag), cooldown_ticks);
    }

    #[test]
    fn test_full_bag_only_counts_down() {
        let mut world = World::with_seed(6);
        let bag = world.spawn(kinds::FERTILIZER_BAG).unwrap();
        tick_auto_fill(&mut world, bag);
        for _ in 0..30 {
            tick_auto_fill(&mut world, bag);
        }
        assert_eq!(pellets(&world, bag), 3);
        assert_eq!(cooldown(&world, bag), 0);
    }

    #[test]
    fn test_dispense_into_open_container() {
        let mut world = World::with_seed(6);
        let dispenser = world.spawn(kinds::SUBSTANCE_DISPENSER).unwrap();
        let jar = world.spawn(kinds::JAR).unwrap();

        let result = dispense(&mut world, dispenser, "water", jar);
        assert!(result.success);
        let contents = world.object(jar).unwrap().contents().to_vec();
        assert_eq!(contents.len(), 1);
        assert_eq!(world.object(contents[0]).unwrap().name, "water");
    }

    #[test]
    fn test_dispense_rejects_closed_and_non_containers() {
        let mut world = World::with_seed(6);
        let dispenser = world.spawn(kinds::SUBSTANCE_DISPENSER).unwrap();
        let chest = world.spawn(kinds::CHEST).unwrap();
        let rock = world.spawn(kinds::ROCK).unwrap();

        assert!(!dispense(&mut world, dispenser, "water", chest).success);
        assert!(!dispense(&mut world, dispenser, "water", rock).success);
        assert!(world.object(chest).unwrap().contents().is_empty());
    }
}
