//! Digging and filling holes in soil

use crate::actions::ActionResult;
use crate::core::types::{Layer, ObjectId};
use crate::object::kinds;
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

pub fn use_shovel(world: &mut World, patient: ObjectId) -> ActionResult {
    let Some(target) = world.object(patient) else {
        return ActionResult::fail("That doesn't exist.");
    };
    let Some(soil) = target.components.soil else {
        return ActionResult::fail(format!("You can't dig in the {}.", target.name));
    };
    if soil.has_hole {
        fill(world, patient)
    } else {
        dig(world, patient)
    }
}

fn set_hole(world: &mut World, soil: ObjectId, has_hole: bool) {
    if let Some(obj) = world.object_mut(soil) {
        if let Some(state) = obj.components.soil.as_mut() {
            state.has_hole = has_hole;
        }
        obj.mark_dirty();
    }
}

fn dig(world: &mut World, soil: ObjectId) -> ActionResult {
    let dirt = world.contained_by_kind(soil, kinds::DIRT, None, false, false);
    if dirt.is_empty() {
        tracing::error!("Soil {} has no dirt to dig out", soil);
        return ActionResult::fail("The ground here is too hard to dig.");
    }

    let Some(pos) = world.object(soil).map(|o| o.position()) else {
        return ActionResult::fail("That doesn't exist.");
    };
    for pile in dirt {
        if let Err(e) = world.place(pos.x, pos.y, Layer::Object, pile) {
            tracing::error!("Failed to place dug dirt {}: {}", pile, e);
            return ActionResult::fail("The dirt slides back into the hole.");
        }
    }

    set_hole(world, soil, true);
    world.push_event(SimulationEvent::HoleDug { soil });
    ActionResult::ok("You dig a hole in the soil.")
}

fn fill(world: &mut World, soil: ObjectId) -> ActionResult {
    let Some(pos) = world.object(soil).map(|o| o.position()) else {
        return ActionResult::fail("That doesn't exist.");
    };
    let piles: Vec<ObjectId> = world
        .objects_at_layer(pos.x, pos.y, Layer::Object)
        .into_iter()
        .filter(|id| world.object(*id).is_some_and(|o| o.is_kind(kinds::DIRT)))
        .collect();
    if piles.is_empty() {
        return ActionResult::fail("There's no dirt here to fill the hole with.");
    }

    for pile in piles {
        if let Err(e) = world.add_object(soil, pile) {
            tracing::error!("Failed to return dirt {} to {}: {}", pile, soil, e);
            return ActionResult::fail("The dirt won't go back in.");
        }
    }

    set_hole(world, soil, false);
    world.push_event(SimulationEvent::HoleFilled { soil });
    ActionResult::ok("You fill the hole with dirt.")
}
