//! Agent-facing verbs
//!
//! Verbs never return `Err` for ordinary domain outcomes. A request that
//! makes no sense in the current world state comes back as a failed
//! `ActionResult` with a message suitable for showing to the agent.

use serde::{Deserialize, Serialize};

use crate::core::types::ObjectId;
use crate::world::World;

/// Outcome of an agent action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Use an instrument or tool on a patient object
pub fn use_with(world: &mut World, instrument: ObjectId, patient: ObjectId) -> ActionResult {
    crate::behaviors::use_with(world, instrument, patient)
}

pub fn open(world: &mut World, id: ObjectId) -> ActionResult {
    set_open(world, id, true)
}

pub fn close(world: &mut World, id: ObjectId) -> ActionResult {
    set_open(world, id, false)
}

fn set_open(world: &mut World, id: ObjectId, open: bool) -> ActionResult {
    let (verb, participle) = if open { ("open", "opened") } else { ("close", "closed") };
    let Some(obj) = world.object_mut(id) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !obj.attributes.is_openable {
        return ActionResult::fail(format!("The {} can't be {}.", obj.name, participle));
    }
    if obj.attributes.is_open_container == open {
        let state = if open { "open" } else { "closed" };
        return ActionResult::fail(format!("The {} is already {}.", obj.name, state));
    }

    obj.attributes.is_open_container = open;
    // Doors block movement only while shut
    if obj.is_kind(crate::object::kinds::DOOR) {
        obj.attributes.is_passable = open;
    }
    obj.mark_dirty();
    ActionResult::ok(format!("You {} the {}.", verb, obj.name))
}

pub fn activate(world: &mut World, id: ObjectId) -> ActionResult {
    set_activated(world, id, true)
}

pub fn deactivate(world: &mut World, id: ObjectId) -> ActionResult {
    set_activated(world, id, false)
}

fn set_activated(world: &mut World, id: ObjectId, on: bool) -> ActionResult {
    let Some(obj) = world.object_mut(id) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !obj.attributes.is_activatable {
        return ActionResult::fail(format!("The {} can't be switched on or off.", obj.name));
    }
    let state = if on { "on" } else { "off" };
    if obj.attributes.is_activated == on {
        return ActionResult::fail(format!("The {} is already {}.", obj.name, state));
    }

    obj.attributes.is_activated = on;
    obj.mark_dirty();
    ActionResult::ok(format!("You turn the {} {}.", obj.name, state))
}

/// Move an object into a container the agent can reach into
pub fn put_in(world: &mut World, obj: ObjectId, container: ObjectId) -> ActionResult {
    let (Some(item), Some(target)) = (world.object(obj), world.object(container)) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !target.attributes.is_container {
        return ActionResult::fail(format!("The {} can't hold anything.", target.name));
    }
    if !target.attributes.is_open_container {
        return ActionResult::fail(format!("The {} is closed.", target.name));
    }
    if !item.attributes.is_movable {
        return ActionResult::fail(format!("The {} can't be moved.", item.name));
    }
    let message = format!("You put the {} in the {}.", item.name, target.name);

    match world.add_object(container, obj) {
        Ok(()) => ActionResult::ok(message),
        Err(e) => {
            tracing::warn!("put_in {} -> {} rejected: {}", obj, container, e);
            ActionResult::fail("That won't fit there.")
        }
    }
}
