//! Temperature transfer from heat and cold sources
//!
//! An active source moves the temperature of everything it contains toward
//! its target by at most `max_delta_c` per tick. Heaters never cool and
//! coolers never heat.

use crate::core::types::ObjectId;
use crate::object::components::{ThermalMode, ThermalSource};
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

/// One step of `current` toward the source's target, never overshooting
pub fn approach(current: f64, source: &ThermalSource) -> f64 {
    match source.mode {
        ThermalMode::Heat if current < source.target_c => {
            (current + source.max_delta_c).min(source.target_c)
        }
        ThermalMode::Cool if current > source.target_c => {
            (current - source.max_delta_c).max(source.target_c)
        }
        _ => current,
    }
}

pub fn tick_source(world: &mut World, id: ObjectId) {
    let Some(obj) = world.object(id) else {
        return;
    };
    if !obj.attributes.is_activated {
        return;
    }
    let Some(source) = obj.components.thermal else {
        return;
    };

    let affected: Vec<ObjectId> = world
        .all_contained_and_parts(id, true, false)
        .into_iter()
        .filter(|c| *c != id)
        .collect();

    for target in affected {
        let Some(obj) = world.object_mut(target) else {
            continue;
        };
        let current = obj.attributes.temperature_c;
        let next = approach(current, &source);
        if next == current {
            continue;
        }
        obj.attributes.temperature_c = next;
        obj.markers.temperature_changed = true;
        obj.mark_dirty();
        apply_temperature_effects(world, target);
    }
}

/// Cook food and kill living things pushed outside their survivable range
pub fn apply_temperature_effects(world: &mut World, id: ObjectId) {
    let cooking_c = world.config().cooking_temperature_c;
    let Some(obj) = world.object_mut(id) else {
        return;
    };
    let temperature = obj.attributes.temperature_c;
    let mut events = Vec::new();

    if obj.attributes.is_food && !obj.attributes.is_cooked && temperature >= cooking_c {
        obj.attributes.is_cooked = true;
        obj.mark_dirty();
        events.push(SimulationEvent::Cooked { object: id });
    }

    let range = obj.materials.iter().find_map(|m| m.living_range());
    if let Some((min, max)) = range {
        if obj.attributes.is_living && (temperature < min || temperature > max) {
            obj.attributes.is_living = false;
            obj.attributes.is_poisonous = false;
            obj.mark_dirty();
            events.push(SimulationEvent::Died { object: id });
        }
    }

    for event in events {
        tracing::debug!("Temperature effect on {}: {:?}", id, event);
        world.push_event(event);
    }
}
