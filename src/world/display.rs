//! Display-state and description inference
//!
//! Both are derived from attributes and components and cached on the
//! object. They are only recomputed when the object has been marked dirty.

use crate::core::types::ObjectId;
use crate::object::components::GrowthStage;
use crate::object::entity::WorldObject;
use crate::world::World;

/// Presentation tag for an object's current state
///
/// The most specific capability wins: rust, growth, soil, substance,
/// activation, open state, cooking, life. Objects with none of these report
/// `"default"`.
pub fn infer_display_state(obj: &WorldObject) -> String {
    let c = &obj.components;
    let a = &obj.attributes;

    if let Some(rust) = &c.rust {
        return format!("rust_{}", rust.level);
    }
    if let Some(seed) = &c.seed {
        let stage = match seed.stage() {
            GrowthStage::Dormant => "dormant",
            GrowthStage::Counting(_) => "germinating",
            GrowthStage::Ready => "ready",
        };
        return if a.is_living { stage.to_string() } else { "dead".to_string() };
    }
    if let Some(soil) = &c.soil {
        return if soil.has_hole { "hole" } else { "filled" }.to_string();
    }
    if let Some(substance) = &c.substance {
        return if substance.is_mixture() { "mixture" } else { "pure" }.to_string();
    }
    if a.is_activatable {
        return if a.is_activated { "on" } else { "off" }.to_string();
    }
    if a.is_openable {
        return if a.is_open_container { "open" } else { "closed" }.to_string();
    }
    if a.is_container && !a.is_open_container {
        return "closed".to_string();
    }
    if a.is_food && a.is_cooked {
        return "cooked".to_string();
    }
    if obj.materials.iter().any(|m| m.living_range().is_some()) {
        return if a.is_living { "alive" } else { "dead" }.to_string();
    }
    "default".to_string()
}

/// One-line description in the form "a jar (open), containing water"
pub fn describe(world: &World, id: ObjectId) -> String {
    let Some(obj) = world.object(id) else {
        return String::new();
    };
    let a = &obj.attributes;

    let mut qualifiers = Vec::new();
    if a.is_activatable {
        qualifiers.push(if a.is_activated { "on" } else { "off" });
    }
    if a.is_openable || a.is_container {
        qualifiers.push(if a.is_open_container { "open" } else { "closed" });
    }
    if a.is_food && a.is_cooked {
        qualifiers.push("cooked");
    }
    if a.is_poisonous {
        qualifiers.push("poisonous");
    }
    if obj.components.soil.is_some_and(|s| s.has_hole) {
        qualifiers.push("with a hole");
    }

    let mut text = format!("a {}", obj.name);
    if !qualifiers.is_empty() {
        text.push_str(&format!(" ({})", qualifiers.join(", ")));
    }

    if !a.is_closed_container() && !obj.contents.is_empty() {
        let names: Vec<&str> = obj
            .contents
            .iter()
            .filter_map(|c| world.object(*c))
            .map(|c| c.name.as_str())
            .collect();
        text.push_str(", containing ");
        text.push_str(&list_phrase(&names));
    }
    text
}

fn list_phrase(names: &[&str]) -> String {
    match names {
        [] => "nothing".to_string(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Recompute and cache display state and description, clearing the dirty flag
pub fn recompute(world: &mut World, id: ObjectId) {
    let Some(obj) = world.object(id) else {
        return;
    };
    let state = infer_display_state(obj);
    let description = describe(world, id);

    if let Some(obj) = world.object_mut(id) {
        obj.display.state = state;
        obj.display.description = description;
        obj.display.dirty = false;
    }
}
