//! Domain behaviors layered on the object tick
//!
//! Behaviors are selected by the capability components an object carries.
//! Each runs at most once per object per step, from `World::tick_object`.

pub mod dispenser;
pub mod growth;
pub mod instruments;
pub mod rust;
pub mod shovel;
pub mod substance;
pub mod thermal;

use crate::actions::ActionResult;
use crate::core::types::ObjectId;
use crate::object::components::Tool;
use crate::world::World;

/// Run every behavior whose component the object carries
///
/// Later behaviors are skipped if an earlier one removed the object.
pub fn run(world: &mut World, id: ObjectId) {
    let Some(obj) = world.object(id) else {
        return;
    };
    let c = &obj.components;
    let has_substance = c.substance.is_some();
    let has_rust = c.rust.is_some();
    let has_seed = c.seed.is_some();
    let has_thermal = c.thermal.is_some();
    let has_auto_fill = c.auto_fill.is_some();

    if has_substance {
        substance::tick(world, id);
    }
    if has_rust && world.contains(id) {
        rust::tick(world, id);
    }
    if has_seed && world.contains(id) {
        growth::tick(world, id);
    }
    if has_thermal && world.contains(id) {
        thermal::tick_source(world, id);
    }
    if has_auto_fill && world.contains(id) {
        dispenser::tick_auto_fill(world, id);
    }
}

/// Use one object on another
///
/// Objects without a tool component don't know how to be used.
pub fn use_with(world: &mut World, instrument: ObjectId, patient: ObjectId) -> ActionResult {
    let Some(obj) = world.object(instrument) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !world.contains(patient) {
        return ActionResult::fail("That doesn't exist.");
    }
    let Some(tool) = obj.components.tool.clone() else {
        let patient_name = world.object(patient).map(|o| o.name.as_str()).unwrap_or("");
        return ActionResult::fail(format!(
            "I'm not sure how to use the {} with the {}.",
            obj.name, patient_name
        ));
    };

    match tool {
        Tool::Shovel => shovel::use_shovel(world, patient),
        Tool::RadiationMeter => instruments::measure_radiation(world, patient),
        Tool::PhMeter => instruments::measure_ph(world, patient),
        Tool::NutrientMeter => instruments::measure_nutrients(world, patient),
        Tool::Spectrometer => instruments::measure_spectrum(world, patient),
        Tool::Microscope => instruments::view_microscope(world, patient),
        Tool::SubstanceDispenser { substance } => {
            dispenser::dispense(world, instrument, &substance, patient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::kinds;

    #[test]
    fn test_plain_objects_do_not_know_how() {
        let mut world = World::with_seed(10);
        let rock = world.spawn(kinds::ROCK).unwrap();
        let jar = world.spawn(kinds::JAR).unwrap();
        let result = use_with(&mut world, rock, jar);
        assert!(!result.success);
        assert!(result.message.contains("not sure how"));
    }

    #[test]
    fn test_tools_dispatch_by_component() {
        let mut world = World::with_seed(10);
        let meter = world.spawn(kinds::RADIATION_METER).unwrap();
        let rock = world.spawn(kinds::ROCK).unwrap();
        let result = use_with(&mut world, meter, rock);
        assert!(result.success);
        assert!(result.message.contains("0.30"));
    }

    #[test]
    fn test_missing_patient() {
        let mut world = World::with_seed(10);
        let meter = world.spawn(kinds::PH_METER).unwrap();
        assert!(!use_with(&mut world, meter, ObjectId(404)).success);
    }
}
