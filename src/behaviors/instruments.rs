//! Measuring instruments used on other objects

use crate::actions::ActionResult;
use crate::behaviors::growth::soil_quality;
use crate::core::types::ObjectId;
use crate::object::kinds;
use crate::object::material::Material;
use crate::world::World;

/// Every material on the patient and everything inside or attached to it
fn materials_of<'w>(world: &'w World, patient: ObjectId) -> Vec<&'w Material> {
    world
        .all_contained_and_parts(patient, true, true)
        .into_iter()
        .filter_map(|id| world.object(id))
        .flat_map(|o| o.materials.iter())
        .collect()
}

fn name_of(world: &World, id: ObjectId) -> String {
    world.object(id).map(|o| o.name.clone()).unwrap_or_default()
}

pub fn measure_radiation(world: &World, patient: ObjectId) -> ActionResult {
    let total: f64 = materials_of(world, patient).iter().map(|m| m.radiation_usv_h).sum();
    ActionResult::ok(format!(
        "The radiation meter reads {:.2} uSv/h for the {}.",
        total,
        name_of(world, patient)
    ))
}

pub fn measure_ph(world: &World, patient: ObjectId) -> ActionResult {
    let readings: Vec<f64> = materials_of(world, patient).iter().filter_map(|m| m.ph).collect();
    if readings.is_empty() {
        return ActionResult::ok(format!(
            "The pH meter reading for the {} is inconclusive.",
            name_of(world, patient)
        ));
    }
    let average = readings.iter().sum::<f64>() / readings.len() as f64;
    ActionResult::ok(format!(
        "The pH meter reads {:.1} for the {}.",
        average,
        name_of(world, patient)
    ))
}

pub fn measure_nutrients(world: &World, patient: ObjectId) -> ActionResult {
    let Some(target) = world.object(patient) else {
        return ActionResult::fail("That doesn't exist.");
    };
    if !target.is_kind(kinds::SOIL) {
        return ActionResult::fail(format!(
            "The soil nutrient meter only works on soil, not the {}.",
            target.name
        ));
    }

    let materials = materials_of(world, patient);
    let sum = |f: fn(&Material) -> f64| materials.iter().map(|m| f(m)).sum::<f64>();
    ActionResult::ok(format!(
        "Soil nutrients: nitrogen {:.1}, phosphorus {:.1}, potassium {:.1} (quality {:.0}%).",
        sum(|m| m.nitrogen),
        sum(|m| m.phosphorus),
        sum(|m| m.potassium),
        soil_quality(world, patient) * 100.0
    ))
}

pub fn measure_spectrum(world: &World, patient: ObjectId) -> ActionResult {
    let signature = materials_of(world, patient)
        .into_iter()
        .find(|m| !m.spectrum.is_empty());
    match signature {
        Some(material) => {
            let bands: Vec<String> = material.spectrum.iter().map(|v| format!("{:.2}", v)).collect();
            ActionResult::ok(format!(
                "The spectrometer shows peaks [{}] for the {}.",
                bands.join(", "),
                name_of(world, patient)
            ))
        }
        None => ActionResult::ok(format!(
            "The spectrometer shows no clear signature for the {}.",
            name_of(world, patient)
        )),
    }
}

pub fn view_microscope(world: &World, patient: ObjectId) -> ActionResult {
    let Some(target) = world.object(patient) else {
        return ActionResult::fail("That doesn't exist.");
    };
    let views: Vec<&str> = target
        .materials
        .iter()
        .filter_map(|m| m.microscope_desc.as_deref())
        .collect();
    if views.is_empty() {
        return ActionResult::ok(format!(
            "Under the microscope, the {} shows nothing remarkable.",
            target.name
        ));
    }
    ActionResult::ok(format!(
        "Under the microscope, the {}: {}",
        target.name,
        views.join(" ")
    ))
}
