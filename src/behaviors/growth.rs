//! Seed germination and sprouting
//!
//! State machine:
//! ```text
//! dormant (-1) --first qualifying tick--> counting (N > 0)
//! counting --p = soil quality--> counting (N - 1) ... --> ready (0)
//! ready --> replaced by a plant
//! ```
//! The countdown never resets. Unmet preconditions pause it.

use rand::Rng;

use crate::core::types::ObjectId;
use crate::object::components::GrowthStage;
use crate::object::kinds;
use crate::object::material::Material;
use crate::simulation::tick::SimulationEvent;
use crate::world::{SpawnArgs, World};

/// Nutrient richness of a soil tile in `[0, 1]`
///
/// Sums N+P+K over everything in and attached to the soil, normalized
/// against the configured nominal maximum.
pub fn soil_quality(world: &World, soil: ObjectId) -> f64 {
    let total: f64 = world
        .all_contained_and_parts(soil, true, true)
        .into_iter()
        .filter_map(|id| world.object(id))
        .map(|o| o.material_sum(Material::nutrient_total))
        .sum();
    (total / world.config().nutrient_nominal_max).clamp(0.0, 1.0)
}

/// Soil this seed can grow in right now, if any
fn growing_medium(world: &World, seed: ObjectId) -> Option<ObjectId> {
    let obj = world.object(seed)?;
    // Heat-damaged seeds never grow
    if !obj.attributes.is_living {
        return None;
    }
    let parent = world.object(obj.parent()?)?;
    if !parent.is_kind(kinds::SOIL) {
        return None;
    }
    if parent.components.soil.is_some_and(|s| s.has_hole) {
        return None;
    }
    Some(parent.id())
}

pub fn tick(world: &mut World, id: ObjectId) {
    let Some(soil) = growing_medium(world, id) else {
        return;
    };
    let quality = soil_quality(world, soil);
    let (min, max) = (world.config().sprout_time_min, world.config().sprout_time_max);

    let Some(obj) = world.object_mut(id) else {
        return;
    };
    let Some(stage) = obj.components.seed.as_ref().map(|s| s.stage()) else {
        return;
    };

    let next = match stage {
        GrowthStage::Dormant => Some(obj.rng_mut().gen_range(min..=max)),
        GrowthStage::Counting(t) => {
            if obj.rng_mut().gen_bool(quality) {
                Some(t - 1)
            } else {
                None
            }
        }
        GrowthStage::Ready => Some(0),
    };

    if let Some(time) = next {
        if let Some(seed) = obj.components.seed.as_mut() {
            if seed.sprout_time != time {
                seed.sprout_time = time;
                obj.markers.grew = true;
                obj.mark_dirty();
            }
        }
        if time == 0 {
            sprout(world, id, soil);
        }
    }
}

/// Replace a ready seed with the plant it grows into
fn sprout(world: &mut World, seed: ObjectId, soil: ObjectId) {
    let Some(obj) = world.object(seed) else {
        return;
    };
    let Some(state) = obj.components.seed.as_ref() else {
        return;
    };
    let plant_kind = state.plant_kind.clone();
    let mut args = SpawnArgs::new();
    if let Some(chance) = obj.attributes.get("poison_chance").cloned() {
        args = args.with_attr("poison_chance", chance);
    }

    let plant = match world.spawn_with(&plant_kind, &args) {
        Ok(plant) => plant,
        Err(e) => {
            tracing::error!("Seed {} cannot sprout into '{}': {}", seed, plant_kind, e);
            return;
        }
    };
    if let Err(e) = world.add_object(soil, plant) {
        tracing::error!("Failed to plant {} in {}: {}", plant, soil, e);
        world.delete_object(plant);
        return;
    }
    world.delete_object(seed);
    world.mark_dirty(soil);

    tracing::debug!("Seed {} sprouted into {} {}", seed, plant_kind, plant);
    world.push_event(SimulationEvent::Sprouted { seed, plant });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::components::SPROUT_TIME_UNSET;

    fn garden(world: &mut World) -> (ObjectId, ObjectId) {
        let soil = world.spawn(kinds::SOIL).unwrap();
        let seed = world.spawn(kinds::SEED).unwrap();
        world.add_object(soil, seed).unwrap();
        (soil, seed)
    }

    fn sprout_time(world: &World, seed: ObjectId) -> i32 {
        world.object(seed).unwrap().components.seed.as_ref().unwrap().sprout_time
    }

    #[test]
    fn test_soil_quality_is_normalized() {
        let mut world = World::with_seed(2);
        let (soil, _) = garden(&mut world);
        assert_eq!(soil_quality(&world, soil), 0.0);

        let dirt = world.spawn(kinds::DIRT).unwrap();
        world.add_object(soil, dirt).unwrap();
        assert!((soil_quality(&world, soil) - 0.3).abs() < 1e-9);

        for _ in 0..5 {
            let pellet = world.spawn(kinds::FERTILIZER_PELLET).unwrap();
            world.add_object(soil, pellet).unwrap();
        }
        assert_eq!(soil_quality(&world, soil), 1.0);
    }

    #[test]
    fn test_first_tick_starts_countdown() {
        let mut world = World::with_seed(2);
        let (_, seed) = garden(&mut world);
        assert_eq!(sprout_time(&world, seed), SPROUT_TIME_UNSET);

        tick(&mut world, seed);
        let t = sprout_time(&world, seed);
        let config = world.config();
        assert!(t >= config.sprout_time_min && t <= config.sprout_time_max);
    }

    #[test]
    fn test_barren_soil_pauses_countdown() {
        let mut world = World::with_seed(2);
        let (_, seed) = garden(&mut world);
        tick(&mut world, seed);
        let started = sprout_time(&world, seed);
        for _ in 0..20 {
            tick(&mut world, seed);
        }
        assert_eq!(sprout_time(&world, seed), started);
    }

    #[test]
    fn test_seed_outside_soil_stays_dormant() {
        let mut world = World::with_seed(2);
        let jar = world.spawn(kinds::JAR).unwrap();
        let seed = world.spawn(kinds::SEED).unwrap();
        world.add_object(jar, seed).unwrap();
        tick(&mut world, seed);
        assert_eq!(sprout_time(&world, seed), SPROUT_TIME_UNSET);
    }

    #[test]
    fn test_holed_soil_pauses_growth() {
        let mut world = World::with_seed(2);
        let (soil, seed) = garden(&mut world);
        world.object_mut(soil).unwrap().components.soil.as_mut().unwrap().has_hole = true;
        tick(&mut world, seed);
        assert_eq!(sprout_time(&world, seed), SPROUT_TIME_UNSET);
    }

    #[test]
    fn test_dead_seed_does_not_grow() {
        let mut world = World::with_seed(2);
        let (_, seed) = garden(&mut world);
        world.object_mut(seed).unwrap().attributes.is_living = false;
        tick(&mut world, seed);
        assert_eq!(sprout_time(&world, seed), SPROUT_TIME_UNSET);
    }

    #[test]
    fn test_ready_seed_is_replaced_by_plant() {
        let mut world = World::with_seed(2);
        let (soil, seed) = garden(&mut world);
        world.object_mut(seed).unwrap().components.seed.as_mut().unwrap().sprout_time = 0;

        tick(&mut world, seed);

        assert!(!world.contains(seed));
        let plants = world.contained_by_kind(soil, kinds::PLANT, None, false, false);
        assert_eq!(plants.len(), 1);
        assert!(world.object(plants[0]).unwrap().attributes.is_living);
    }

    #[test]
    fn test_rich_soil_counts_down_every_tick() {
        let mut world = World::with_seed(2);
        let (soil, seed) = garden(&mut world);
        for _ in 0..10 {
            let pellet = world.spawn(kinds::FERTILIZER_PELLET).unwrap();
            world.add_object(soil, pellet).unwrap();
        }
        tick(&mut world, seed);
        let start = sprout_time(&world, seed);
        tick(&mut world, seed);
        assert_eq!(sprout_time(&world, seed), start - 1);
    }
}
