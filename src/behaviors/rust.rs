//! Rust removal scored by mixture similarity
//!
//! A rusted key sitting in a container with exactly one substance compares
//! that substance's mixture against its removal recipe. Closer mixtures
//! remove more rust. Rust never comes back once removed.

use crate::behaviors::substance::{self, normalize_name};
use crate::core::config::SimulationConfig;
use crate::core::types::ObjectId;
use crate::object::components::RUST_LEVEL_MAX;
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

/// Cosine similarity between two proportion maps
///
/// Computed over the union of ingredient names, with missing ingredients
/// counted as zero. Empty or all-zero inputs score 0.
pub fn cosine_similarity(a: &[(String, f64)], b: &[(String, f64)]) -> f64 {
    let mut names: Vec<String> = Vec::new();
    for (name, _) in a.iter().chain(b.iter()) {
        let key = normalize_name(name);
        if !names.contains(&key) {
            names.push(key);
        }
    }

    let lookup = |map: &[(String, f64)], key: &str| -> f64 {
        map.iter()
            .filter(|(k, _)| normalize_name(k) == key)
            .map(|(_, v)| *v)
            .sum()
    };
    let va: Vec<f64> = names.iter().map(|n| lookup(a, n)).collect();
    let vb: Vec<f64> = names.iter().map(|n| lookup(b, n)).collect();

    let norm_a = va.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = vb.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Folding from +0.0 keeps disjoint inputs from reporting -0.0
    va.iter()
        .zip(vb.iter())
        .fold(0.0, |acc, (x, y)| acc + (x / norm_a) * (y / norm_b))
}

/// Rust level earned by a similarity score
pub fn rust_level_for(similarity: f64, config: &SimulationConfig) -> u8 {
    if similarity >= config.rust_clean_threshold {
        0
    } else if similarity >= config.rust_light_threshold {
        1
    } else if similarity >= config.rust_medium_threshold {
        2
    } else {
        RUST_LEVEL_MAX
    }
}

/// Display name of a key at a rust level
pub fn rust_name(level: u8) -> &'static str {
    match level {
        0 => "key",
        1 => "slightly rusted key",
        2 => "rusted key",
        _ => "heavily rusted key",
    }
}

pub fn tick(world: &mut World, id: ObjectId) {
    let Some(parent) = world.object(id).and_then(|o| o.parent()) else {
        return;
    };
    let Some(container) = world.object(parent) else {
        return;
    };

    let substances: Vec<ObjectId> = container
        .contents()
        .iter()
        .copied()
        .filter(|c| world.object(*c).is_some_and(|o| o.is_substance()))
        .collect();
    // Several substances still have to react first
    let [solution] = substances.as_slice() else {
        return;
    };
    let Some((_, mixture)) = substance::derive_identity(world, *solution) else {
        return;
    };

    let config = world.config().clone();
    let Some(obj) = world.object_mut(id) else {
        return;
    };
    let Some(rust) = obj.components.rust.as_mut() else {
        return;
    };

    let similarity = cosine_similarity(&mixture, &rust.recipe);
    rust.last_similarity = Some(similarity);
    let level = rust.level.min(rust_level_for(similarity, &config));
    if level == rust.level {
        return;
    }

    rust.level = level;
    world.rename(id, rust_name(level));
    tracing::debug!("{} rust level -> {} (similarity {:.3})", id, level, similarity);
    world.push_event(SimulationEvent::RustChanged { key: id, level });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::kinds;
    use crate::world::SpawnArgs;

    fn map(entries: &[(&str, f64)]) -> Vec<(String, f64)> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_identical_proportions_score_one() {
        let sim = cosine_similarity(&map(&[("A", 1.0), ("C", 2.0)]), &map(&[("C", 4.0), ("A", 2.0)]));
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_ingredients_score_zero() {
        let sim = cosine_similarity(&map(&[("A", 1.0)]), &map(&[("B", 1.0)]));
        assert_eq!(sim, 0.0);
        assert!(sim.is_sign_positive());
    }

    #[test]
    fn test_partial_overlap() {
        let sim = cosine_similarity(&map(&[("A", 1.0)]), &map(&[("A", 1.0), ("C", 2.0)]));
        // 1 / sqrt(5)
        assert!((sim - 0.4472).abs() < 1e-3);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(cosine_similarity(&[], &map(&[("A", 1.0)])), 0.0);
    }

    #[test]
    fn test_bands() {
        let config = SimulationConfig::default();
        assert_eq!(rust_level_for(1.0, &config), 0);
        assert_eq!(rust_level_for(0.99, &config), 0);
        assert_eq!(rust_level_for(0.8, &config), 1);
        assert_eq!(rust_level_for(0.5, &config), 2);
        assert_eq!(rust_level_for(0.1, &config), 3);
    }

    #[test]
    fn test_key_in_matching_solution_is_cleaned() {
        let mut world = World::with_seed(4);
        let jar = world.spawn(kinds::JAR).unwrap();
        let key = world
            .spawn_with(kinds::KEY, &SpawnArgs::new().with_recipe([("vinegar", 1.0)]))
            .unwrap();
        let vinegar = world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named("vinegar")).unwrap();
        world.add_object(jar, key).unwrap();
        world.add_object(jar, vinegar).unwrap();

        tick(&mut world, key);

        let k = world.object(key).unwrap();
        assert_eq!(k.components.rust.as_ref().unwrap().level, 0);
        assert_eq!(k.name, "key");
    }

    #[test]
    fn test_rust_is_not_added_back() {
        let mut world = World::with_seed(4);
        let jar = world.spawn(kinds::JAR).unwrap();
        let key = world
            .spawn_with(kinds::KEY, &SpawnArgs::new().with_recipe([("vinegar", 1.0)]))
            .unwrap();
        world.object_mut(key).unwrap().components.rust.as_mut().unwrap().level = 1;
        let water = world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named("water")).unwrap();
        world.add_object(jar, key).unwrap();
        world.add_object(jar, water).unwrap();

        tick(&mut world, key);

        let rust = world.object(key).unwrap().components.rust.clone().unwrap();
        assert_eq!(rust.level, 1);
        assert_eq!(rust.last_similarity, Some(0.0));
    }

    #[test]
    fn test_two_substances_skip_evaluation() {
        let mut world = World::with_seed(4);
        let jar = world.spawn(kinds::JAR).unwrap();
        let key = world
            .spawn_with(kinds::KEY, &SpawnArgs::new().with_recipe([("vinegar", 1.0)]))
            .unwrap();
        world.add_object(jar, key).unwrap();
        for name in ["vinegar", "water"] {
            let s = world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named(name)).unwrap();
            world.add_object(jar, s).unwrap();
        }

        tick(&mut world, key);

        let rust = world.object(key).unwrap().components.rust.clone().unwrap();
        assert_eq!(rust.level, RUST_LEVEL_MAX);
        assert!(rust.last_similarity.is_none());
    }
}
