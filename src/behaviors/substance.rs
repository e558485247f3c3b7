//! Substance identity and auto-reaction
//!
//! A substance's name and mixture are derived every tick from the substances
//! it holds. Two or more substances sitting loose in the same non-substance
//! container react: they are gathered into a new product substance whose
//! identity is then derived from them.

use crate::core::types::ObjectId;
use crate::object::kinds;
use crate::simulation::tick::SimulationEvent;
use crate::world::{SpawnArgs, World};

/// Name given to a freshly created reaction product
pub const REACTION_PRODUCT_NAME: &str = "reacting substance";

/// Strip a trailing quantity such as " (3 measures)" or " (1 measure)"
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some(stripped) = trimmed.strip_suffix(')') {
        if let Some(open) = stripped.rfind(" (") {
            let inner = &stripped[open + 2..];
            let mut words = inner.split_whitespace();
            let is_quantity = matches!(
                (words.next(), words.next(), words.next()),
                (Some(n), Some("measure" | "measures"), None) if n.parse::<f64>().is_ok()
            );
            if is_quantity {
                return stripped[..open].trim_end().to_string();
            }
        }
    }
    trimmed.to_string()
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Base names of the innermost substances held by `id`, in discovery order
fn collect_leaves(world: &World, id: ObjectId, out: &mut Vec<String>) {
    let Some(obj) = world.object(id) else {
        return;
    };
    for &child_id in obj.contents() {
        let Some(child) = world.object(child_id) else {
            continue;
        };
        let Some(state) = &child.components.substance else {
            continue;
        };
        let holds_substances = child
            .contents()
            .iter()
            .any(|c| world.object(*c).is_some_and(|o| o.is_substance()));
        if holds_substances {
            collect_leaves(world, child_id, out);
        } else {
            out.push(state.base_name.clone());
        }
    }
}

/// Derive a substance's display name and canonical mixture from its contents
///
/// Returns `None` if `id` is not a substance.
pub fn derive_identity(world: &World, id: ObjectId) -> Option<(String, Vec<(String, f64)>)> {
    let obj = world.object(id)?;
    let state = obj.components.substance.as_ref()?;

    let mut leaves = Vec::new();
    collect_leaves(world, id, &mut leaves);

    match leaves.as_slice() {
        [] => Some((
            state.base_name.clone(),
            vec![(normalize_name(&state.base_name), 1.0)],
        )),
        [only] => Some((only.clone(), vec![(normalize_name(only), 1.0)])),
        _ => {
            let mut counts: Vec<(String, u64)> = Vec::new();
            for leaf in &leaves {
                let key = normalize_name(leaf);
                match counts.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((key, 1)),
                }
            }
            // Stable: ties keep discovery order
            counts.sort_by(|a, b| b.1.cmp(&a.1));

            let name = if counts.len() == 1 {
                counts[0].0.clone()
            } else {
                let parts: Vec<String> = counts
                    .iter()
                    .map(|(k, n)| format!("{} parts {}", n, k))
                    .collect();
                format!("mixture ({})", parts.join(", "))
            };

            let divisor = counts.iter().fold(0, |acc, (_, n)| gcd(acc, *n)).max(1);
            let mixture = counts
                .into_iter()
                .map(|(k, n)| (k, (n / divisor) as f64))
                .collect();
            Some((name, mixture))
        }
    }
}

/// Per-tick substance update: refresh identity, then react with siblings
pub fn tick(world: &mut World, id: ObjectId) {
    refresh_identity(world, id);
    react(world, id);
}

fn refresh_identity(world: &mut World, id: ObjectId) {
    let Some((name, mixture)) = derive_identity(world, id) else {
        return;
    };
    let Some(obj) = world.object_mut(id) else {
        return;
    };
    let changed = match &obj.components.substance {
        Some(state) => state.mixture != mixture || obj.name != name,
        None => false,
    };
    if changed {
        if let Some(state) = obj.components.substance.as_mut() {
            state.mixture = mixture;
        }
        world.rename(id, name);
    }
}

/// Substances directly inside a container
fn substance_children(world: &World, container: ObjectId) -> Vec<ObjectId> {
    world
        .object(container)
        .map(|c| {
            c.contents()
                .iter()
                .copied()
                .filter(|id| world.object(*id).is_some_and(|o| o.is_substance()))
                .collect()
        })
        .unwrap_or_default()
}

fn react(world: &mut World, id: ObjectId) {
    let Some(parent) = world.object(id).and_then(|o| o.parent()) else {
        return;
    };
    if world.object(parent).map_or(true, |p| p.is_substance()) {
        return;
    }
    let reactants = substance_children(world, parent);
    if reactants.len() < 2 {
        return;
    }

    let product = match world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named(REACTION_PRODUCT_NAME)) {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to create reaction product in {}: {}", parent, e);
            return;
        }
    };

    for &reactant in &reactants {
        let inner = substance_children(world, reactant);
        if inner.is_empty() {
            move_into(world, product, reactant);
            continue;
        }
        // Flatten mixtures so the product holds plain ingredients
        for ingredient in inner {
            move_into(world, product, ingredient);
        }
        if world.object(reactant).is_some_and(|o| o.contents().is_empty()) {
            world.delete_object(reactant);
        } else {
            move_into(world, product, reactant);
        }
    }

    if let Err(e) = world.add_object(parent, product) {
        tracing::error!("Failed to place reaction product in {}: {}", parent, e);
        return;
    }
    tracing::debug!("Reaction in {}: {:?} -> {}", parent, reactants, product);
    world.push_event(SimulationEvent::Reacted { product, reactants });

    // Siblings may already have ticked this step
    world.tick_object(product);
    if let Some(obj) = world.object_mut(product) {
        obj.markers.reacted = true;
    }
}

fn move_into(world: &mut World, container: ObjectId, obj: ObjectId) {
    if let Err(e) = world.add_object(container, obj) {
        tracing::error!("Failed to move {} into {}: {}", obj, container, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn substance(world: &mut World, name: &str) -> ObjectId {
        world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named(name)).unwrap()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("water (3 measures)"), "water");
        assert_eq!(normalize_name("salt (1 measure)"), "salt");
        assert_eq!(normalize_name("sodium (chloride)"), "sodium (chloride)");
        assert_eq!(normalize_name("  vinegar "), "vinegar");
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(0, 4), 4);
        assert_eq!(gcd(6, 4), 2);
        assert_eq!(gcd(7, 3), 1);
    }

    #[test]
    fn test_pure_substance_identity() {
        let mut world = World::with_seed(1);
        let water = substance(&mut world, "water (2 measures)");
        let (name, mixture) = derive_identity(&world, water).unwrap();
        assert_eq!(name, "water (2 measures)");
        assert_eq!(mixture, vec![("water".to_string(), 1.0)]);
    }

    #[test]
    fn test_single_child_is_inherited() {
        let mut world = World::with_seed(1);
        let outer = substance(&mut world, "sludge");
        let inner = substance(&mut world, "vinegar");
        world.add_object(outer, inner).unwrap();

        let (name, mixture) = derive_identity(&world, outer).unwrap();
        assert_eq!(name, "vinegar");
        assert_eq!(mixture, vec![("vinegar".to_string(), 1.0)]);
    }

    #[test]
    fn test_mixture_is_sorted_by_frequency_and_reduced() {
        let mut world = World::with_seed(1);
        let mix = substance(&mut world, REACTION_PRODUCT_NAME);
        for name in ["A", "B", "B", "A", "B", "B"] {
            let s = substance(&mut world, name);
            world.add_object(mix, s).unwrap();
        }

        let (name, mixture) = derive_identity(&world, mix).unwrap();
        assert_eq!(name, "mixture (4 parts B, 2 parts A)");
        assert_eq!(mixture, vec![("B".to_string(), 2.0), ("A".to_string(), 1.0)]);
    }

    #[test]
    fn test_nested_mixtures_count_leaves() {
        let mut world = World::with_seed(1);
        let outer = substance(&mut world, REACTION_PRODUCT_NAME);
        let inner = substance(&mut world, REACTION_PRODUCT_NAME);
        for name in ["A", "B"] {
            let s = substance(&mut world, name);
            world.add_object(inner, s).unwrap();
        }
        let c = substance(&mut world, "C");
        world.add_object(outer, inner).unwrap();
        world.add_object(outer, c).unwrap();

        let (name, _) = derive_identity(&world, outer).unwrap();
        assert_eq!(name, "mixture (1 parts A, 1 parts B, 1 parts C)");
    }

    #[test]
    fn test_non_substance_has_no_identity() {
        let mut world = World::with_seed(1);
        let jar = world.spawn(kinds::JAR).unwrap();
        assert!(derive_identity(&world, jar).is_none());
    }

    #[test]
    fn test_reaction_gathers_siblings() {
        let mut world = World::with_seed(1);
        let jar = world.spawn(kinds::JAR).unwrap();
        let a = substance(&mut world, "A");
        let b = substance(&mut world, "B");
        world.add_object(jar, a).unwrap();
        world.add_object(jar, b).unwrap();

        tick(&mut world, a);

        let contents = world.object(jar).unwrap().contents().to_vec();
        assert_eq!(contents.len(), 1);
        let product = world.object(contents[0]).unwrap();
        assert_eq!(product.contents(), &[a, b]);
        assert!(product.markers.reacted);
        assert!(product.name.contains("1 parts A, 1 parts B"));
    }

    #[test]
    fn test_lone_substance_does_not_react() {
        let mut world = World::with_seed(1);
        let jar = world.spawn(kinds::JAR).unwrap();
        let a = substance(&mut world, "A");
        world.add_object(jar, a).unwrap();

        tick(&mut world, a);
        assert_eq!(world.object(jar).unwrap().contents(), &[a]);
    }

    #[test]
    fn test_reaction_flattens_existing_mixture() {
        let mut world = World::with_seed(1);
        let jar = world.spawn(kinds::JAR).unwrap();
        let old_mix = substance(&mut world, REACTION_PRODUCT_NAME);
        let a = substance(&mut world, "A");
        let b = substance(&mut world, "B");
        world.add_object(old_mix, a).unwrap();
        world.add_object(old_mix, b).unwrap();
        let c = substance(&mut world, "C");
        world.add_object(jar, old_mix).unwrap();
        world.add_object(jar, c).unwrap();

        tick(&mut world, c);

        assert!(!world.contains(old_mix));
        let contents = world.object(jar).unwrap().contents().to_vec();
        assert_eq!(contents.len(), 1);
        let product = world.object(contents[0]).unwrap();
        assert_eq!(product.contents(), &[a, b, c]);
    }
}
