//! Serializable world snapshots
//!
//! Snapshots are lossy: they carry identity, relationships as handle lists,
//! and plain attribute data, but no back-references or random state.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{GridPos, Layer, ObjectId, Step};
use crate::object::attributes::Attributes;
use crate::object::components::Components;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub kind: String,
    pub name: String,
    pub position: GridPos,
    /// Only set for objects placed directly on the grid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    pub contents: Vec<ObjectId>,
    pub parts: Vec<ObjectId>,
    pub display_state: String,
    pub attributes: Attributes,
    pub materials: Vec<String>,
    pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub step: Step,
    pub width: i32,
    pub height: i32,
    /// Sorted by handle
    pub objects: Vec<ObjectSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        let objects = world
            .object_ids()
            .into_iter()
            .filter_map(|id| world.object(id))
            .map(|obj| ObjectSnapshot {
                id: obj.id(),
                kind: obj.kind().to_string(),
                name: obj.name.clone(),
                position: obj.position(),
                layer: obj.placement().map(|p| p.layer),
                contents: obj.contents().to_vec(),
                parts: obj.parts().to_vec(),
                display_state: obj.display_state().to_string(),
                attributes: obj.attributes.clone(),
                materials: obj.materials.iter().map(|m| m.name.clone()).collect(),
                components: obj.components.clone(),
            })
            .collect();

        Self {
            step: world.step_count(),
            width: world.grid().width(),
            height: world.grid().height(),
            objects,
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
        self.objects
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.objects[i])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl World {
    /// Capture a serializable snapshot of every object
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::kinds;

    #[test]
    fn test_snapshot_carries_relationships_as_handles() {
        let mut world = World::with_seed(3);
        let jar = world.spawn(kinds::JAR).unwrap();
        let water = world
            .spawn_with(kinds::SUBSTANCE, &crate::world::SpawnArgs::named("water"))
            .unwrap();
        world.place(1, 2, Layer::Object, jar).unwrap();
        world.add_object(jar, water).unwrap();

        let snap = world.snapshot();
        let jar_snap = snap.object(jar).unwrap();
        assert_eq!(jar_snap.contents, vec![water]);
        assert_eq!(jar_snap.layer, Some(Layer::Object));

        let water_snap = snap.object(water).unwrap();
        assert_eq!(water_snap.layer, None);
        assert_eq!(water_snap.position, GridPos::new(1, 2));
        assert_eq!(water_snap.materials, vec!["water".to_string()]);
    }

    #[test]
    fn test_json_shape() {
        let mut world = World::with_seed(3);
        let key = world
            .spawn_with(
                kinds::KEY,
                &crate::world::SpawnArgs::new().with_recipe([("vinegar", 1.0)]),
            )
            .unwrap();
        world.place(0, 0, Layer::Object, key).unwrap();

        let json = world.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = &value["objects"][0];
        assert_eq!(obj["kind"], "key");
        assert_eq!(obj["attributes"]["isMovable"], true);
        assert_eq!(obj["components"]["rust"]["level"], 3);
        assert!(obj.get("parent").is_none());

        let back = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(back.objects.len(), 1);
    }
}
