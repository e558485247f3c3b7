//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique handle for a world object
///
/// Assigned by the world at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation step counter
pub type Step = u64;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Render/query layer of a grid cell
///
/// Several layers can be occupied in the same cell at once. Layers only
/// affect ordering and which layer a query targets, never containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Layer {
    World = 0,
    Building = 1,
    Furniture = 2,
    Object = 3,
    Air = 4,
    Agent = 5,
}

impl Layer {
    pub const COUNT: usize = 6;

    /// All layers, bottom to top
    pub const ALL: [Layer; Layer::COUNT] = [
        Layer::World,
        Layer::Building,
        Layer::Furniture,
        Layer::Object,
        Layer::Air,
        Layer::Agent,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_ordering() {
        assert!(ObjectId(1) < ObjectId(2));
        assert_eq!(ObjectId(7).to_string(), "#7");
    }

    #[test]
    fn test_layer_indices_are_dense() {
        for (i, layer) in Layer::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
    }

    #[test]
    fn test_object_id_serializes_as_integer() {
        let json = serde_json::to_string(&ObjectId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
