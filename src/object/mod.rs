//! World objects: attributes, materials and capability components

pub mod attributes;
pub mod components;
pub mod entity;
pub mod kinds;
pub mod material;

pub use attributes::{AttrValue, Attributes};
pub use components::{
    AutoFill, Components, GrowthStage, RustState, SeedState, SoilState, SubstanceState,
    ThermalMode, ThermalSource, Tool, RUST_LEVEL_MAX, SPROUT_TIME_UNSET,
};
pub use entity::{DisplayCache, Placement, TickMarkers, WorldObject};
pub use material::{Material, MaterialIndex};
