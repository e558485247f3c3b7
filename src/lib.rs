//! Discovery World - tick-driven object simulation for discovery tasks

pub mod actions;
pub mod behaviors;
pub mod core;
pub mod object;
pub mod simulation;
pub mod world;
