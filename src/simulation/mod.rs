//! Step scheduling over the world object graph

pub mod tick;

pub use tick::{run_simulation_tick, run_steps, SimulationEvent};
