//! Discovery World - headless driver
//!
//! Builds a small demo bench (garden plot, chemistry jar, stove and a
//! fertilizer bag), runs a number of steps and logs what happened.

use std::path::PathBuf;

use clap::Parser;
use discovery_world::actions;
use discovery_world::core::config::SimulationConfig;
use discovery_world::core::error::Result;
use discovery_world::core::types::Layer;
use discovery_world::object::kinds;
use discovery_world::simulation::tick::run_simulation_tick;
use discovery_world::world::{SpawnArgs, World};

/// Headless Discovery World runner
#[derive(Parser, Debug)]
#[command(name = "discovery-world")]
#[command(about = "Run the demo discovery bench for a number of steps")]
struct Args {
    /// Number of steps to simulate
    #[arg(long, default_value_t = 50)]
    steps: u64,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final world snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("discovery_world=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    tracing::info!("Discovery World starting (seed {})", config.seed);
    let mut world = World::new(config)?;
    build_demo_bench(&mut world)?;

    for _ in 0..args.steps {
        for event in run_simulation_tick(&mut world) {
            tracing::info!("step {}: {:?}", world.step_count(), event);
        }
    }

    tracing::info!(
        "Finished {} steps with {} objects",
        world.step_count(),
        world.len()
    );

    if args.snapshot {
        println!("{}", world.snapshot().to_json()?);
    }
    Ok(())
}

fn build_demo_bench(world: &mut World) -> Result<()> {
    // Garden plot: soil with dirt and a seed
    let soil = world.spawn(kinds::SOIL)?;
    let dirt = world.spawn(kinds::DIRT)?;
    let seed = world.spawn_with(
        kinds::SEED,
        &SpawnArgs::new().with_attr("poison_chance", 0.25),
    )?;
    world.place(2, 2, Layer::World, soil)?;
    world.add_object(soil, dirt)?;
    world.add_object(soil, seed)?;

    // Chemistry: a rusted key in a jar, with vinegar and salt about to react
    let jar = world.spawn(kinds::JAR)?;
    let key = world.spawn_with(
        kinds::KEY,
        &SpawnArgs::new().with_recipe([("vinegar", 1.0), ("salt", 1.0)]),
    )?;
    world.place(5, 2, Layer::Object, jar)?;
    world.add_object(jar, key)?;
    for name in ["vinegar", "salt"] {
        let substance = world.spawn_with(kinds::SUBSTANCE, &SpawnArgs::named(name))?;
        world.add_object(jar, substance)?;
    }

    // Kitchen: a stove with food on it
    let stove = world.spawn(kinds::STOVE)?;
    let food = world.spawn(kinds::FOOD)?;
    world.place(8, 2, Layer::Furniture, stove)?;
    world.add_object(stove, food)?;
    let result = actions::activate(world, stove);
    tracing::info!("{}", result.message);

    // Fertilizer bag that keeps itself stocked
    let bag = world.spawn(kinds::FERTILIZER_BAG)?;
    world.place(3, 2, Layer::Object, bag)?;

    Ok(())
}
