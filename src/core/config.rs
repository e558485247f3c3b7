//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Configuration for the simulation systems
///
/// Scenario hosts may override any field from a TOML file; missing fields
/// fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === WORLD ===
    /// Grid width in cells
    pub grid_width: i32,

    /// Grid height in cells
    pub grid_height: i32,

    /// Seed for the world random source
    ///
    /// Every object draws its own stream from the world source at creation,
    /// so two runs with the same seed and the same sequence of API calls
    /// produce identical worlds tick over tick.
    pub seed: u64,

    // === PLANT GROWTH ===
    /// Lower bound (inclusive) of the randomized sprout countdown
    pub sprout_time_min: i32,

    /// Upper bound (inclusive) of the randomized sprout countdown
    ///
    /// With perfect soil a seed sprouts after exactly this many qualifying
    /// ticks at most; poorer soil stretches it out stochastically.
    pub sprout_time_max: i32,

    /// Nutrient sum (N + P + K) that counts as ideal soil
    ///
    /// Soil quality is `sum / nominal_max`, clamped to [0, 1], and is used
    /// directly as the per-tick probability that a countdown advances.
    pub nutrient_nominal_max: f64,

    // === TEMPERATURE ===
    /// Starting temperature of newly created objects (°C)
    pub ambient_temperature_c: f64,

    /// Temperature at or above which food counts as cooked (°C)
    pub cooking_temperature_c: f64,

    /// Target temperature of a stove (°C)
    pub stove_target_c: f64,

    /// Maximum temperature change a stove applies per tick (°C)
    pub stove_max_delta_c: f64,

    /// Target temperature of a fridge (°C)
    pub fridge_target_c: f64,

    /// Maximum temperature change a fridge applies per tick (°C)
    pub fridge_max_delta_c: f64,

    // === RUST REMOVAL ===
    /// Cosine similarity at or above which rust is fully removed
    pub rust_clean_threshold: f64,

    /// Similarity at or above which rust drops to the lightest level
    pub rust_light_threshold: f64,

    /// Similarity at or above which rust drops to the medium level
    ///
    /// Below this the key keeps its heaviest rust level.
    pub rust_medium_threshold: f64,

    // === DISPENSERS ===
    /// Ticks between refills of an auto-replenishing container
    pub dispenser_cooldown_ticks: u32,

    /// Minimum number of items an auto-replenishing container keeps
    pub dispenser_target_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 32,
            seed: 12345,

            sprout_time_min: 5,
            sprout_time_max: 10,
            nutrient_nominal_max: 30.0,

            ambient_temperature_c: 20.0,
            cooking_temperature_c: 100.0,
            stove_target_c: 150.0,
            stove_max_delta_c: 10.0,
            fridge_target_c: 4.0,
            fridge_max_delta_c: 2.0,

            rust_clean_threshold: 0.99,
            rust_light_threshold: 0.66,
            rust_medium_threshold: 0.33,

            dispenser_cooldown_ticks: 10,
            dispenser_target_count: 3,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, validating the result
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(SimError::Config(format!(
                "grid must have positive size, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        if self.sprout_time_min < 1 || self.sprout_time_min > self.sprout_time_max {
            return Err(SimError::Config(format!(
                "sprout time range [{}, {}] must be non-empty and start at 1 or more",
                self.sprout_time_min, self.sprout_time_max
            )));
        }

        if !self.nutrient_nominal_max.is_finite() || self.nutrient_nominal_max <= 0.0 {
            return Err(SimError::Config("nutrient_nominal_max must be positive".into()));
        }

        // Thresholds must form descending bands
        if !(self.rust_clean_threshold > self.rust_light_threshold
            && self.rust_light_threshold > self.rust_medium_threshold)
        {
            return Err(SimError::Config(format!(
                "rust thresholds must be strictly descending: {} > {} > {}",
                self.rust_clean_threshold, self.rust_light_threshold, self.rust_medium_threshold
            )));
        }

        if self.stove_max_delta_c <= 0.0 || self.fridge_max_delta_c <= 0.0 {
            return Err(SimError::Config("thermal step sizes must be positive".into()));
        }

        Ok(())
    }
}
