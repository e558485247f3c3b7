//! Capability components
//!
//! An object's behavior is determined by which of these components it
//! carries, not by its kind tag. Factories compose them; the tick dispatcher
//! runs the behavior for every component present.

use serde::{Deserialize, Serialize};

use crate::behaviors::substance::normalize_name;

/// Heaviest rust level a key can carry
pub const RUST_LEVEL_MAX: u8 = 3;

/// Sentinel for a seed whose countdown has not started
pub const SPROUT_TIME_UNSET: i32 = -1;

/// A chemical substance whose identity is derived from its contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceState {
    /// Name used when the substance holds no other substances
    pub base_name: String,
    /// Normalized name -> proportion, in canonical order
    pub mixture: Vec<(String, f64)>,
}

impl SubstanceState {
    pub fn pure(name: impl Into<String>) -> Self {
        let base_name = name.into();
        Self {
            mixture: vec![(normalize_name(&base_name), 1.0)],
            base_name,
        }
    }

    /// Whether this substance is a blend of more than one ingredient
    pub fn is_mixture(&self) -> bool {
        self.mixture.len() > 1
    }
}

/// Growth stage derived from a seed's countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStage {
    /// Countdown never started
    Dormant,
    Counting(i32),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedState {
    pub sprout_time: i32,
    /// Kind tag of the plant this seed turns into
    pub plant_kind: String,
}

impl SeedState {
    pub fn new(plant_kind: impl Into<String>) -> Self {
        Self {
            sprout_time: SPROUT_TIME_UNSET,
            plant_kind: plant_kind.into(),
        }
    }

    pub fn stage(&self) -> GrowthStage {
        match self.sprout_time {
            t if t < 0 => GrowthStage::Dormant,
            0 => GrowthStage::Ready,
            t => GrowthStage::Counting(t),
        }
    }
}

/// Rust on a key, removable with the right cleaning mixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RustState {
    /// 0 = clean, `RUST_LEVEL_MAX` = heavily rusted
    pub level: u8,
    /// Ingredient name -> proportion of the mixture that removes the rust
    pub recipe: Vec<(String, f64)>,
    /// Similarity of the most recent evaluation
    pub last_similarity: Option<f64>,
}

impl RustState {
    pub fn new(recipe: Vec<(String, f64)>) -> Self {
        Self {
            level: RUST_LEVEL_MAX,
            recipe,
            last_similarity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilState {
    /// An open excavation; seeds in holed soil do not grow
    pub has_hole: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalMode {
    Heat,
    Cool,
}

/// Moves the temperature of its contents toward a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalSource {
    pub mode: ThermalMode,
    pub target_c: f64,
    pub max_delta_c: f64,
}

/// Keeps a minimum count of one content kind, refilling one item at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFill {
    pub item_kind: String,
    pub target_count: usize,
    pub cooldown_ticks: u32,
    pub cooldown_remaining: u32,
    /// Set after the first tick's immediate fill
    pub primed: bool,
}

impl AutoFill {
    pub fn new(item_kind: impl Into<String>, target_count: usize, cooldown_ticks: u32) -> Self {
        Self {
            item_kind: item_kind.into(),
            target_count,
            cooldown_ticks,
            cooldown_remaining: 0,
            primed: false,
        }
    }
}

/// What an object does when used on something else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Tool {
    Shovel,
    RadiationMeter,
    PhMeter,
    NutrientMeter,
    Spectrometer,
    Microscope,
    SubstanceDispenser { substance: String },
}

/// All capability components an object may carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance: Option<SubstanceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil: Option<SoilState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fill: Option<AutoFill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<Tool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_stages() {
        let mut seed = SeedState::new("plant");
        assert_eq!(seed.stage(), GrowthStage::Dormant);
        seed.sprout_time = 4;
        assert_eq!(seed.stage(), GrowthStage::Counting(4));
        seed.sprout_time = 0;
        assert_eq!(seed.stage(), GrowthStage::Ready);
    }

    #[test]
    fn test_pure_substance_mixture() {
        let water = SubstanceState::pure("water");
        assert_eq!(water.mixture, vec![("water".to_string(), 1.0)]);
        assert!(!water.is_mixture());
    }

    #[test]
    fn test_measured_substance_keys_by_plain_name() {
        let water = SubstanceState::pure("water (2 measures)");
        assert_eq!(water.base_name, "water (2 measures)");
        assert_eq!(water.mixture, vec![("water".to_string(), 1.0)]);
    }

    #[test]
    fn test_tool_serializes_with_tag() {
        let json = serde_json::to_value(Tool::SubstanceDispenser {
            substance: "water".into(),
        })
        .unwrap();
        assert_eq!(json["tool"], "substance_dispenser");
        assert_eq!(json["substance"], "water");
    }
}
