//! Kind tags understood by the default factory

pub const SOIL: &str = "soil";
pub const DIRT: &str = "dirt";
pub const SEED: &str = "seed";
pub const PLANT: &str = "plant";
pub const MUSHROOM: &str = "mushroom";
pub const SUBSTANCE: &str = "substance";
pub const JAR: &str = "jar";
pub const CHEST: &str = "chest";
pub const DOOR: &str = "door";
pub const KEY: &str = "key";
pub const STOVE: &str = "stove";
pub const FRIDGE: &str = "fridge";
pub const FOOD: &str = "food";
pub const FERTILIZER_BAG: &str = "fertilizer_bag";
pub const FERTILIZER_PELLET: &str = "fertilizer_pellet";
pub const SHOVEL: &str = "shovel";
pub const RADIATION_METER: &str = "radiation_meter";
pub const PH_METER: &str = "ph_meter";
pub const NUTRIENT_METER: &str = "nutrient_meter";
pub const SPECTROMETER: &str = "spectrometer";
pub const MICROSCOPE: &str = "microscope";
pub const SUBSTANCE_DISPENSER: &str = "substance_dispenser";
pub const ROCK: &str = "rock";
pub const AGENT: &str = "agent";
