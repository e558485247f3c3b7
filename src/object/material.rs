//! Material records and the material catalog
//!
//! Materials carry the physical properties that science instruments read:
//! radiation, pH, soil nutrients, spectral response and microscope text.
//! Catalogs are loaded from TOML files of `[[material]]` tables.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;

/// Physical properties attached to an object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: String,
    /// Radiation emitted, in microsieverts per hour
    pub radiation_usv_h: f64,
    pub ph: Option<f64>,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    /// Relative intensity per spectral band
    pub spectrum: Vec<f64>,
    /// What the material looks like under a microscope
    pub microscope_desc: Option<String>,
    /// Below this temperature a living thing made of this material dies
    pub living_min_temp_c: Option<f64>,
    /// Above this temperature a living thing made of this material dies
    pub living_max_temp_c: Option<f64>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// N + P + K
    pub fn nutrient_total(&self) -> f64 {
        self.nitrogen + self.phosphorus + self.potassium
    }

    /// Survivable temperature range, if the material defines one
    ///
    /// A missing bound is treated as unbounded on that side.
    pub fn living_range(&self) -> Option<(f64, f64)> {
        match (self.living_min_temp_c, self.living_max_temp_c) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(f64::NEG_INFINITY), max.unwrap_or(f64::INFINITY))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MaterialFile {
    #[serde(default)]
    material: Vec<Material>,
}

/// Catalog of named materials
#[derive(Debug, Clone, Default)]
pub struct MaterialIndex {
    materials: AHashMap<String, Material>,
}

impl MaterialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a material under its own name
    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Merge all `[[material]]` tables from a TOML document
    pub fn load_toml_str(&mut self, content: &str) -> Result<usize> {
        let file: MaterialFile = toml::from_str(content)?;
        let count = file.material.len();
        for material in file.material {
            self.insert(material);
        }
        Ok(count)
    }

    /// Merge all materials from a TOML file
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.load_toml_str(&content)
    }

    /// Look up several materials by name
    ///
    /// Unknown names are logged and skipped; scenario content is allowed to
    /// be incomplete.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Vec<Material> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let found = self.get(name).cloned();
                if found.is_none() {
                    tracing::warn!("Unknown material '{}' skipped", name);
                }
                found
            })
            .collect()
    }

    /// Built-in catalog covering the default object kinds
    pub fn with_defaults() -> Self {
        let mut index = Self::new();

        index.insert(Material {
            microscope_desc: Some("Mineral grains bound with decaying organic matter.".into()),
            nitrogen: 3.0,
            phosphorus: 3.0,
            potassium: 3.0,
            ..Material::named("loam")
        });
        index.insert(Material {
            microscope_desc: Some("Pale, dusty mineral grains with almost no organic matter.".into()),
            ..Material::named("depleted soil")
        });
        index.insert(Material {
            microscope_desc: Some("Compressed granules of nitrate and phosphate salts.".into()),
            nitrogen: 4.0,
            phosphorus: 3.0,
            potassium: 3.0,
            ..Material::named("fertilizer")
        });
        index.insert(Material {
            microscope_desc: Some("Cells with thick walls and green chloroplasts.".into()),
            living_min_temp_c: Some(0.0),
            living_max_temp_c: Some(45.0),
            ..Material::named("plant tissue")
        });
        index.insert(Material {
            microscope_desc: Some("A hard coat around a dormant embryo.".into()),
            living_min_temp_c: Some(-10.0),
            living_max_temp_c: Some(60.0),
            ..Material::named("seed coat")
        });
        index.insert(Material {
            microscope_desc: Some("Tangled threads of fungal hyphae.".into()),
            living_min_temp_c: Some(0.0),
            living_max_temp_c: Some(40.0),
            ..Material::named("fungal tissue")
        });
        index.insert(Material {
            ph: Some(7.0),
            spectrum: vec![0.1, 0.2, 0.9, 0.2, 0.1],
            ..Material::named("water")
        });
        index.insert(Material {
            ph: Some(2.5),
            spectrum: vec![0.3, 0.6, 0.4, 0.2, 0.1],
            ..Material::named("vinegar")
        });
        index.insert(Material {
            ph: Some(9.0),
            spectrum: vec![0.8, 0.3, 0.1, 0.1, 0.0],
            ..Material::named("baking soda")
        });
        index.insert(Material {
            ph: Some(7.0),
            spectrum: vec![0.5, 0.5, 0.5, 0.5, 0.5],
            microscope_desc: Some("Clear cubic crystals.".into()),
            ..Material::named("salt")
        });
        index.insert(Material {
            spectrum: vec![0.9, 0.9, 0.9, 0.9, 0.9],
            ..Material::named("glass")
        });
        index.insert(Material {
            microscope_desc: Some("Grey metal with flakes of orange oxide.".into()),
            ..Material::named("iron")
        });
        index.insert(Material {
            microscope_desc: Some("Long parallel fibres.".into()),
            ..Material::named("wood")
        });
        index.insert(Material {
            radiation_usv_h: 0.3,
            spectrum: vec![0.4, 0.4, 0.2, 0.1, 0.1],
            ..Material::named("granite")
        });
        index.insert(Material {
            radiation_usv_h: 250.0,
            spectrum: vec![0.1, 0.1, 0.3, 0.8, 0.6],
            microscope_desc: Some("Dark, dense crystals with a pitchy lustre.".into()),
            ..Material::named("uraninite")
        });
        index.insert(Material {
            radiation_usv_h: 0.1,
            microscope_desc: Some("Porous mineral lattice with tiny canals.".into()),
            ..Material::named("bone")
        });

        index
    }
}
