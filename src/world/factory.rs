//! Object factory keyed by kind tag
//!
//! Builders populate a freshly allocated object with attributes, materials
//! and capability components. Scenario code registers its own kinds (or
//! replaces the defaults) without touching the core.

use ahash::AHashMap;
use rand::Rng;
use std::collections::BTreeMap;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::object::attributes::AttrValue;
use crate::object::components::{AutoFill, RustState, SeedState, SoilState, SubstanceState};
use crate::object::components::{ThermalMode, ThermalSource, Tool};
use crate::object::entity::WorldObject;
use crate::object::kinds;
use crate::object::material::{Material, MaterialIndex};

/// Read-only world services available to builders
pub struct BuildContext<'a> {
    pub config: &'a SimulationConfig,
    pub materials: &'a MaterialIndex,
}

/// Kind-specific creation arguments
///
/// `name`, `materials`, `inline_materials` and `attrs` are applied generically
/// after the builder runs; builders may also read them to derive state.
#[derive(Debug, Clone, Default)]
pub struct SpawnArgs {
    pub name: Option<String>,
    /// Material names resolved against the world's material index
    pub materials: Vec<String>,
    pub inline_materials: Vec<Material>,
    /// Ingredient proportions (rust removal recipe for keys)
    pub recipe: Vec<(String, f64)>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl SpawnArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_material(mut self, name: impl Into<String>) -> Self {
        self.materials.push(name.into());
        self
    }

    pub fn with_inline_material(mut self, material: Material) -> Self {
        self.inline_materials.push(material);
        self
    }

    pub fn with_recipe<S: Into<String>>(mut self, recipe: impl IntoIterator<Item = (S, f64)>) -> Self {
        self.recipe = recipe.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.attrs.get(key).and_then(AttrValue::as_number)
    }

    fn has_materials(&self) -> bool {
        !self.materials.is_empty() || !self.inline_materials.is_empty()
    }
}

pub type Builder = Box<dyn Fn(&mut WorldObject, &SpawnArgs, &BuildContext) + Send + Sync>;

/// Registry of builders by kind tag
pub struct ObjectFactory {
    builders: AHashMap<String, Builder>,
}

impl ObjectFactory {
    /// Factory with no kinds registered
    pub fn new() -> Self {
        Self {
            builders: AHashMap::new(),
        }
    }

    /// Register (or replace) the builder for a kind
    pub fn register<F>(&mut self, kind: impl Into<String>, builder: F)
    where
        F: Fn(&mut WorldObject, &SpawnArgs, &BuildContext) + Send + Sync + 'static,
    {
        self.builders.insert(kind.into(), Box::new(builder));
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub(crate) fn build(
        &self,
        obj: &mut WorldObject,
        args: &SpawnArgs,
        ctx: &BuildContext,
    ) -> Result<()> {
        let builder = self
            .builders
            .get(obj.kind())
            .ok_or_else(|| SimError::UnknownKind(obj.kind().to_string()))?;
        builder(obj, args, ctx);
        Ok(())
    }

    /// Factory with every built-in kind registered
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        register_defaults(&mut factory);
        factory
    }
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn attach_default_materials(obj: &mut WorldObject, args: &SpawnArgs, ctx: &BuildContext, names: &[&str]) {
    if !args.has_materials() {
        obj.materials.extend(ctx.materials.resolve(names));
    }
}

fn make_container(obj: &mut WorldObject, open: bool, openable: bool) {
    obj.attributes.is_container = true;
    obj.attributes.is_open_container = open;
    obj.attributes.is_openable = openable;
}

/// Roll the poison flag with the object's own random stream
fn roll_poison(obj: &mut WorldObject, args: &SpawnArgs) {
    let chance = args.number("poison_chance").unwrap_or(0.0).clamp(0.0, 1.0);
    if chance > 0.0 {
        obj.attributes.is_poisonous = obj.rng_mut().gen_bool(chance);
    }
}

fn register_defaults(factory: &mut ObjectFactory) {
    factory.register(kinds::SOIL, |obj, _args, _ctx| {
        obj.attributes.is_movable = false;
        make_container(obj, true, false);
        obj.components.soil = Some(SoilState::default());
    });

    factory.register(kinds::DIRT, |obj, args, ctx| {
        attach_default_materials(obj, args, ctx, &["loam"]);
    });

    factory.register(kinds::SEED, |obj, args, ctx| {
        let plant_kind = args.text("plant_kind").unwrap_or(kinds::PLANT);
        obj.components.seed = Some(SeedState::new(plant_kind));
        obj.attributes.is_living = true;
        attach_default_materials(obj, args, ctx, &["seed coat"]);
    });

    factory.register(kinds::PLANT, |obj, args, ctx| {
        obj.attributes.is_living = true;
        obj.attributes.is_food = true;
        obj.attributes.is_movable = false;
        roll_poison(obj, args);
        attach_default_materials(obj, args, ctx, &["plant tissue"]);
    });

    factory.register(kinds::MUSHROOM, |obj, args, ctx| {
        obj.attributes.is_living = true;
        obj.attributes.is_food = true;
        roll_poison(obj, args);
        attach_default_materials(obj, args, ctx, &["fungal tissue"]);
    });

    factory.register(kinds::SUBSTANCE, |obj, args, ctx| {
        let base = args.name.clone().unwrap_or_else(|| kinds::SUBSTANCE.to_string());
        if !args.has_materials() {
            // Pure substances named after a catalog entry pick it up silently
            if let Some(material) = ctx.materials.get(&base) {
                obj.materials.push(material.clone());
            }
        }
        obj.name = base.clone();
        make_container(obj, true, false);
        obj.components.substance = Some(SubstanceState::pure(base));
    });

    factory.register(kinds::JAR, |obj, args, ctx| {
        make_container(obj, true, false);
        attach_default_materials(obj, args, ctx, &["glass"]);
    });

    factory.register(kinds::CHEST, |obj, args, ctx| {
        obj.attributes.is_movable = false;
        make_container(obj, false, true);
        attach_default_materials(obj, args, ctx, &["wood"]);
    });

    factory.register(kinds::DOOR, |obj, args, ctx| {
        obj.attributes.is_movable = false;
        obj.attributes.is_passable = false;
        obj.attributes.is_openable = true;
        obj.attributes.is_open_container = false;
        attach_default_materials(obj, args, ctx, &["wood"]);
    });

    factory.register(kinds::KEY, |obj, args, ctx| {
        if !args.recipe.is_empty() {
            let rust = RustState::new(args.recipe.clone());
            obj.name = crate::behaviors::rust::rust_name(rust.level).to_string();
            obj.components.rust = Some(rust);
        }
        attach_default_materials(obj, args, ctx, &["iron"]);
    });

    factory.register(kinds::STOVE, |obj, args, ctx| {
        obj.attributes.is_movable = false;
        obj.attributes.is_activatable = true;
        make_container(obj, true, false);
        obj.components.thermal = Some(ThermalSource {
            mode: ThermalMode::Heat,
            target_c: args.number("target_c").unwrap_or(ctx.config.stove_target_c),
            max_delta_c: args.number("max_delta_c").unwrap_or(ctx.config.stove_max_delta_c),
        });
        attach_default_materials(obj, args, ctx, &["iron"]);
    });

    factory.register(kinds::FRIDGE, |obj, args, ctx| {
        obj.attributes.is_movable = false;
        obj.attributes.is_activatable = true;
        obj.attributes.is_activated = true;
        make_container(obj, false, true);
        obj.components.thermal = Some(ThermalSource {
            mode: ThermalMode::Cool,
            target_c: args.number("target_c").unwrap_or(ctx.config.fridge_target_c),
            max_delta_c: args.number("max_delta_c").unwrap_or(ctx.config.fridge_max_delta_c),
        });
    });

    factory.register(kinds::FOOD, |obj, _args, _ctx| {
        obj.attributes.is_food = true;
    });

    factory.register(kinds::FERTILIZER_BAG, |obj, _args, ctx| {
        make_container(obj, true, false);
        obj.components.auto_fill = Some(AutoFill::new(
            kinds::FERTILIZER_PELLET,
            ctx.config.dispenser_target_count,
            ctx.config.dispenser_cooldown_ticks,
        ));
    });

    factory.register(kinds::FERTILIZER_PELLET, |obj, args, ctx| {
        attach_default_materials(obj, args, ctx, &["fertilizer"]);
    });

    factory.register(kinds::SHOVEL, |obj, args, ctx| {
        obj.components.tool = Some(Tool::Shovel);
        attach_default_materials(obj, args, ctx, &["iron", "wood"]);
    });

    factory.register(kinds::RADIATION_METER, |obj, _args, _ctx| {
        obj.components.tool = Some(Tool::RadiationMeter);
    });

    factory.register(kinds::PH_METER, |obj, _args, _ctx| {
        obj.name = "pH meter".to_string();
        obj.components.tool = Some(Tool::PhMeter);
    });

    factory.register(kinds::NUTRIENT_METER, |obj, _args, _ctx| {
        obj.name = "soil nutrient meter".to_string();
        obj.components.tool = Some(Tool::NutrientMeter);
    });

    factory.register(kinds::SPECTROMETER, |obj, _args, _ctx| {
        obj.components.tool = Some(Tool::Spectrometer);
    });

    factory.register(kinds::MICROSCOPE, |obj, _args, _ctx| {
        obj.components.tool = Some(Tool::Microscope);
    });

    factory.register(kinds::SUBSTANCE_DISPENSER, |obj, args, _ctx| {
        let substance = args.text("substance").unwrap_or("water").to_string();
        obj.name = format!("{} dispenser", substance);
        obj.attributes.is_movable = false;
        obj.components.tool = Some(Tool::SubstanceDispenser { substance });
    });

    factory.register(kinds::ROCK, |obj, args, ctx| {
        attach_default_materials(obj, args, ctx, &["granite"]);
    });

    factory.register(kinds::AGENT, |obj, _args, _ctx| {
        obj.attributes.is_movable = false;
        obj.attributes.is_passable = false;
        obj.attributes.is_living = true;
        make_container(obj, true, false);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ObjectId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build(factory: &ObjectFactory, kind: &str, args: &SpawnArgs) -> Result<WorldObject> {
        let config = SimulationConfig::default();
        let materials = MaterialIndex::with_defaults();
        let ctx = BuildContext {
            config: &config,
            materials: &materials,
        };
        let mut obj = WorldObject::new(ObjectId(1), kind, ChaCha8Rng::seed_from_u64(3));
        factory.build(&mut obj, args, &ctx)?;
        Ok(obj)
    }

    #[test]
    fn test_unknown_kind() {
        let factory = ObjectFactory::with_defaults();
        let result = build(&factory, "flux_capacitor", &SpawnArgs::new());
        assert!(matches!(result, Err(SimError::UnknownKind(k)) if k == "flux_capacitor"));
    }

    #[test]
    fn test_substance_builder_uses_name_and_catalog_material() {
        let factory = ObjectFactory::with_defaults();
        let obj = build(&factory, kinds::SUBSTANCE, &SpawnArgs::named("vinegar")).unwrap();
        assert_eq!(obj.name, "vinegar");
        assert_eq!(obj.components.substance.as_ref().unwrap().base_name, "vinegar");
        assert_eq!(obj.materials[0].ph, Some(2.5));
    }

    #[test]
    fn test_key_without_recipe_is_clean() {
        let factory = ObjectFactory::with_defaults();
        let plain = build(&factory, kinds::KEY, &SpawnArgs::new()).unwrap();
        assert!(plain.components.rust.is_none());

        let rusty = build(
            &factory,
            kinds::KEY,
            &SpawnArgs::new().with_recipe([("vinegar", 1.0), ("salt", 2.0)]),
        )
        .unwrap();
        assert_eq!(rusty.name, "heavily rusted key");
        assert_eq!(rusty.components.rust.as_ref().unwrap().recipe.len(), 2);
    }

    #[test]
    fn test_explicit_materials_replace_defaults() {
        let factory = ObjectFactory::with_defaults();
        let dirt = build(&factory, kinds::DIRT, &SpawnArgs::new().with_material("depleted soil")).unwrap();
        // Generic args are applied by the world, the builder only skips its defaults
        assert!(dirt.materials.is_empty());

        let default_dirt = build(&factory, kinds::DIRT, &SpawnArgs::new()).unwrap();
        assert_eq!(default_dirt.materials[0].name, "loam");
    }

    #[test]
    fn test_custom_kind_registration() {
        let mut factory = ObjectFactory::new();
        factory.register("amphora", |obj, _args, _ctx| {
            obj.attributes.is_container = true;
            obj.attributes.set("dateBP", 2500.0);
        });
        assert!(factory.has_kind("amphora"));
        assert_eq!(factory.kinds(), vec!["amphora"]);

        let obj = build(&factory, "amphora", &SpawnArgs::new()).unwrap();
        assert!(obj.attributes.is_container);
        assert_eq!(obj.attributes.get("dateBP").and_then(AttrValue::as_number), Some(2500.0));
    }

    #[test]
    fn test_poison_roll_is_certain_at_one() {
        let factory = ObjectFactory::with_defaults();
        let args = SpawnArgs::new().with_attr("poison_chance", 1.0);
        let mushroom = build(&factory, kinds::MUSHROOM, &args).unwrap();
        assert!(mushroom.attributes.is_poisonous);

        let safe = build(&factory, kinds::MUSHROOM, &SpawnArgs::new()).unwrap();
        assert!(!safe.attributes.is_poisonous);
    }
}
