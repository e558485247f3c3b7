//! Typed attribute set shared by every world object
//!
//! The common physical flags are plain fields. Scenario-specific values that
//! the core never interprets live in the open `extra` map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A loosely typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// Physical flags and state of a world object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub is_movable: bool,
    pub is_passable: bool,
    pub is_container: bool,
    /// Whether the contents are currently reachable/visible
    pub is_open_container: bool,
    /// Whether agents may toggle `is_open_container`
    pub is_openable: bool,
    pub is_activatable: bool,
    pub is_activated: bool,
    pub is_living: bool,
    pub is_poisonous: bool,
    pub is_food: bool,
    pub is_cooked: bool,
    pub temperature_c: f64,
    /// Scenario-defined values the core stores but never interprets
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttrValue>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            is_movable: true,
            is_passable: true,
            is_container: false,
            is_open_container: false,
            is_openable: false,
            is_activatable: false,
            is_activated: false,
            is_living: false,
            is_poisonous: false,
            is_food: false,
            is_cooked: false,
            temperature_c: 20.0,
            extra: BTreeMap::new(),
        }
    }
}

impl Attributes {
    /// A container whose contents cannot currently be seen or reached
    pub fn is_closed_container(&self) -> bool {
        self.is_container && !self.is_open_container
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.extra.insert(key.into(), value.into());
    }
}
