use thiserror::Error;

use crate::core::types::ObjectId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("No factory registered for kind: {0}")]
    UnknownKind(String),

    #[error("Position ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Cannot put {object} inside {container}: it would contain itself")]
    ContainmentCycle {
        container: ObjectId,
        object: ObjectId,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
