//! Error types
//!
//! Nothing in the simulation is fatal. Every variant is turned into a
//! fallback, a default or a transient notification by its caller.

use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    /// A schedule needs at least two waypoints
    #[error("schedule has {count} waypoint(s), at least 2 required")]
    ScheduleTooShort { count: usize },

    #[error("unknown recipe \"{0}\"")]
    InvalidRecipe(String),

    #[error("not enough {item}: need {needed}, have {have}")]
    InsufficientMaterials { item: String, needed: u32, have: u32 },

    #[error("no room for {0} in inventory")]
    InventoryFull(String),

    #[error("block \"{0}\" not found")]
    UnknownBlock(String),

    #[error("a block already exists at ({x}, {y})")]
    TileOccupied { x: f32, y: f32 },

    /// Save data could not be parsed at all
    #[error("save data is not valid JSON: {0}")]
    SaveFormat(#[from] serde_json::Error),

    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
