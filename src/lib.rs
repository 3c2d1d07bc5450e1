//! Meadow - real-time simulation core for a tile-based exploration game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (camera, placement, collision, schedules, day/night)
//! - `renderer`: Backend-agnostic frame description (draw list, lighting passes)
//! - `inventory`, `crafting`: Slot model, item table and atomic recipes
//! - `platform`: Input event accumulation
//! - `persistence`: Versioned save record with tolerant restore
//! - `settings`: Data-driven tuning

pub mod crafting;
pub mod error;
pub mod inventory;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::SimConfig;

/// Game configuration constants
pub mod consts {
    /// Rate the original content was authored at (waits, legacy speeds)
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Largest frame delta fed into a tick, in seconds
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Render surface size in pixels
    pub const VIEW_W: f32 = 960.0;
    pub const VIEW_H: f32 = 540.0;
    /// World grid cell size
    pub const TILE_SIZE: f32 = 16.0;

    /// Zoom defaults
    pub const ZOOM_DEFAULT: f32 = 2.25;
    pub const ZOOM_MIN: f32 = 1.0;
    pub const ZOOM_MAX: f32 = 4.0;
    pub const ZOOM_STEP: f32 = 0.1;
    /// Camera easing per 60 Hz frame
    pub const CAM_EASE: f32 = 0.1;

    /// Player defaults (speed in px/s)
    pub const PLAYER_SPEED: f32 = 66.0;
    pub const PLAYER_SIZE: f32 = 8.0;

    /// NPC defaults
    pub const NPC_SIZE: f32 = 16.0;
    pub const NPC_SPEED: f32 = 60.0;
    pub const NPC_INTERACTION_RANGE: f32 = 60.0;
    pub const NPC_PAUSE_SECS: f32 = 5.0;

    /// Dropped items within this distance of the player are picked up
    pub const PICKUP_RANGE: f32 = 16.0;
    /// Seconds before an item the player dropped can be picked up again
    pub const DROP_PICKUP_DELAY: f32 = 1.5;

    /// Authored speeds at or below this are legacy px/frame values
    pub const LEGACY_SPEED_MAX: f32 = 5.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Convert a duration authored in 60 Hz ticks to seconds
#[inline]
pub fn ticks_to_secs(ticks: u32) -> f32 {
    ticks as f32 / consts::TICKS_PER_SECOND
}

/// Normalize an authored speed to px/s. Legacy px/frame values are scaled
/// up; unusable values become `fallback`.
pub fn upgrade_speed(speed: f32, fallback: f32) -> f32 {
    if !speed.is_finite() || speed <= 0.0 {
        fallback
    } else if speed <= consts::LEGACY_SPEED_MAX {
        speed * consts::TICKS_PER_SECOND
    } else {
        speed
    }
}
