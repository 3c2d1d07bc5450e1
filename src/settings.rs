//! Simulation tuning
//!
//! Loaded from a JSON file next to the save; every field falls back to its
//! default when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tuning values for world generation, camera, and the day/night cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World seed (placement, wandering, starfield)
    pub seed: u64,

    // === World ===
    /// World width in pixels (the ground image size)
    pub world_width: f32,
    /// World height in pixels
    pub world_height: f32,
    pub tile_size: f32,
    /// Render surface size in pixels
    pub view_width: f32,
    pub view_height: f32,

    // === Placement ===
    /// Number of trees to try to place
    pub tree_count: usize,
    /// Random tile picks before giving up
    pub placement_attempts: u32,
    /// Spawn exclusion radius in tiles
    pub spawn_exclusion_tiles: u32,

    // === Player ===
    /// Player speed in px/s
    pub player_speed: f32,
    pub player_size: f32,

    // === Camera ===
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Multiplicative zoom step
    pub zoom_step: f32,
    /// Camera easing per 60 Hz frame (0..1)
    pub cam_ease: f32,

    // === Day/night ===
    /// Seconds per full day
    pub day_length_secs: f32,
    /// Starting time of day (0 = midnight)
    pub initial_time: f32,
    /// Day fraction at which daylight begins
    pub sunrise: f32,
    /// Day fraction at which daylight ends
    pub sunset: f32,
    /// Half-width of the golden hour band (day fraction)
    pub warm_band: f32,
    pub star_count: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_cafe,

            world_width: 73.0 * TILE_SIZE,
            world_height: 55.0 * TILE_SIZE,
            tile_size: TILE_SIZE,
            view_width: VIEW_W,
            view_height: VIEW_H,

            tree_count: 60,
            placement_attempts: 5000,
            spawn_exclusion_tiles: 4,

            player_speed: PLAYER_SPEED,
            player_size: PLAYER_SIZE,

            zoom: ZOOM_DEFAULT,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            cam_ease: CAM_EASE,

            day_length_secs: 1200.0,
            initial_time: 0.5,
            sunrise: 0.25,
            sunset: 0.75,
            warm_band: 0.06,
            star_count: 240,
        }
    }
}

impl SimConfig {
    /// Repair values that would break an invariant, logging each fix
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(self.tile_size > 0.0) {
            log::warn!("tile_size {} invalid, using {}", self.tile_size, defaults.tile_size);
            self.tile_size = defaults.tile_size;
        }
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            log::warn!("world size invalid, using defaults");
            self.world_width = defaults.world_width;
            self.world_height = defaults.world_height;
        }
        if !(self.view_width > 0.0 && self.view_height > 0.0) {
            self.view_width = defaults.view_width;
            self.view_height = defaults.view_height;
        }
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            log::warn!("zoom range [{}, {}] invalid, using defaults", self.zoom_min, self.zoom_max);
            self.zoom_min = defaults.zoom_min;
            self.zoom_max = defaults.zoom_max;
        }
        self.zoom = self.zoom.clamp(self.zoom_min, self.zoom_max);
        if !(self.zoom_step > 0.0) {
            self.zoom_step = defaults.zoom_step;
        }
        self.cam_ease = self.cam_ease.clamp(0.0, 1.0);
        if !(self.day_length_secs > 0.0) {
            log::warn!("day_length_secs {} invalid, using {}", self.day_length_secs, defaults.day_length_secs);
            self.day_length_secs = defaults.day_length_secs;
        }
        if !(0.0 <= self.sunrise && self.sunrise < self.sunset && self.sunset <= 1.0) {
            log::warn!("daylight window [{}, {}] invalid, using defaults", self.sunrise, self.sunset);
            self.sunrise = defaults.sunrise;
            self.sunset = defaults.sunset;
        }
        if !(self.warm_band > 0.0) {
            self.warm_band = defaults.warm_band;
        }
        if !(self.player_speed > 0.0) {
            self.player_speed = defaults.player_speed;
        }
        if !(self.player_size > 0.0) {
            self.player_size = defaults.player_size;
        }
        self
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<SimConfig>(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config.validated();
                }
                Err(e) => log::warn!("Config {} unreadable ({e}), using defaults", path.display()),
            },
            Err(_) => log::info!("No config at {}, using defaults", path.display()),
        }
        Self::default()
    }

    /// Write tuning to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
