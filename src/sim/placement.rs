//! Procedural tree placement
//!
//! Rejection sampling over the tile grid. A placed tree claims its tile and
//! the eight neighbors, so no two trees ever share or touch a tile. Tiles
//! whose center lies within the spawn exclusion radius start out claimed.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::placeable::{Placeable, PlaceableKind};
use crate::settings::SimConfig;

/// Inputs for one placement run
#[derive(Debug, Clone)]
pub struct PlacementParams {
    pub world_size: Vec2,
    pub tile_size: f32,
    pub spawn: Vec2,
    /// Exclusion radius around the spawn point, in tiles
    pub exclusion_radius_tiles: u32,
    pub target_count: usize,
    pub attempt_budget: u32,
}

impl PlacementParams {
    pub fn from_config(config: &SimConfig, spawn: Vec2) -> Self {
        Self {
            world_size: Vec2::new(config.world_width, config.world_height),
            tile_size: config.tile_size,
            spawn,
            exclusion_radius_tiles: config.spawn_exclusion_tiles,
            target_count: config.tree_count,
            attempt_budget: config.placement_attempts,
        }
    }

    pub fn exclusion_radius(&self) -> f32 {
        self.exclusion_radius_tiles as f32 * self.tile_size
    }
}

/// Occupancy grid used while sampling
struct TileGrid {
    cols: usize,
    rows: usize,
    taken: Vec<bool>,
}

impl TileGrid {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            taken: vec![false; cols * rows],
        }
    }

    fn is_taken(&self, col: usize, row: usize) -> bool {
        self.taken[row * self.cols + col]
    }

    fn take(&mut self, col: usize, row: usize) {
        self.taken[row * self.cols + col] = true;
    }

    /// Claim a tile and its eight neighbors
    fn take_neighborhood(&mut self, col: usize, row: usize) {
        let (col, row) = (col as i64, row as i64);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (c, r) = (col + dx, row + dy);
                if c >= 0 && r >= 0 && (c as usize) < self.cols && (r as usize) < self.rows {
                    self.take(c as usize, r as usize);
                }
            }
        }
    }
}

/// Place up to `target_count` trees. Running out of attempts is not an error;
/// whatever was placed is returned.
pub fn place_trees(params: &PlacementParams, rng: &mut Pcg32) -> Vec<Placeable> {
    let tile = params.tile_size;
    let cols = (params.world_size.x / tile).floor().max(0.0) as usize;
    let rows = (params.world_size.y / tile).floor().max(0.0) as usize;
    if cols == 0 || rows == 0 || params.target_count == 0 {
        return Vec::new();
    }

    let mut grid = TileGrid::new(cols, rows);

    let radius = params.exclusion_radius();
    for row in 0..rows {
        for col in 0..cols {
            let center = Vec2::new((col as f32 + 0.5) * tile, (row as f32 + 0.5) * tile);
            if center.distance(params.spawn) <= radius {
                grid.take(col, row);
            }
        }
    }

    let mut trees = Vec::with_capacity(params.target_count);
    for _ in 0..params.attempt_budget {
        if trees.len() >= params.target_count {
            break;
        }
        let col = rng.random_range(0..cols);
        let row = rng.random_range(0..rows);
        if grid.is_taken(col, row) {
            continue;
        }
        grid.take_neighborhood(col, row);
        trees.push(Placeable::new(
            PlaceableKind::Tree,
            Vec2::new(col as f32 * tile, row as f32 * tile),
        ));
    }

    if trees.len() < params.target_count {
        log::info!(
            "Placed {}/{} trees before exhausting {} attempts",
            trees.len(),
            params.target_count,
            params.attempt_budget
        );
    } else {
        log::debug!("Placed {} trees", trees.len());
    }

    trees
}
