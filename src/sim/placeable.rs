//! Things that sit on the tile grid: generated trees and player-placed blocks
//!
//! Every placeable is a `PlaceableKind` variant; the variant decides how it
//! draws, which boxes block movement, and how much light it gives off.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::Aabb;
use crate::renderer::DrawList;
use crate::renderer::assets::AssetStore;

/// Placeable types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceableKind {
    Tree,
    Campfire,
}

impl PlaceableKind {
    pub const ALL: [PlaceableKind; 2] = [PlaceableKind::Tree, PlaceableKind::Campfire];

    pub fn id(&self) -> &'static str {
        match self {
            PlaceableKind::Tree => "tree",
            PlaceableKind::Campfire => "campfire",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlaceableKind::Tree => "Tree",
            PlaceableKind::Campfire => "Campfire",
        }
    }

    pub fn texture(&self) -> &'static str {
        match self {
            PlaceableKind::Tree => "/tree.png",
            PlaceableKind::Campfire => "/blocks/campfire.png",
        }
    }

    /// Sprite rectangle relative to the anchor tile's top-left
    pub fn sprite_rect(&self, tile: f32) -> Aabb {
        match self {
            // Canopy rises five tiles above the trunk, one tile either side
            PlaceableKind::Tree => Aabb::new(-tile, -5.0 * tile, 3.0 * tile, 6.0 * tile),
            PlaceableKind::Campfire => Aabb::new(0.0, 0.0, 16.0, 16.0),
        }
    }

    /// Blocking boxes relative to the anchor
    pub fn collision_boxes(&self, tile: f32) -> Vec<Aabb> {
        match self {
            PlaceableKind::Tree => vec![Aabb::new(0.0, 0.0, tile, tile)],
            PlaceableKind::Campfire => vec![Aabb::new(4.0, 8.0, 8.0, 8.0)],
        }
    }

    /// Light emitted (0 = none)
    pub fn light_level(&self) -> f32 {
        match self {
            PlaceableKind::Tree => 0.0,
            PlaceableKind::Campfire => 0.8,
        }
    }

    /// Sprite opacity at a point in time (campfires flicker)
    pub fn alpha_at(&self, time_secs: f32) -> f32 {
        match self {
            PlaceableKind::Tree => 1.0,
            // 0.05 rad per millisecond
            PlaceableKind::Campfire => (0.8 + (time_secs * 50.0).sin() * 0.2).clamp(0.3, 1.0),
        }
    }
}

/// A placeable instance anchored on the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlaceableRecord", into = "PlaceableRecord")]
pub struct Placeable {
    pub kind: PlaceableKind,
    /// Top-left of the anchor tile, world pixels
    pub pos: Vec2,
}

/// Flat `{kind, x, y}` save shape
#[derive(Serialize, Deserialize)]
struct PlaceableRecord {
    kind: PlaceableKind,
    x: f32,
    y: f32,
}

impl From<PlaceableRecord> for Placeable {
    fn from(r: PlaceableRecord) -> Self {
        Self::new(r.kind, Vec2::new(r.x, r.y))
    }
}

impl From<Placeable> for PlaceableRecord {
    fn from(p: Placeable) -> Self {
        Self {
            kind: p.kind,
            x: p.pos.x,
            y: p.pos.y,
        }
    }
}

impl Placeable {
    pub fn new(kind: PlaceableKind, pos: Vec2) -> Self {
        Self { kind, pos }
    }

    /// Collision boxes in world space
    pub fn world_boxes(&self, tile: f32) -> impl Iterator<Item = Aabb> + '_ {
        self.kind
            .collision_boxes(tile)
            .into_iter()
            .map(move |b| b.translated(self.pos))
    }

    /// Center of the anchor tile
    pub fn center(&self, tile: f32) -> Vec2 {
        self.pos + Vec2::splat(tile * 0.5)
    }

    pub fn draw(&self, list: &mut DrawList, assets: &AssetStore, camera: &Camera, tile: f32, time_secs: f32) {
        let rect = self.kind.sprite_rect(tile).translated(self.pos);
        let scale = camera.scale();
        let dest = Aabb {
            min: camera.world_to_screen(rect.min).round(),
            size: (rect.size * scale).round(),
        };
        list.sprite(assets, self.kind.texture(), dest, self.kind.alpha_at(time_secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for kind in PlaceableKind::ALL {
            assert_eq!(PlaceableKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PlaceableKind::from_id("anvil"), None);
    }

    #[test]
    fn test_world_boxes_follow_anchor() {
        let fire = Placeable::new(PlaceableKind::Campfire, Vec2::new(32.0, 48.0));
        let boxes: Vec<_> = fire.world_boxes(16.0).collect();
        assert_eq!(boxes, vec![Aabb::new(36.0, 56.0, 8.0, 8.0)]);
    }

    #[test]
    fn test_only_campfire_emits_light() {
        assert_eq!(PlaceableKind::Tree.light_level(), 0.0);
        assert!(PlaceableKind::Campfire.light_level() > 0.0);
    }

    #[test]
    fn test_flat_json_shape() {
        let tree = Placeable::new(PlaceableKind::Tree, Vec2::new(16.0, 32.0));
        let json = serde_json::to_value(tree).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "tree", "x": 16.0, "y": 32.0 }));
        let back: Placeable = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }
}
