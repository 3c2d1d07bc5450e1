//! Backend-agnostic frame description
//!
//! The simulation never talks to a graphics API. Each frame it produces a
//! `Frame`: a world draw list, the lighting passes to composite over it, and
//! a HUD draw list on top. Sprites whose asset is not loaded yet are simply
//! left out.

pub mod assets;
pub mod lighting;

use glam::Vec2;

use self::assets::AssetStore;
use self::lighting::{CompositePass, Starfield, composite_plan};
use crate::sim::collision::Aabb;
use crate::sim::npc::NpcShape;
use crate::sim::state::WorldState;

pub use lighting::{Blend, LightInstance, PointLight, StarInstance};

/// Ground image covering the whole world
pub const GROUND_TEXTURE: &str = "/world.png";

/// Colors (RGBA, straight alpha)
pub mod colors {
    pub const PLAYER: [f32; 4] = [1.0, 0.835, 0.29, 1.0];
    pub const PLAYER_HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.25];
    pub const NPC: [f32; 4] = [0.45, 0.75, 1.0, 1.0];
    pub const NPC_PAUSED: [f32; 4] = [0.95, 0.6, 0.8, 1.0];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PANEL: [f32; 4] = [0.0, 0.0, 0.0, 0.6];

    pub const NIGHT_TOP: [f32; 4] = [0.0, 0.031, 0.086, 1.0];
    pub const NIGHT_BOTTOM: [f32; 4] = [0.0, 0.047, 0.11, 1.0];
    pub const WARM_TOP: [f32; 4] = [1.0, 0.725, 0.373, 1.0];
    pub const WARM_BOTTOM: [f32; 4] = [1.0, 0.51, 0.275, 1.0];
    pub const PLAYER_GLOW: [f32; 4] = [1.0, 0.96, 0.706, 1.0];
    pub const FIRE_GLOW: [f32; 4] = [1.0, 0.706, 0.392, 1.0];
}

/// A single draw command in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Sprite {
        texture: String,
        /// Source rectangle in texture pixels (whole texture if `None`)
        src: Option<Aabb>,
        dest: Aabb,
        alpha: f32,
    },
    Rect { dest: Aabb, color: [f32; 4] },
    Ellipse { center: Vec2, radii: Vec2, color: [f32; 4] },
    Triangle { points: [Vec2; 3], color: [f32; 4] },
    Text { pos: Vec2, text: String, color: [f32; 4] },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Queue a sprite; does nothing until `texture` is loaded
    pub fn sprite(&mut self, assets: &AssetStore, texture: &str, dest: Aabb, alpha: f32) {
        self.sprite_region(assets, texture, None, dest, alpha);
    }

    pub fn sprite_region(&mut self, assets: &AssetStore, texture: &str, src: Option<Aabb>, dest: Aabb, alpha: f32) {
        if !assets.is_ready(texture) {
            return;
        }
        self.cmds.push(DrawCmd::Sprite {
            texture: texture.to_string(),
            src,
            dest,
            alpha,
        });
    }

    pub fn rect(&mut self, dest: Aabb, color: [f32; 4]) {
        self.cmds.push(DrawCmd::Rect { dest, color });
    }

    pub fn ellipse(&mut self, center: Vec2, radii: Vec2, color: [f32; 4]) {
        self.cmds.push(DrawCmd::Ellipse { center, radii, color });
    }

    pub fn triangle(&mut self, points: [Vec2; 3], color: [f32; 4]) {
        self.cmds.push(DrawCmd::Triangle { points, color });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: [f32; 4]) {
        self.cmds.push(DrawCmd::Text {
            pos,
            text: text.into(),
            color,
        });
    }
}

/// Everything a backend needs to present one frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub world: DrawList,
    pub lighting: Vec<CompositePass>,
    pub hud: DrawList,
}

/// Assemble the frame for the current world state
pub fn build_frame(state: &WorldState, assets: &AssetStore, starfield: &mut Starfield) -> Frame {
    let camera = &state.camera;
    let scale = camera.scale();
    let tile = state.config.tile_size;
    let time_secs = state.elapsed_secs as f32;

    let mut world = DrawList::new();

    // Ground: crop the visible part of the world image
    let src = Aabb {
        min: camera.pos,
        size: camera.view_size(),
    };
    let dest = Aabb {
        min: Vec2::ZERO,
        size: camera.viewport(),
    };
    world.sprite_region(assets, GROUND_TEXTURE, Some(src), dest, 1.0);

    // Back to front by anchor row
    let mut placeables: Vec<_> = state.placeables().collect();
    placeables.sort_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    for placeable in placeables {
        placeable.draw(&mut world, assets, camera, tile, time_secs);
    }

    // Dropped items at half a tile
    let half = Vec2::splat(tile * 0.25);
    for item in &state.dropped {
        let Some(def) = state.items.get(&item.stack.id) else {
            continue;
        };
        let dest = Aabb {
            min: camera.world_to_screen(item.pos - half).round(),
            size: (half * 2.0 * scale).round(),
        };
        world.sprite(assets, def.icon, dest, 1.0);
    }

    for npc in &state.npcs {
        let center = camera.world_to_screen(npc.pos + Vec2::new(0.0, npc.bob_offset()));
        let half = npc.size * 0.5 * scale;
        let color = if npc.pause_left() > 0.0 {
            colors::NPC_PAUSED
        } else {
            colors::NPC
        };
        match npc.shape {
            NpcShape::Square => world.rect(Aabb::from_center(center, Vec2::splat(half)), color),
            NpcShape::Circle => world.ellipse(center, Vec2::splat(half), color),
            NpcShape::Triangle => world.triangle(
                [
                    center + Vec2::new(0.0, -half),
                    center + Vec2::new(half, half),
                    center + Vec2::new(-half, half),
                ],
                color,
            ),
        }
    }

    let player = &state.player;
    let p = camera.world_to_screen(player.pos).round();
    let size = (player.size * scale).round();
    world.ellipse(
        p + Vec2::new(0.0, (10.0 * scale).round()),
        Vec2::new((8.0 * scale).round(), (4.0 * scale).round()),
        colors::SHADOW,
    );
    world.rect(Aabb::from_center(p, Vec2::splat(size * 0.5)), colors::PLAYER);
    world.rect(
        Aabb {
            min: p - Vec2::splat(size * 0.5),
            size: Vec2::splat(size * 0.5),
        },
        colors::PLAYER_HIGHLIGHT,
    );

    starfield.ensure_size(camera.viewport());
    let lighting = composite_plan(&state.time.cycle(), camera, &state.active_lights(), starfield, time_secs);

    let mut hud = DrawList::new();
    hud.text(Vec2::new(12.0, 20.0), state.time.clock().to_string(), colors::TEXT);
    for (i, note) in state.notifications.iter().enumerate() {
        let pos = Vec2::new(camera.viewport().x * 0.5, camera.viewport().y - 80.0 - i as f32 * 20.0);
        hud.rect(
            Aabb::from_center(pos, Vec2::new(note.text.len() as f32 * 4.0 + 8.0, 9.0)),
            colors::PANEL,
        );
        hud.text(pos, note.text.clone(), colors::TEXT);
    }

    Frame { world, lighting, hud }
}
