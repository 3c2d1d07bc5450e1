//! World state and the entities it owns
//!
//! `WorldState` owns everything the simulation mutates: the player, static
//! obstacles, placed blocks, dropped items, NPCs, camera, clock, inventory and
//! RNG. Systems
//! borrow what they need from it for the duration of a call.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::{Aabb, CollisionField, resolve_entity_overlap};
use super::npc::{Npc, NpcShape};
use super::placeable::{Placeable, PlaceableKind};
use super::placement::{PlacementParams, place_trees};
use super::schedule::{Schedule, Waypoint};
use super::time::TimeModel;
use crate::consts::{DROP_PICKUP_DELAY, PICKUP_RANGE};
use crate::crafting::RecipeBook;
use crate::error::{Result, SimError};
use crate::inventory::{HOTBAR_START, INVENTORY_COLS, Inventory, ItemStack, ItemTable};
use crate::renderer::PointLight;
use crate::settings::SimConfig;

/// The player avatar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Center, world pixels
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per second
    pub speed: f32,
}

impl Player {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size * 0.5))
    }
}

/// An item stack lying on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedItem {
    pub stack: ItemStack,
    /// Center, world pixels
    pub pos: Vec2,
    /// Seconds before it can be picked up
    #[serde(default)]
    pub pickup_delay: f32,
}

/// A transient on-screen message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    /// Seconds until it disappears
    pub remaining: f32,
}

/// Open overlay menus; any of them suspends gameplay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub inventory: bool,
    pub crafting: bool,
    pub escape: bool,
}

impl MenuState {
    pub fn any_open(&self) -> bool {
        self.inventory || self.crafting || self.escape
    }
}

pub struct WorldState {
    pub config: SimConfig,
    /// Seeded RNG (wandering NPCs); placement draws from it first
    rng: Pcg32,
    /// Simulated seconds since the world started
    pub elapsed_secs: f64,
    pub spawn: Vec2,
    pub player: Player,
    /// Generated trees, immutable after generation
    pub obstacles: Vec<Placeable>,
    /// Player-placed blocks
    pub blocks: Vec<Placeable>,
    pub dropped: Vec<DroppedItem>,
    pub collision: CollisionField,
    pub npcs: Vec<Npc>,
    pub camera: Camera,
    pub time: TimeModel,
    pub items: ItemTable,
    pub recipes: RecipeBook,
    pub inventory: Inventory,
    pub notifications: Vec<Notification>,
    pub menus: MenuState,
    /// Selected hotbar slot (0..9)
    pub selected_slot: usize,
    /// Block kind being placed, if the selected item places one
    pub placing: Option<PlaceableKind>,
    next_id: u32,
}

impl WorldState {
    /// Generate a fresh world from `config.seed`
    pub fn new(config: SimConfig) -> Self {
        let config = config.validated();
        let mut rng = Pcg32::seed_from_u64(config.seed);

        let world = Vec2::new(config.world_width, config.world_height);
        let spawn = (world * 0.5).floor();
        let obstacles = place_trees(&PlacementParams::from_config(&config, spawn), &mut rng);

        let mut camera = Camera::new(&config);
        camera.snap_to(spawn);

        let mut state = Self {
            rng,
            elapsed_secs: 0.0,
            spawn,
            player: Player {
                pos: spawn,
                size: config.player_size,
                speed: config.player_speed,
            },
            obstacles,
            blocks: Vec::new(),
            dropped: Vec::new(),
            collision: CollisionField::new(),
            npcs: Vec::new(),
            camera,
            time: TimeModel::new(&config),
            items: ItemTable::default(),
            recipes: RecipeBook::default(),
            inventory: Inventory::new(),
            notifications: Vec::new(),
            menus: MenuState::default(),
            selected_slot: 0,
            placing: None,
            next_id: 1,
            config,
        };
        state.rebuild_collision();
        state.spawn_villagers();
        state.settle_npcs();

        log::info!(
            "World ready: seed {}, {} trees, {} npcs",
            state.config.seed,
            state.obstacles.len(),
            state.npcs.len()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn world_size(&self) -> Vec2 {
        self.camera.world_size()
    }

    /// Trees then placed blocks
    pub fn placeables(&self) -> impl Iterator<Item = &Placeable> {
        self.obstacles.iter().chain(self.blocks.iter())
    }

    /// Recompute the static collision field from obstacles and blocks
    pub fn rebuild_collision(&mut self) {
        let tile = self.config.tile_size;
        let mut field = CollisionField::new();
        for placeable in self.obstacles.iter().chain(self.blocks.iter()) {
            field.extend(placeable.world_boxes(tile));
        }
        self.collision = field;
    }

    /// Keep a center position inside the world, minus half of `size`
    pub fn clamp_to_world(&self, pos: Vec2, size: f32) -> Vec2 {
        let half = Vec2::splat(size * 0.5);
        pos.clamp(half, (self.world_size() - half).max(half))
    }

    /// Move the player by `delta`. A move into static geometry is rejected in
    /// full; NPCs push the player out instead. Returns whether it moved.
    pub fn try_move_player(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO || !delta.is_finite() {
            return false;
        }
        let size = self.player.size;
        let candidate = self.clamp_to_world(self.player.pos + delta, size);
        if self.collision.query(candidate, size) {
            return false;
        }

        let npc_boxes: Vec<Aabb> = self.npcs.iter().map(Npc::hitbox).collect();
        let resolved = self.clamp_to_world(resolve_entity_overlap(candidate, size, &npc_boxes), size);
        if resolved != candidate && self.collision.query(resolved, size) {
            return false;
        }

        let moved = resolved != self.player.pos;
        self.player.pos = resolved;
        moved
    }

    pub fn notify(&mut self, text: impl Into<String>, secs: f32) {
        let text = text.into();
        log::info!("Notification: {text}");
        self.notifications.push(Notification { text, remaining: secs });
    }

    pub fn expire_notifications(&mut self, dt: f32) {
        for note in &mut self.notifications {
            note.remaining -= dt;
        }
        self.notifications.retain(|n| n.remaining > 0.0);
    }

    fn in_reach(&self, pos: Vec2, range: f32) -> bool {
        pos.distance(self.player.pos) <= range
    }

    /// Put a stack on the ground
    pub fn drop_item(&mut self, stack: ItemStack, pos: Vec2, pickup_delay: f32) {
        let pos = self.clamp_to_world(pos, 0.0);
        log::debug!("Dropped {} x{} at ({}, {})", stack.id, stack.count, pos.x, pos.y);
        self.dropped.push(DroppedItem {
            stack,
            pos,
            pickup_delay,
        });
    }

    /// Drop one of the selected hotbar item at the player's feet
    pub fn drop_selected(&mut self) -> bool {
        let Some(id) = self.inventory.take_one(HOTBAR_START + self.selected_slot) else {
            return false;
        };
        let feet = self.player.pos + Vec2::new(0.0, self.player.size);
        self.drop_item(ItemStack::new(id, 1), feet, DROP_PICKUP_DELAY);
        self.select_hotbar(self.selected_slot);
        true
    }

    pub fn update_dropped(&mut self, dt: f32) {
        for item in &mut self.dropped {
            item.pickup_delay = (item.pickup_delay - dt).max(0.0);
        }
    }

    /// Move dropped items within reach into the inventory. A stack that does
    /// not fit stays on the ground whole. Returns how many were picked up.
    pub fn pickup_items(&mut self) -> usize {
        let mut picked = 0;
        let mut left = Vec::with_capacity(self.dropped.len());
        for item in std::mem::take(&mut self.dropped) {
            if item.pickup_delay <= 0.0 && self.in_reach(item.pos, PICKUP_RANGE) {
                match self.inventory.add(&self.items, &item.stack.id, item.stack.count) {
                    Ok(()) => {
                        log::debug!("Picked up {} x{}", item.stack.id, item.stack.count);
                        picked += 1;
                        continue;
                    }
                    Err(e) => log::debug!("Left {} on the ground: {e}", item.stack.id),
                }
            }
            left.push(item);
        }
        self.dropped = left;
        if picked > 0 {
            self.select_hotbar(self.selected_slot);
        }
        picked
    }

    /// Tile top-left containing a world point
    pub fn snap_to_tile(&self, world: Vec2) -> Vec2 {
        let tile = self.config.tile_size;
        (world / tile).floor() * tile
    }

    /// Place a block by id at a world point, snapped to the grid
    pub fn place_block_id(&mut self, id: &str, world: Vec2) -> Result<()> {
        let kind = PlaceableKind::from_id(id).ok_or_else(|| SimError::UnknownBlock(id.to_string()))?;
        self.place_block(kind, world)
    }

    pub fn place_block(&mut self, kind: PlaceableKind, world: Vec2) -> Result<()> {
        let anchor = self.snap_to_tile(world);
        let tile = self.config.tile_size;
        let occupied = || SimError::TileOccupied {
            x: anchor.x,
            y: anchor.y,
        };

        if self.placeables().any(|p| p.pos == anchor) {
            return Err(occupied());
        }
        // Never box the player in
        let block = Placeable::new(kind, anchor);
        let player_box = self.player.hitbox();
        if block.world_boxes(tile).any(|b| b.overlaps(&player_box)) {
            return Err(occupied());
        }

        self.blocks.push(block);
        self.rebuild_collision();
        log::info!("Placed {} at ({}, {})", kind.id(), anchor.x, anchor.y);
        Ok(())
    }

    /// Select a hotbar slot; arms placement when the item places a block
    pub fn select_hotbar(&mut self, slot: usize) {
        if slot >= INVENTORY_COLS {
            return;
        }
        self.selected_slot = slot;
        self.placing = self
            .inventory
            .hotbar_slot(slot)
            .and_then(|stack| self.items.get(&stack.id))
            .and_then(|def| def.places);
    }

    /// Place the selected hotbar item at a world point, spending one
    pub fn place_selected(&mut self, world: Vec2) -> Result<()> {
        let Some(kind) = self.placing else {
            return Ok(());
        };
        let slot = HOTBAR_START + self.selected_slot;
        self.place_block(kind, world)?;
        self.inventory.take_one(slot);
        // Re-arm (or disarm when the stack ran out)
        self.select_hotbar(self.selected_slot);
        Ok(())
    }

    /// Craft a recipe into the inventory, reporting the outcome on screen
    pub fn craft(&mut self, recipe_id: &str) -> Result<()> {
        match self.recipes.craft(recipe_id, &mut self.inventory, &self.items) {
            Ok(stack) => {
                let name = self.items.get(&stack.id).map_or(stack.id.as_str(), |d| d.name).to_string();
                self.notify(format!("Crafted {name}"), 2.0);
                self.select_hotbar(self.selected_slot);
                Ok(())
            }
            Err(e) => {
                log::warn!("Craft {recipe_id} failed: {e}");
                self.notify(
                    match &e {
                        SimError::InsufficientMaterials { .. } => "Not enough materials!".to_string(),
                        other => other.to_string(),
                    },
                    1.0,
                );
                Err(e)
            }
        }
    }

    /// Talk to whichever NPC is under a world point. Returns false if none.
    pub fn interact_at(&mut self, world: Vec2) -> bool {
        let player_pos = self.player.pos;
        let Some(npc) = self.npcs.iter_mut().find(|n| n.contains_point(world)) else {
            return false;
        };
        let reply = npc.interact(player_pos);
        self.notify(reply.text, reply.duration_secs);
        true
    }

    /// NPCs within `range` of the player, nearest first
    pub fn proximity(&self, range: f32) -> Vec<&Npc> {
        let mut near: Vec<&Npc> = self
            .npcs
            .iter()
            .filter(|n| self.in_reach(n.pos, range))
            .collect();
        near.sort_by(|a, b| {
            a.pos
                .distance_squared(self.player.pos)
                .total_cmp(&b.pos.distance_squared(self.player.pos))
        });
        near
    }

    /// Light sources for the current frame
    pub fn active_lights(&self) -> Vec<PointLight> {
        let darkness = self.time.cycle().darkness;
        let tile = self.config.tile_size;
        let mut lights = vec![PointLight::player_glow(self.player.pos, darkness)];
        lights.extend(
            self.blocks
                .iter()
                .filter(|b| b.kind.light_level() > 0.0)
                .map(|b| PointLight::block(b.center(tile), b.kind.light_level())),
        );
        lights
    }

    /// Advance every NPC to the current world time
    pub fn advance_npcs(&mut self) {
        let bounds = self.world_size();
        let now = self.elapsed_secs;
        for npc in &mut self.npcs {
            npc.update(now, &mut self.rng, bounds);
        }
    }

    /// Restart every schedule and fast-forward it to the time of day, so NPC
    /// positions are a function of the clock alone
    pub fn settle_npcs(&mut self) {
        let offset = self.time.seconds_since_midnight();
        let now = self.elapsed_secs;
        for npc in &mut self.npcs {
            // Schedules were validated at spawn
            if npc.rebind().is_ok() {
                npc.fast_forward(offset);
            }
            npc.sync_clock(now);
        }
    }

    fn spawn_villagers(&mut self) {
        let spawn = self.spawn;
        let now = self.elapsed_secs;

        let id = self.next_entity_id();
        let mut mira = Npc::new(id, "Mira", spawn + Vec2::new(48.0, -40.0))
            .with_dialogue(&["Lovely day for a walk.", "The campfire keeps the dark away."]);
        let patrol = Schedule::new(
            vec![
                Waypoint::new(0.0, 0.0, 60),
                Waypoint::new(64.0, 0.0, 0),
                Waypoint::new(64.0, 64.0, 30),
                Waypoint::new(0.0, 64.0, 0),
            ],
            40.0,
            true,
        )
        .relative();
        // A rejected schedule is logged by bind and the NPC wanders
        let _ = mira.bind(patrol);

        let id = self.next_entity_id();
        let mut tobin = Npc::new(id, "Tobin", spawn + Vec2::new(-40.0, 56.0)).with_shape(NpcShape::Circle);
        // Legacy px/frame speed
        let errand = Schedule::new(
            vec![
                Waypoint::new(0.0, 0.0, 0),
                Waypoint::new(-96.0, 0.0, 120),
                Waypoint::new(-96.0, -48.0, 0),
            ],
            1.0,
            false,
        )
        .relative();
        let _ = tobin.bind(errand);

        let id = self.next_entity_id();
        let wren = Npc::new(id, "Wren", spawn + Vec2::new(96.0, 80.0))
            .with_shape(NpcShape::Triangle)
            .with_dialogue(&["I go where the wind takes me."]);

        for mut npc in [mira, tobin, wren] {
            npc.sync_clock(now);
            self.npcs.push(npc);
        }
    }
}
