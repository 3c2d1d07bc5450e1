//! Save record
//!
//! A versioned JSON envelope. Parsing is tolerant: as long as the text is
//! JSON, every field that is missing or malformed falls back to its default
//! on its own, and bad list entries are dropped individually.

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::inventory::{Inventory, ItemStack};
use crate::settings::SimConfig;
use crate::sim::placeable::Placeable;
use crate::sim::state::{DroppedItem, WorldState};
use crate::upgrade_speed;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

/// Persisted world. `None` means "use the default" on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub player: PlayerRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_slots: Option<Vec<Option<ItemStack>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f32>,
    /// Generated trees; regenerated from the seed when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obstacle_list: Option<Vec<Placeable>>,
    pub blocks: Vec<Placeable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_items: Option<Vec<DroppedItem>>,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            seed: None,
            player: PlayerRecord::default(),
            inventory_slots: None,
            time_of_day: None,
            obstacle_list: None,
            blocks: Vec::new(),
            dropped_items: None,
        }
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let raw = obj.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Save field {key} invalid ({e}), using default");
            None
        }
    }
}

fn finite(obj: &Map<String, Value>, key: &str) -> Option<f32> {
    field::<f32>(obj, key).filter(|v| v.is_finite())
}

/// Parse a list entry by entry, keeping the good ones
fn list<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<Vec<T>> {
    let raw = obj.get(key).filter(|v| !v.is_null())?;
    let Some(items) = raw.as_array() else {
        log::warn!("Save field {key} is not a list, using default");
        return None;
    };
    let parsed: Vec<T> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if parsed.len() < items.len() {
        log::warn!("Dropped {} bad entries from {key}", items.len() - parsed.len());
    }
    Some(parsed)
}

impl SaveRecord {
    /// Snapshot a running world
    pub fn capture(state: &WorldState) -> Self {
        Self {
            version: SAVE_VERSION,
            seed: Some(state.config.seed),
            player: PlayerRecord {
                x: Some(state.player.pos.x),
                y: Some(state.player.pos.y),
                speed: Some(state.player.speed),
                size: Some(state.player.size),
            },
            inventory_slots: Some(state.inventory.slots().to_vec()),
            time_of_day: Some(state.time.time()),
            obstacle_list: Some(state.obstacles.clone()),
            blocks: state.blocks.clone(),
            dropped_items: Some(state.dropped.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse save text. Only text that is not JSON at all is an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            log::warn!("Save data is not an object, using defaults");
            return Self::default();
        };

        let version = field::<u32>(obj, "version").unwrap_or(SAVE_VERSION);
        if version > SAVE_VERSION {
            log::warn!("Save version {version} is newer than {SAVE_VERSION}, loading what we can");
        }

        let player = match obj.get("player").and_then(Value::as_object) {
            Some(p) => PlayerRecord {
                x: finite(p, "x"),
                y: finite(p, "y"),
                speed: finite(p, "speed"),
                size: finite(p, "size"),
            },
            None => PlayerRecord::default(),
        };

        // Keep slot positions; a bad slot becomes empty
        let inventory_slots = obj.get("inventorySlots").and_then(Value::as_array).map(|slots| {
            slots
                .iter()
                .map(|s| serde_json::from_value::<Option<ItemStack>>(s.clone()).unwrap_or(None))
                .collect()
        });

        Self {
            version,
            seed: field(obj, "seed"),
            player,
            inventory_slots,
            time_of_day: finite(obj, "timeOfDay"),
            obstacle_list: list(obj, "obstacleList"),
            blocks: list(obj, "blocks").unwrap_or_default(),
            dropped_items: list(obj, "droppedItems"),
        }
    }

    /// Rebuild a world. Time comes from `timeOfDay`, the camera is snapped to
    /// the player, and NPCs are placed where their schedules have them at that
    /// time. A player saved inside geometry goes back to spawn.
    pub fn restore(&self, config: &SimConfig) -> WorldState {
        let mut config = config.clone();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        // Fresh world: trees from the seed, NPCs at spawn
        let mut state = WorldState::new(config);

        if let Some(obstacles) = &self.obstacle_list {
            state.obstacles = obstacles.clone();
        }
        state.blocks = self.blocks.clone();
        state.rebuild_collision();
        if let Some(dropped) = &self.dropped_items {
            state.dropped = dropped
                .iter()
                .filter(|d| state.items.get(&d.stack.id).is_some() && d.stack.count > 0 && d.pos.is_finite())
                .cloned()
                .collect();
        }

        if let Some(slots) = &self.inventory_slots {
            state.inventory = Inventory::from_slots(slots.clone());
        }

        let p = &self.player;
        if let Some(size) = p.size.filter(|s| *s > 0.0) {
            state.player.size = size;
        }
        if let Some(speed) = p.speed {
            state.player.speed = upgrade_speed(speed, state.config.player_speed);
        }
        let pos = Vec2::new(p.x.unwrap_or(state.spawn.x), p.y.unwrap_or(state.spawn.y));
        let pos = state.clamp_to_world(pos, state.player.size);
        state.player.pos = if state.collision.query(pos, state.player.size) {
            log::warn!("Saved player position ({}, {}) is blocked, using spawn", pos.x, pos.y);
            state.spawn
        } else {
            pos
        };

        let t = self.time_of_day.unwrap_or(state.config.initial_time);
        state.time.set_time(t);
        state.camera.snap_to(state.player.pos);
        state.settle_npcs();

        log::info!(
            "Restored world at {} ({} blocks)",
            state.time.clock(),
            state.blocks.len()
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::placeable::PlaceableKind;

    fn config() -> SimConfig {
        SimConfig {
            tree_count: 10,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_capture_restore_roundtrip() {
        let mut state = WorldState::new(config());
        state.obstacles.clear();
        state.rebuild_collision();
        state.player.pos = Vec2::new(300.0, 200.0);
        state.place_block(PlaceableKind::Campfire, Vec2::new(64.0, 64.0)).unwrap();
        let items = state.items.clone();
        state.inventory.add(&items, "fish", 3).unwrap();
        state.time.set_time(0.8);

        let json = SaveRecord::capture(&state).to_json().unwrap();
        let restored = SaveRecord::from_json(&json).unwrap().restore(&config());

        assert_eq!(restored.player.pos, Vec2::new(300.0, 200.0));
        assert_eq!(restored.blocks, state.blocks);
        assert!(restored.obstacles.is_empty());
        assert_eq!(restored.inventory, state.inventory);
        assert!((restored.time.time() - 0.8).abs() < 1e-6);
        let expected_cam = restored.camera.desired_for(restored.player.pos);
        assert_eq!(restored.camera.pos, expected_cam);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let record = SaveRecord::from_json("{}").unwrap();
        assert_eq!(record, SaveRecord::default());

        let state = record.restore(&config());
        let fresh = WorldState::new(config());
        assert_eq!(state.player.pos, fresh.spawn);
        assert_eq!(state.obstacles, fresh.obstacles);
        assert_eq!(state.time.time(), config().initial_time);
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let json = r#"{
            "player": { "x": "left", "y": 120, "speed": 1.1 },
            "timeOfDay": "noon",
            "inventorySlots": [{ "id": "stone", "count": 4 }, 7, null],
            "obstacleList": [],
            "blocks": [{ "kind": "campfire", "x": 32, "y": 32 }, { "kind": "anvil", "x": 0, "y": 0 }]
        }"#;
        let record = SaveRecord::from_json(json).unwrap();
        assert_eq!(record.player.x, None);
        assert_eq!(record.player.y, Some(120.0));
        assert_eq!(record.time_of_day, None);
        assert_eq!(record.blocks.len(), 1);
        let slots = record.inventory_slots.clone().unwrap();
        assert_eq!(slots[0], Some(ItemStack::new("stone", 4)));
        assert_eq!(slots[1], None);

        let state = record.restore(&config());
        // Legacy px/frame speed
        assert!((state.player.speed - 66.0).abs() < 1e-4);
        assert_eq!(state.player.pos.y, 120.0);
    }

    #[test]
    fn test_unparsable_text_is_an_error() {
        assert!(matches!(
            SaveRecord::from_json("not json"),
            Err(crate::SimError::SaveFormat(_))
        ));
        // Valid JSON of the wrong shape is not
        assert_eq!(SaveRecord::from_json("[1, 2]").unwrap(), SaveRecord::default());
    }

    fn roundtrip(state: &WorldState) -> WorldState {
        let json = SaveRecord::capture(state).to_json().unwrap();
        SaveRecord::from_json(&json).unwrap().restore(&config())
    }

    #[test]
    fn test_save_then_restore_keeps_npcs_in_place() {
        let state = WorldState::new(config());
        let restored = roundtrip(&state);
        for (before, after) in state.npcs.iter().zip(&restored.npcs) {
            assert_eq!(before.pos, after.pos, "{} moved", before.name);
            assert_eq!(before.state(), after.state());
        }
    }

    #[test]
    fn test_restore_after_play_matches_schedules() {
        let mut state = WorldState::new(config());
        for _ in 0..300 {
            crate::sim::tick(&mut state, &crate::sim::TickInput::default(), 1.0 / 60.0);
        }
        let restored = roundtrip(&state);
        for (before, after) in state.npcs.iter().zip(&restored.npcs) {
            if before.schedule().is_none() {
                continue;
            }
            assert!(before.pos.distance(after.pos) < 0.05, "{}: {} vs {}", before.name, before.pos, after.pos);
            assert_eq!(before.state(), after.state());
        }
    }

    #[test]
    fn test_blocked_player_restores_at_spawn() {
        let json = r#"{
            "player": { "x": 104, "y": 104 },
            "obstacleList": [{ "kind": "tree", "x": 96, "y": 96 }]
        }"#;
        let mut state = SaveRecord::from_json(json).unwrap().restore(&config());
        assert_eq!(state.player.pos, state.spawn);

        let start = state.player.pos;
        let walk = crate::sim::TickInput {
            move_axis: Vec2::X,
            ..Default::default()
        };
        for _ in 0..30 {
            crate::sim::tick(&mut state, &walk, 1.0 / 60.0);
        }
        assert!(state.player.pos.x > start.x);
    }

    #[test]
    fn test_dropped_items_survive_restore() {
        let mut state = WorldState::new(config());
        let far = state.spawn + Vec2::new(200.0, 0.0);
        state.drop_item(ItemStack::new("carrot", 2), far, 0.0);
        let restored = roundtrip(&state);
        assert_eq!(restored.dropped, state.dropped);

        // Unknown items parse but are discarded on restore
        let json = r#"{ "droppedItems": [{ "stack": { "id": "anvil", "count": 1 }, "pos": [0, 0] }] }"#;
        let record = SaveRecord::from_json(json).unwrap();
        assert_eq!(record.dropped_items.as_ref().map(Vec::len), Some(1));
        assert!(record.restore(&config()).dropped.is_empty());
    }

    #[test]
    fn test_json_uses_envelope_names() {
        let state = WorldState::new(config());
        let value = serde_json::to_value(SaveRecord::capture(&state)).unwrap();
        for key in [
            "version",
            "seed",
            "player",
            "inventorySlots",
            "timeOfDay",
            "obstacleList",
            "blocks",
            "droppedItems",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
