//! Per-frame simulation tick
//!
//! Fixed order every tick: input resolution, movement and collision, camera
//! follow, schedule advancement, clock advancement. Rendering happens after,
//! outside the simulation.
//!
//! Only player movement is clamped to `MAX_FRAME_DT`. Schedules and the clock
//! get the full frame time, so a slow frame never loses NPC progress.

use glam::Vec2;

use super::state::WorldState;
use crate::consts::MAX_FRAME_DT;

/// Minutes added by the time-skip key
pub const SKIP_MINUTES: f32 = 10.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Movement intent; normalized before use
    pub move_axis: Vec2,
    /// Zoom steps this tick (positive zooms in)
    pub zoom_steps: i32,
    /// Time skips requested this tick
    pub time_skips: u32,
    pub toggle_inventory: bool,
    pub toggle_crafting: bool,
    /// Escape: cancels placement, closes inventory, else toggles the escape menu
    pub escape: bool,
    /// Hotbar slot picked (0..9)
    pub hotbar: Option<usize>,
    /// Drop one of the selected hotbar item
    pub drop_selected: bool,
    /// Secondary click, screen pixels
    pub interact_at: Option<Vec2>,
    /// Primary click, screen pixels
    pub place_at: Option<Vec2>,
    /// Recipe chosen in the crafting menu
    pub craft: Option<String>,
}

/// Advance the world by one frame of `dt` seconds
pub fn tick(state: &mut WorldState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let move_dt = dt.min(MAX_FRAME_DT);

    // Notifications expire even while a menu is open
    state.expire_notifications(dt);

    handle_menus(state, input);

    if let Some(recipe) = &input.craft {
        if state.menus.crafting {
            // Outcome is reported as a notification
            let _ = state.craft(recipe);
        }
    }

    if state.menus.any_open() {
        return;
    }

    // === Input resolution ===
    if let Some(slot) = input.hotbar {
        state.select_hotbar(slot);
    }
    for _ in 0..input.zoom_steps.max(0) {
        state.camera.zoom_in();
    }
    for _ in 0..(-input.zoom_steps).max(0) {
        state.camera.zoom_out();
    }
    if input.time_skips > 0 {
        state.time.skip_minutes(SKIP_MINUTES * input.time_skips as f32);
        log::info!("Skipped to {}", state.time.clock());
    }

    if let Some(screen) = input.interact_at {
        let world = state.camera.screen_to_world(screen);
        state.interact_at(world);
    }
    if let Some(screen) = input.place_at {
        if state.placing.is_some() {
            let world = state.camera.screen_to_world(screen);
            if let Err(e) = state.place_selected(world) {
                log::warn!("Placement refused: {e}");
                state.notify("Can't place that here.", 1.0);
            }
        }
    }
    if input.drop_selected {
        state.drop_selected();
    }

    // === Movement + collision ===
    let axis = input.move_axis.normalize_or_zero();
    if axis != Vec2::ZERO && move_dt > 0.0 {
        state.try_move_player(axis * state.player.speed * move_dt);
    }
    state.update_dropped(dt);
    state.pickup_items();

    // === Camera ===
    let target = state.player.pos;
    state.camera.follow(target, dt);

    // === Schedules ===
    state.elapsed_secs += dt as f64;
    state.advance_npcs();

    // === Clock ===
    state.time.advance(dt);
}

fn handle_menus(state: &mut WorldState, input: &TickInput) {
    let menus = &mut state.menus;
    if input.toggle_inventory {
        menus.inventory = !menus.inventory;
    }
    if input.toggle_crafting {
        menus.crafting = !menus.crafting;
    }
    if input.escape {
        if state.placing.is_some() {
            state.placing = None;
        } else if menus.inventory {
            menus.inventory = false;
        } else {
            menus.escape = !menus.escape;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::placeable::{Placeable, PlaceableKind};

    const DT: f32 = 1.0 / 60.0;

    fn world() -> WorldState {
        let mut state = WorldState::new(SimConfig::default());
        state.obstacles.clear();
        state.rebuild_collision();
        state
    }

    fn walk(x: f32, y: f32) -> TickInput {
        TickInput {
            move_axis: Vec2::new(x, y),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_ticks_identically() {
        let mut a = WorldState::new(SimConfig::default());
        let mut b = WorldState::new(SimConfig::default());
        let inputs = [walk(1.0, 0.0), walk(0.0, 1.0), walk(-1.0, -1.0), TickInput::default()];
        for i in 0..600 {
            let input = &inputs[(i / 50) % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.camera.pos, b.camera.pos);
        assert_eq!(a.time.time(), b.time.time());
        for (na, nb) in a.npcs.iter().zip(&b.npcs) {
            assert_eq!(na.pos, nb.pos);
        }
    }

    #[test]
    fn test_walking_moves_at_speed() {
        let mut state = world();
        state.npcs.clear();
        let start = state.player.pos;
        for _ in 0..60 {
            tick(&mut state, &walk(1.0, 0.0), DT);
        }
        assert!((state.player.pos.x - start.x - state.player.speed).abs() < 0.01);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut state = world();
        state.npcs.clear();
        let start = state.player.pos;
        tick(&mut state, &walk(1.0, 1.0), 0.1);
        let moved = state.player.pos - start;
        assert!((moved.length() - state.player.speed * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_blocked_move_keeps_position() {
        let mut state = world();
        state.npcs.clear();
        let p = state.player.pos;
        // Campfire box spans x p+4..p+12, touching the player's right edge
        state
            .blocks
            .push(Placeable::new(PlaceableKind::Campfire, Vec2::new(p.x, p.y - 12.0)));
        state.rebuild_collision();
        tick(&mut state, &walk(1.0, 0.0), 0.1);
        assert_eq!(state.player.pos, p);
    }

    #[test]
    fn test_open_menu_pauses_world() {
        let mut state = world();
        let toggle = TickInput {
            toggle_inventory: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, DT);
        assert!(state.menus.inventory);

        state.notify("hello", 0.05);
        let before_t = state.time.time();
        let before_pos = state.player.pos;
        let before_npcs: Vec<Vec2> = state.npcs.iter().map(|n| n.pos).collect();
        let before_elapsed = state.elapsed_secs;
        for _ in 0..30 {
            tick(&mut state, &walk(1.0, 0.0), DT);
        }
        assert_eq!(state.time.time(), before_t);
        assert_eq!(state.player.pos, before_pos);
        assert_eq!(state.elapsed_secs, before_elapsed);
        assert_eq!(state.npcs.iter().map(|n| n.pos).collect::<Vec<_>>(), before_npcs);
        assert!(state.notifications.is_empty());

        // Nothing armed, so Escape closes the inventory
        tick(&mut state, &TickInput { escape: true, ..Default::default() }, DT);
        assert!(!state.menus.any_open());
    }

    #[test]
    fn test_escape_cancels_placement_before_menu() {
        let mut state = world();
        state.placing = Some(PlaceableKind::Campfire);
        let esc = TickInput {
            escape: true,
            ..Default::default()
        };
        tick(&mut state, &esc, DT);
        assert_eq!(state.placing, None);
        assert!(!state.menus.escape);
        tick(&mut state, &esc, DT);
        assert!(state.menus.escape);
    }

    #[test]
    fn test_time_skip_and_zoom() {
        let mut state = world();
        let t0 = state.time.time();
        let zoom0 = state.camera.zoom();
        tick(
            &mut state,
            &TickInput {
                time_skips: 1,
                zoom_steps: 1,
                ..Default::default()
            },
            0.0,
        );
        assert!((state.time.time() - t0 - 10.0 / 1440.0).abs() < 1e-5);
        assert!(state.camera.zoom() > zoom0);
    }

    fn scheduled_positions(state: &WorldState) -> Vec<Vec2> {
        state
            .npcs
            .iter()
            .filter(|n| n.schedule().is_some())
            .map(|n| n.pos)
            .collect()
    }

    #[test]
    fn test_schedules_advance_with_world_time() {
        let mut state = world();
        let mut expected = state.npcs[0].clone();
        expected.fast_forward(1.0);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.npcs[0].pos.distance(expected.pos) < 1e-2);
    }

    #[test]
    fn test_schedules_ignore_frame_rate() {
        let mut smooth = world();
        let mut choppy = world();
        for _ in 0..180 {
            tick(&mut smooth, &TickInput::default(), DT);
        }
        for _ in 0..12 {
            tick(&mut choppy, &TickInput::default(), 0.25);
        }
        assert!((smooth.elapsed_secs - 3.0).abs() < 1e-4);
        assert!((choppy.elapsed_secs - 3.0).abs() < 1e-9);
        for (a, b) in scheduled_positions(&smooth).iter().zip(scheduled_positions(&choppy)) {
            assert!(a.distance(b) < 1e-2, "{a} vs {b}");
        }
        assert!((smooth.time.time() - choppy.time.time()).abs() < 1e-4);
    }

    #[test]
    fn test_slow_frame_clamps_player_only() {
        let mut state = world();
        state.npcs.clear();
        let start = state.player.pos;
        tick(&mut state, &walk(1.0, 0.0), 0.5);
        assert!((state.player.pos.x - start.x - state.player.speed * MAX_FRAME_DT).abs() < 1e-3);
        assert_eq!(state.elapsed_secs, 0.5);
    }

    #[test]
    fn test_time_skip_touches_only_the_clock() {
        let mut state = world();
        let player = state.player;
        let camera = state.camera.state();
        let elapsed = state.elapsed_secs;
        let npcs: Vec<_> = state.npcs.iter().map(|n| (n.pos, n.state(), n.wait_left(), n.elapsed())).collect();
        let t0 = state.time.time();

        let skip = TickInput {
            time_skips: 3,
            ..Default::default()
        };
        tick(&mut state, &skip, 0.0);

        assert!((state.time.time() - t0 - 30.0 / 1440.0).abs() < 1e-5);
        assert_eq!(state.player, player);
        assert_eq!(state.camera.state(), camera);
        assert_eq!(state.elapsed_secs, elapsed);
        let after: Vec<_> = state.npcs.iter().map(|n| (n.pos, n.state(), n.wait_left(), n.elapsed())).collect();
        assert_eq!(after, npcs);
    }

    #[test]
    fn test_escape_cancels_placement_before_closing_inventory() {
        let mut state = world();
        state.menus.inventory = true;
        state.placing = Some(PlaceableKind::Campfire);
        let esc = TickInput {
            escape: true,
            ..Default::default()
        };
        tick(&mut state, &esc, DT);
        assert_eq!(state.placing, None);
        assert!(state.menus.inventory);
        tick(&mut state, &esc, DT);
        assert!(!state.menus.inventory);
        assert!(!state.menus.escape);
    }

    #[test]
    fn test_hotbar_ignored_while_menu_open() {
        let mut state = world();
        state.menus.crafting = true;
        tick(
            &mut state,
            &TickInput {
                hotbar: Some(4),
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.selected_slot, 0);
    }

    #[test]
    fn test_dropped_item_is_picked_up_after_delay() {
        let mut state = world();
        state.npcs.clear();
        let items = state.items.clone();
        state.inventory.add(&items, "fish", 1).unwrap();
        // Lands in the first slot; move it to the hotbar
        let mut slots = state.inventory.slots().to_vec();
        slots.swap(0, crate::inventory::HOTBAR_START);
        state.inventory = crate::inventory::Inventory::from_slots(slots);

        tick(
            &mut state,
            &TickInput {
                hotbar: Some(0),
                drop_selected: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.inventory.count_of("fish"), 0);
        assert_eq!(state.dropped.len(), 1);

        for _ in 0..100 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.dropped.is_empty());
        assert_eq!(state.inventory.count_of("fish"), 1);
    }

    #[test]
    fn test_crafting_only_from_menu() {
        let mut state = world();
        let items = state.items.clone();
        state.inventory.add(&items, "stone", 5).unwrap();
        let craft = TickInput {
            craft: Some("campfire".into()),
            ..Default::default()
        };
        tick(&mut state, &craft, DT);
        assert_eq!(state.inventory.count_of("campfire"), 0);

        state.menus.crafting = true;
        tick(&mut state, &craft, DT);
        assert_eq!(state.inventory.count_of("campfire"), 1);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut state = world();
        let t0 = state.time.time();
        tick(&mut state, &walk(1.0, 0.0), f32::NAN);
        tick(&mut state, &walk(1.0, 0.0), -1.0);
        assert_eq!(state.time.time(), t0);
    }
}
