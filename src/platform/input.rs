//! Key and pointer accumulation
//!
//! Key names follow DOM `KeyboardEvent.key` values. Held keys drive the
//! movement axis; everything else is a one-shot action collected until the
//! next `take_tick_input`. Auto-repeat presses of a key that is already held
//! are ignored.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::tick::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Places the armed block
    Primary,
    /// Talks to an NPC
    Secondary,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<String>,
    pending: TickInput,
    /// Last pointer position, screen pixels
    pointer: Vec2,
}

/// Normalize single letters so caps lock does not change bindings
fn normalize(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

fn direction(key: &str) -> Option<Vec2> {
    match key {
        "w" | "ArrowUp" => Some(Vec2::NEG_Y),
        "s" | "ArrowDown" => Some(Vec2::Y),
        "a" | "ArrowLeft" => Some(Vec2::NEG_X),
        "d" | "ArrowRight" => Some(Vec2::X),
        _ => None,
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str, shift: bool) {
        let key = normalize(key);
        if !self.held.insert(key.clone()) {
            return;
        }

        let pending = &mut self.pending;
        match key.as_str() {
            "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" => {
                pending.hotbar = key.parse::<usize>().ok().map(|n| n - 1);
            }
            "." => pending.zoom_steps += 1,
            "," => pending.zoom_steps -= 1,
            "+" => pending.time_skips += 1,
            "=" if shift => pending.time_skips += 1,
            "e" => pending.toggle_inventory = !pending.toggle_inventory,
            "c" => pending.toggle_crafting = !pending.toggle_crafting,
            "q" => pending.drop_selected = true,
            "Escape" => pending.escape = true,
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize(key));
    }

    /// Drop all held keys (focus lost)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        self.pointer = screen;
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_down(&mut self, button: PointerButton) {
        match button {
            PointerButton::Primary => self.pending.place_at = Some(self.pointer),
            PointerButton::Secondary => self.pending.interact_at = Some(self.pointer),
        }
    }

    /// Queue a recipe picked in the crafting menu
    pub fn craft(&mut self, recipe: impl Into<String>) {
        self.pending.craft = Some(recipe.into());
    }

    /// Raw movement axis from held keys (not normalized)
    pub fn move_axis(&self) -> Vec2 {
        self.held.iter().filter_map(|k| direction(k)).fold(Vec2::ZERO, |acc, d| acc + d)
    }

    /// Input for the next tick; one-shot actions are consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        let mut input = std::mem::take(&mut self.pending);
        input.move_axis = self.move_axis();
        input
    }
}
