//! Item table and slot inventory
//!
//! 27 slots in a 9x3 grid; the bottom row doubles as the hotbar.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::sim::placeable::PlaceableKind;

pub const INVENTORY_COLS: usize = 9;
pub const INVENTORY_ROWS: usize = 3;
pub const INVENTORY_SLOTS: usize = INVENTORY_COLS * INVENTORY_ROWS;
/// First slot of the hotbar row
pub const HOTBAR_START: usize = INVENTORY_SLOTS - INVENTORY_COLS;

/// Static description of an item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub max_stack: u32,
    /// Block placed when the item is used on the world
    pub places: Option<PlaceableKind>,
}

/// Every item the world knows about
#[derive(Debug, Clone)]
pub struct ItemTable {
    items: Vec<ItemDef>,
}

impl Default for ItemTable {
    fn default() -> Self {
        Self {
            items: vec![
                ItemDef {
                    id: "stone",
                    name: "Stone",
                    icon: "/items/stone.png",
                    max_stack: 999,
                    places: None,
                },
                ItemDef {
                    id: "fish",
                    name: "Fish",
                    icon: "/items/fish.png",
                    max_stack: 999,
                    places: None,
                },
                ItemDef {
                    id: "carrot",
                    name: "Carrot",
                    icon: "/items/carrot.png",
                    max_stack: 999,
                    places: None,
                },
                ItemDef {
                    id: "stone_axe",
                    name: "Stone Axe",
                    icon: "/items/stone_axe.png",
                    max_stack: 1,
                    places: None,
                },
                ItemDef {
                    id: "campfire",
                    name: "Campfire",
                    icon: "/blocks/campfire.png",
                    max_stack: 99,
                    places: Some(PlaceableKind::Campfire),
                },
            ],
        }
    }
}

impl ItemTable {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|def| def.id == id)
    }

    pub fn max_stack(&self, id: &str) -> u32 {
        self.get(id).map_or(1, |def| def.max_stack.max(1))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self { id: id.into(), count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SLOTS],
        }
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from saved slots, padding or truncating to the grid size.
    /// Empty and zero-count stacks become empty slots.
    pub fn from_slots(slots: Vec<Option<ItemStack>>) -> Self {
        let mut slots: Vec<_> = slots
            .into_iter()
            .map(|s| s.filter(|stack| stack.count > 0 && !stack.id.is_empty()))
            .collect();
        slots.resize(INVENTORY_SLOTS, None);
        Self { slots }
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Slot `n` (0-based) of the hotbar row
    pub fn hotbar_slot(&self, n: usize) -> Option<&ItemStack> {
        if n >= INVENTORY_COLS {
            return None;
        }
        self.slot(HOTBAR_START + n)
    }

    pub fn count_of(&self, id: &str) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.id == id)
            .map(|s| s.count)
            .sum()
    }

    /// How many of `id` would fit right now
    pub fn room_for(&self, table: &ItemTable, id: &str) -> u32 {
        let max = table.max_stack(id);
        self.slots
            .iter()
            .map(|slot| match slot {
                None => max,
                Some(s) if s.id == id => max.saturating_sub(s.count),
                Some(_) => 0,
            })
            .fold(0u32, |acc, n| acc.saturating_add(n))
    }

    /// Add items, topping up existing stacks before filling empty slots.
    /// Fails without changing anything when not everything fits.
    pub fn add(&mut self, table: &ItemTable, id: &str, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if self.room_for(table, id) < count {
            return Err(SimError::InventoryFull(id.to_string()));
        }

        let max = table.max_stack(id);
        let mut remaining = count;
        for stack in self.slots.iter_mut().flatten() {
            if stack.id == id && stack.count < max {
                let take = remaining.min(max - stack.count);
                stack.count += take;
                remaining -= take;
                if remaining == 0 {
                    return Ok(());
                }
            }
        }
        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            let take = remaining.min(max);
            *slot = Some(ItemStack::new(id, take));
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Remove items from the earliest slots first. Fails without changing
    /// anything when there are not enough.
    pub fn remove(&mut self, id: &str, count: u32) -> Result<()> {
        let have = self.count_of(id);
        if have < count {
            return Err(SimError::InsufficientMaterials {
                item: id.to_string(),
                needed: count,
                have,
            });
        }

        let mut remaining = count;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot else { continue };
            if stack.id != id {
                continue;
            }
            let take = remaining.min(stack.count);
            stack.count -= take;
            remaining -= take;
            if stack.count == 0 {
                *slot = None;
            }
        }
        Ok(())
    }

    /// Take one item out of a specific slot
    pub fn take_one(&mut self, index: usize) -> Option<String> {
        let slot = self.slots.get_mut(index)?;
        let stack = slot.as_mut()?;
        let id = stack.id.clone();
        stack.count -= 1;
        if stack.count == 0 {
            *slot = None;
        }
        Some(id)
    }
}
