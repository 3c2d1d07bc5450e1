//! Recipes and atomic crafting
//!
//! A craft either consumes every ingredient and stores every output, or
//! leaves the inventory exactly as it was.

use crate::error::{Result, SimError};
use crate::inventory::{Inventory, ItemStack, ItemTable};

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: &'static str,
    pub name: &'static str,
    pub ingredients: Vec<(&'static str, u32)>,
    pub output: (&'static str, u32),
}

#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self {
            recipes: vec![
                Recipe {
                    id: "campfire",
                    name: "Campfire",
                    ingredients: vec![("stone", 5)],
                    output: ("campfire", 1),
                },
                Recipe {
                    id: "stone_axe",
                    name: "Stone Axe",
                    ingredients: vec![("stone", 3)],
                    output: ("stone_axe", 1),
                },
            ],
        }
    }
}

impl RecipeBook {
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Craft `id` into `inventory`, returning the stack produced
    pub fn craft(&self, id: &str, inventory: &mut Inventory, table: &ItemTable) -> Result<ItemStack> {
        let recipe = self
            .get(id)
            .ok_or_else(|| SimError::InvalidRecipe(id.to_string()))?;
        if table.get(recipe.output.0).is_none() {
            return Err(SimError::InvalidRecipe(id.to_string()));
        }

        for &(item, needed) in &recipe.ingredients {
            let have = inventory.count_of(item);
            if have < needed {
                return Err(SimError::InsufficientMaterials {
                    item: item.to_string(),
                    needed,
                    have,
                });
            }
        }

        // Work on a copy so a full inventory cannot leave ingredients half spent
        let mut staged = inventory.clone();
        for &(item, needed) in &recipe.ingredients {
            staged.remove(item, needed)?;
        }
        let (out_id, out_count) = recipe.output;
        staged.add(table, out_id, out_count)?;

        *inventory = staged;
        log::info!("Crafted {out_count}x {out_id}");
        Ok(ItemStack::new(out_id, out_count))
    }
}
