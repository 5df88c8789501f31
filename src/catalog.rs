//! Read-only reference catalog: items, item types, recipes and display
//! names. Loaded once at startup from a JSON export and passed by
//! reference into each analytics call.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    pub gid: i64,
    pub type_id: i64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemTypeEntry {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeIngredient {
    pub gid: i64,
    pub quantity: i64,
}

/// Crafting recipe: ingredient order is preserved from the catalog export.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub result_gid: i64,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<ItemEntry>,
    #[serde(default)]
    item_types: Vec<ItemTypeEntry>,
    #[serde(default)]
    recipes: Vec<Recipe>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    items: HashMap<i64, ItemEntry>,
    item_types: HashMap<i64, ItemTypeEntry>,
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        items: Vec<ItemEntry>,
        item_types: Vec<ItemTypeEntry>,
        recipes: Vec<Recipe>,
    ) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.gid, i)).collect(),
            item_types: item_types.into_iter().map(|t| (t.id, t)).collect(),
            recipes,
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(data)?;
        Ok(Self::from_parts(file.items, file.item_types, file.recipes))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn item(&self, gid: i64) -> Option<&ItemEntry> {
        self.items.get(&gid)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Display name for a gid, synthesizing a label when the catalog has
    /// no entry or the entry carries no localized name.
    pub fn display_name(&self, gid: i64) -> String {
        match self.items.get(&gid).and_then(|i| i.name.as_deref()) {
            Some(name) => name.to_string(),
            None => format!("Item {gid}"),
        }
    }

    /// Gids of all items belonging to a type.
    pub fn gids_of_type(&self, type_id: i64) -> Vec<i64> {
        let mut gids: Vec<i64> = self
            .items
            .values()
            .filter(|i| i.type_id == type_id)
            .map(|i| i.gid)
            .collect();
        gids.sort_unstable();
        gids
    }

    /// Allowed-gid set for a category/type scope. `None` means "no
    /// taxonomy filter active". When both are given they are ANDed.
    pub fn allowed_gids(
        &self,
        category: Option<i64>,
        type_id: Option<i64>,
    ) -> Option<HashSet<i64>> {
        if category.is_none() && type_id.is_none() {
            return None;
        }

        let set = self
            .items
            .values()
            .filter(|item| type_id.map_or(true, |t| item.type_id == t))
            .filter(|item| {
                category.map_or(true, |c| {
                    self.item_types
                        .get(&item.type_id)
                        .map_or(false, |t| t.category_id == c)
                })
            })
            .map(|item| item.gid)
            .collect();
        Some(set)
    }
}
