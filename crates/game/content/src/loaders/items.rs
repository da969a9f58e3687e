//! Item table loader.

use std::path::Path;

use rpg_core::ItemDef;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item table structure for JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTable {
    pub items: Vec<ItemDef>,
}

/// Loader for the item table.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item definitions from a JSON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ItemDef>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
    }

    /// Parse item definitions from a JSON string.
    pub fn parse(content: &str) -> serde_json::Result<Vec<ItemDef>> {
        let table: ItemTable = serde_json::from_str(content)?;
        Ok(table.items)
    }
}
