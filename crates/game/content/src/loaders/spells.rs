//! Spell table loader.

use std::path::Path;

use rpg_core::SpellDef;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Spell table structure for JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellTable {
    pub spells: Vec<SpellDef>,
}

/// Loader for the spell table.
pub struct SpellLoader;

impl SpellLoader {
    /// Load spell definitions from a JSON file.
    pub fn load(path: &Path) -> LoadResult<Vec<SpellDef>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
    }

    /// Parse spell definitions from a JSON string.
    pub fn parse(content: &str) -> serde_json::Result<Vec<SpellDef>> {
        let table: SpellTable = serde_json::from_str(content)?;
        Ok(table.spells)
    }
}
