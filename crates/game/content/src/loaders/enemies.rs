//! Enemy table loader.

use std::path::Path;

use rpg_core::EnemyTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Enemy table structure for JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTable {
    pub enemies: Vec<EnemyTemplate>,
}

/// Loader for the enemy table.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load enemy templates from a JSON file.
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
    }

    /// Parse enemy templates from a JSON string.
    pub fn parse(content: &str) -> serde_json::Result<Vec<EnemyTemplate>> {
        let table: EnemyTable = serde_json::from_str(content)?;
        Ok(table.enemies)
    }
}
