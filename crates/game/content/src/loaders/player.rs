//! Player base-template loader.

use std::path::Path;

use rpg_core::PlayerTemplate;

use crate::loaders::{LoadResult, read_file};

/// Loader for the player base template.
///
/// The file holds one [`PlayerTemplate`] object; every field is optional
/// and defaults match a fresh level-1 character.
pub struct PlayerLoader;

impl PlayerLoader {
    /// Load the player template from a JSON file.
    pub fn load(path: &Path) -> LoadResult<PlayerTemplate> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
    }

    /// Parse the player template from a JSON string.
    pub fn parse(content: &str) -> serde_json::Result<PlayerTemplate> {
        serde_json::from_str(content)
    }
}
