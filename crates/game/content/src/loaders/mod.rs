//! Content loaders for reading game data from JSON files.
//!
//! Each loader converts one table file into rpg-core records; the
//! [`CatalogLoader`] assembles a whole directory into a validated
//! [`crate::ContentCatalog`].

pub mod enemies;
pub mod items;
pub mod player;
pub mod spells;

pub use enemies::EnemyLoader;
pub use items::ItemLoader;
pub use player::PlayerLoader;
pub use spells::SpellLoader;

use std::path::Path;

use crate::catalog::ContentCatalog;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read file {}: {}", path.display(), e))
}

/// Loads a full catalog from a content directory.
///
/// Expects `enemies.json`, `spells.json`, and `items.json`; `player.json`
/// is optional. The assembled catalog is validated before it is returned.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load_dir(dir: &Path) -> LoadResult<ContentCatalog> {
        let enemies = EnemyLoader::load(&dir.join("enemies.json"))?;
        let spells = SpellLoader::load(&dir.join("spells.json"))?;
        let items = ItemLoader::load(&dir.join("items.json"))?;
        let player_path = dir.join("player.json");
        let player = if player_path.exists() {
            Some(PlayerLoader::load(&player_path)?)
        } else {
            None
        };

        let catalog = ContentCatalog::new(enemies, spells, items, player)?;
        catalog.validate()?;
        Ok(catalog)
    }
}
