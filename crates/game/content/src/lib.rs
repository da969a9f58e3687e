//! Data-driven content tables and loaders.
//!
//! This crate houses the combat engine's content side:
//! - enemy, spell, and item tables (data-driven via JSON)
//! - the player base template (data-driven via JSON)
//! - [`ContentCatalog`], an in-memory catalog implementing the rpg-core
//!   oracle traits with normalized-id lookup and cross-table validation
//!
//! Content is consumed by battle oracles and never appears in battle state.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CatalogError, ContentCatalog};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, EnemyLoader, ItemLoader, PlayerLoader, SpellLoader};
