//! Traits describing the engine's external collaborators.
//!
//! Content catalogs, the progress store, the progression curve, the quest
//! event sink, and the RNG are all consumed through read-only oracle
//! traits. The [`BattleEnv`] aggregate bundles them so the resolver can
//! reach everything it needs without hard coupling to concrete
//! implementations.

mod catalog;
mod error;
mod events;
mod progress;
mod rng;

pub use catalog::{
    ConsumableEffect, DamageSchool, DropSpec, Element, EnemyOracle, EnemyTemplate, EquipSlot,
    ItemDef, ItemKind, ItemOracle, PlayerOracle, PlayerTemplate, SpellDef, SpellKind, SpellOracle,
    normalize_id,
};
pub use error::{EmitError, OracleError, ProgressError, ProgressionError};
pub use events::{BattleEvent, EventSink};
pub use progress::{ProgressRecord, ProgressStore, ProgressionOracle};
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Aggregates the collaborators a battle needs.
///
/// Every slot is optional; accessors return [`OracleError`] when a missing
/// collaborator is actually required. Catalog and RNG slots are needed for
/// construction and damage rolls; progression and events are best-effort
/// and their absence only skips the corresponding side effect.
#[derive(Clone, Copy, Default)]
pub struct BattleEnv<'a> {
    enemies: Option<&'a dyn EnemyOracle>,
    spells: Option<&'a dyn SpellOracle>,
    items: Option<&'a dyn ItemOracle>,
    player: Option<&'a dyn PlayerOracle>,
    progress: Option<&'a dyn ProgressStore>,
    progression: Option<&'a dyn ProgressionOracle>,
    events: Option<&'a dyn EventSink>,
    rng: Option<&'a dyn RngOracle>,
}

impl<'a> BattleEnv<'a> {
    /// An environment with no collaborators attached.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_enemies(mut self, oracle: &'a dyn EnemyOracle) -> Self {
        self.enemies = Some(oracle);
        self
    }

    pub fn with_spells(mut self, oracle: &'a dyn SpellOracle) -> Self {
        self.spells = Some(oracle);
        self
    }

    pub fn with_items(mut self, oracle: &'a dyn ItemOracle) -> Self {
        self.items = Some(oracle);
        self
    }

    pub fn with_player(mut self, oracle: &'a dyn PlayerOracle) -> Self {
        self.player = Some(oracle);
        self
    }

    pub fn with_progress(mut self, store: &'a dyn ProgressStore) -> Self {
        self.progress = Some(store);
        self
    }

    pub fn with_progression(mut self, oracle: &'a dyn ProgressionOracle) -> Self {
        self.progression = Some(oracle);
        self
    }

    pub fn with_events(mut self, sink: &'a dyn EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn enemies(&self) -> Result<&'a dyn EnemyOracle, OracleError> {
        self.enemies.ok_or(OracleError::EnemiesNotAvailable)
    }

    pub fn spells(&self) -> Result<&'a dyn SpellOracle, OracleError> {
        self.spells.ok_or(OracleError::SpellsNotAvailable)
    }

    pub fn items(&self) -> Result<&'a dyn ItemOracle, OracleError> {
        self.items.ok_or(OracleError::ItemsNotAvailable)
    }

    pub fn player(&self) -> Result<&'a dyn PlayerOracle, OracleError> {
        self.player.ok_or(OracleError::PlayerNotAvailable)
    }

    pub fn progress(&self) -> Result<&'a dyn ProgressStore, OracleError> {
        self.progress.ok_or(OracleError::ProgressNotAvailable)
    }

    pub fn progression(&self) -> Result<&'a dyn ProgressionOracle, OracleError> {
        self.progression.ok_or(OracleError::ProgressionNotAvailable)
    }

    pub fn events(&self) -> Result<&'a dyn EventSink, OracleError> {
        self.events.ok_or(OracleError::EventsNotAvailable)
    }

    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

impl std::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEnv")
            .field("enemies", &self.enemies.is_some())
            .field("spells", &self.spells.is_some())
            .field("items", &self.items.is_some())
            .field("player", &self.player.is_some())
            .field("progress", &self.progress.is_some())
            .field("progression", &self.progression.is_some())
            .field("events", &self.events.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_env_reports_missing_oracles() {
        let env = BattleEnv::empty();
        assert!(matches!(
            env.enemies(),
            Err(OracleError::EnemiesNotAvailable)
        ));
        assert!(matches!(env.rng(), Err(OracleError::RngNotAvailable)));
    }

    #[test]
    fn attached_oracle_resolves() {
        let rng = PcgRng;
        let env = BattleEnv::empty().with_rng(&rng);
        assert!(env.rng().is_ok());
        assert!(env.spells().is_err());
    }
}
