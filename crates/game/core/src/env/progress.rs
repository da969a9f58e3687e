//! Persisted-progress and progression collaborators.
//!
//! The engine treats saved progress as an opaque record: it reads the
//! fields it needs to seed the player and hands updates back, but never
//! defines how the record is persisted. The exp-to-level curve lives
//! entirely behind [`ProgressionOracle`]; the combat core never computes
//! level thresholds itself.

use std::collections::BTreeMap;

use super::catalog::EquipSlot;
use super::error::{ProgressError, ProgressionError};
use crate::stats::Attributes;

/// Player progress as read from / written to the external store.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    pub level: u32,
    pub exp: u64,
    pub unspent_points: u32,
    pub stats: Attributes,
    pub equipped: BTreeMap<EquipSlot, String>,
    pub inventory: BTreeMap<String, u32>,
    pub spells: Vec<String>,
    pub gold: u64,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            level: 1,
            exp: 0,
            unspent_points: 0,
            stats: Attributes::default(),
            equipped: BTreeMap::new(),
            inventory: BTreeMap::new(),
            spells: Vec::new(),
            gold: 0,
        }
    }
}

/// External save-data store.
///
/// Implementations may use interior mutability; the engine only ever holds
/// a shared reference and treats `save` as best-effort.
pub trait ProgressStore: Send + Sync {
    /// Loads the persisted record, or `None` for a fresh character.
    fn load(&self) -> Option<ProgressRecord>;

    /// Persists an updated record, returning the merged result.
    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, ProgressError>;
}

/// External progression collaborator owning the exp-to-level curve.
pub trait ProgressionOracle: Send + Sync {
    /// Grants exp and returns the updated progress record, with any
    /// level-ups already applied by the collaborator.
    fn apply_exp_gain(&self, amount: u32) -> Result<ProgressRecord, ProgressionError>;
}
