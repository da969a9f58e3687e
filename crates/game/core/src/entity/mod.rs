//! Runtime combat entities.
//!
//! Player and enemies share one [`Entity`] shape; what differs is the
//! provenance of their base stats, carried in the tagged [`EntityKind`]
//! variant resolved once at construction. Combat stats on an entity are a
//! cache: [`Entity::recompute`] always re-derives them from the base
//! (player attributes + equipment, or the enemy's scaled snapshot) plus the
//! currently active buff/debuff set, never from the previous cached values.

mod build;

pub use build::{BuildError, EnemySpec, build_enemies, build_enemy, build_player};
pub(crate) use build::equipment_bonuses;

use std::collections::BTreeMap;

use crate::env::{DropSpec, Element, EquipSlot};
use crate::scaling::ScaledStats;
use crate::stats::{Attributes, DerivedCombat, StatBonuses, StatKey};
use crate::status::{Cooldowns, Status, StatusKind};

/// Current and maximum resource values.
///
/// `hp` and `mp` are always within `[0, max]`; mutation goes through the
/// clamping helpers so the invariant is structural.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ResourcePool {
    pub hp: u32,
    pub hp_max: u32,
    pub mp: u32,
    pub mp_max: u32,
}

impl ResourcePool {
    /// Fresh pool with both resources at maximum.
    pub const fn at_max(hp_max: u32, mp_max: u32) -> Self {
        Self {
            hp: hp_max,
            hp_max,
            mp: mp_max,
            mp_max,
        }
    }

    /// Applies damage, returning the amount actually removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.hp);
        self.hp -= actual;
        actual
    }

    /// Restores HP, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.hp_max - self.hp);
        self.hp += actual;
        actual
    }

    /// Restores MP, returning the amount actually restored.
    pub fn restore_mp(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.mp_max - self.mp);
        self.mp += actual;
        actual
    }

    /// Spends MP; returns false (and spends nothing) when short.
    pub fn spend_mp(&mut self, amount: u32) -> bool {
        if self.mp < amount {
            return false;
        }
        self.mp -= amount;
        true
    }

    /// Installs new maxima, clamping current values to them.
    pub fn rescale_preserving(&mut self, hp_max: u32, mp_max: u32) {
        self.hp_max = hp_max;
        self.mp_max = mp_max;
        self.hp = self.hp.min(hp_max);
        self.mp = self.mp.min(mp_max);
    }

    /// Installs new maxima and refills both resources (level-up heal).
    pub fn rescale_to_max(&mut self, hp_max: u32, mp_max: u32) {
        *self = Self::at_max(hp_max, mp_max);
    }
}

/// Cached combat-facing stats. Recomputed, never hand-edited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CombatStats {
    pub atk: i32,
    pub def: i32,
    pub matk: i32,
    pub mdef: i32,
}

/// How a recompute treats current HP/MP against the new maxima.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecomputeMode {
    /// Clamp current values to the new maxima (mid-battle stat changes).
    PreserveCurrent,
    /// Reset current values to the new maxima (level-up only).
    RestoreToMax,
}

/// Start-of-turn bookkeeping: which tick was processed and with what
/// outcome, so a duplicate invocation in the same tick replays the result
/// instead of double-ticking statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct UpkeepMark {
    pub tick: u64,
    pub skipped: bool,
    pub died: bool,
}

/// Player-side state carried through a battle.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PlayerData {
    pub level: u32,
    pub exp: u64,
    pub unspent_points: u32,
    /// Base attributes; the source of truth for stat derivation.
    pub stats: Attributes,
    pub equipped: BTreeMap<EquipSlot, String>,
    pub inventory: BTreeMap<String, u32>,
    pub spells: Vec<String>,
    pub gold: u64,
    /// Folded equipment bonuses, cached at construction and whenever the
    /// equipped set changes. Recomputed from the item catalog, not edited.
    pub equip_bonuses: StatBonuses,
}

/// Enemy-side state carried through a battle.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EnemyData {
    /// Scaled base snapshot; recomputation restarts from here.
    pub base: ScaledStats,
    pub exp_reward: u32,
    pub element: Option<Element>,
    pub element_mods: BTreeMap<Element, f64>,
    pub drops: Vec<DropSpec>,
    /// Guards against double reward-grant when death is observed twice.
    pub death_processed: bool,
}

/// Side-specific data, resolved once at construction.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum EntityKind {
    Player(PlayerData),
    Enemy(EnemyData),
}

/// A combatant: the player or one enemy.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub resources: ResourcePool,
    pub combat: CombatStats,
    /// Active statuses in application order.
    pub statuses: Vec<Status>,
    pub cooldowns: Cooldowns,
    pub kind: EntityKind,
    /// Last processed start-of-turn tick and its outcome.
    pub last_upkeep: Option<UpkeepMark>,
}

impl Entity {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.resources.hp > 0
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.kind {
            EntityKind::Player(data) => Some(data),
            EntityKind::Enemy(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            EntityKind::Player(data) => Some(data),
            EntityKind::Enemy(_) => None,
        }
    }

    pub fn enemy_data(&self) -> Option<&EnemyData> {
        match &self.kind {
            EntityKind::Enemy(data) => Some(data),
            EntityKind::Player(_) => None,
        }
    }

    pub fn enemy_data_mut(&mut self) -> Option<&mut EnemyData> {
        match &mut self.kind {
            EntityKind::Enemy(data) => Some(data),
            EntityKind::Player(_) => None,
        }
    }

    /// Whether an active stun is suppressing this entity's action.
    pub fn is_stunned(&self) -> bool {
        self.statuses
            .iter()
            .any(|s| s.kind == StatusKind::Stun && s.is_active())
    }

    /// Pushes a status and re-derives stats so buff/debuff deltas take
    /// effect immediately.
    pub fn push_status(&mut self, status: Status) {
        self.statuses.push(status);
        self.recompute(RecomputeMode::PreserveCurrent);
    }

    /// Total flat bonus for a stat key from equipment and active statuses.
    ///
    /// Used by the critical-hit model for `Crit`/`CritDmg` points.
    pub fn bonus_total(&self, key: StatKey) -> i32 {
        let equip = match &self.kind {
            EntityKind::Player(data) => data.equip_bonuses.get(key),
            EntityKind::Enemy(_) => 0,
        };
        equip + self.status_bonuses().get(key)
    }

    /// Player attributes with equipment and status deltas folded in.
    pub fn effective_attributes(&self) -> Option<Attributes> {
        let data = self.player_data()?;
        let mut bonuses = data.equip_bonuses.clone();
        bonuses.merge(&self.status_bonuses());
        Some(bonuses.adjusted_attributes(data.stats))
    }

    /// Flat deltas contributed by currently active buffs/debuffs.
    fn status_bonuses(&self) -> StatBonuses {
        let mut bonuses = StatBonuses::new();
        for status in &self.statuses {
            if !status.is_active() {
                continue;
            }
            if let (StatusKind::Buff | StatusKind::Debuff, Some(stat)) =
                (status.kind, status.stat)
            {
                bonuses.add(stat, status.value);
            }
        }
        bonuses
    }

    /// Re-derives combat stats and resource maxima from the base plus the
    /// currently active modifier set.
    ///
    /// Player: attributes (+ attribute-key bonuses) feed the derivation
    /// formulas, then combat-key bonuses fold in. Enemy: the scaled base
    /// snapshot plus combat-key status deltas. Never reads the previously
    /// cached values, so repeated calls cannot drift.
    pub fn recompute(&mut self, mode: RecomputeMode) {
        let mut bonuses = self.status_bonuses();

        let derived = match &self.kind {
            EntityKind::Player(data) => {
                bonuses.merge(&data.equip_bonuses);
                let attrs = bonuses.adjusted_attributes(data.stats);
                let mut derived = DerivedCombat::compute(&attrs, data.level);
                bonuses.apply_combat(&mut derived);
                derived
            }
            EntityKind::Enemy(data) => {
                let mut derived = DerivedCombat {
                    atk: data.base.atk,
                    def: data.base.def,
                    matk: data.base.matk,
                    mdef: data.base.mdef,
                    hp_max: data.base.hp_max,
                    mp_max: data.base.mp_max,
                };
                bonuses.apply_combat(&mut derived);
                derived
            }
        };

        self.combat = CombatStats {
            atk: derived.atk,
            def: derived.def,
            matk: derived.matk,
            mdef: derived.mdef,
        };

        match mode {
            RecomputeMode::PreserveCurrent => self
                .resources
                .rescale_preserving(derived.hp_max, derived.mp_max),
            RecomputeMode::RestoreToMax => {
                self.resources.rescale_to_max(derived.hp_max, derived.mp_max)
            }
        }
    }
}
