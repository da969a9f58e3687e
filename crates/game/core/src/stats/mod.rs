//! Stat model: base attributes, derived combat stats, and bonus folding.
//!
//! Combat-facing stats are never authored or hand-edited. They are always
//! recomputed from base attributes (player) or a base stat snapshot (enemy)
//! plus the currently active modifiers. Recomputation starts from the base
//! every time; nothing here mutates a running total in place, so repeated
//! recomputes cannot drift.

mod derived;

pub use derived::DerivedCombat;

use std::collections::BTreeMap;

/// Base attributes for player-side stat derivation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Attributes {
    #[serde(rename = "str", alias = "strength")]
    pub strength: i32,
    #[serde(rename = "dex", alias = "dexterity")]
    pub dexterity: i32,
    #[serde(rename = "mag", alias = "magic")]
    pub magic: i32,
    #[serde(rename = "con", alias = "constitution")]
    pub constitution: i32,
}

impl Attributes {
    pub const fn new(strength: i32, dexterity: i32, magic: i32, constitution: i32) -> Self {
        Self {
            strength,
            dexterity,
            magic,
            constitution,
        }
    }
}

/// Recognized stat keys for equipment bonuses and buff/debuff targets.
///
/// A closed enum rather than free-form strings: authoring typos fail when
/// content is deserialized instead of silently no-op-ing in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKey {
    Str,
    Dex,
    Mag,
    Con,
    Atk,
    Def,
    #[serde(rename = "matk")]
    #[strum(serialize = "matk")]
    MAtk,
    #[serde(rename = "mdef")]
    #[strum(serialize = "mdef")]
    MDef,
    HpMax,
    MpMax,
    /// Flat critical-hit chance points (1 point = +1% chance).
    Crit,
    /// Flat critical-damage points (1 point = +1% multiplier).
    CritDmg,
}

/// Flat additive bonuses keyed by [`StatKey`].
///
/// Attribute keys (`Str`/`Dex`/`Mag`/`Con`) fold into the attributes before
/// derivation; combat keys fold into the derived stats afterwards. `Crit`
/// and `CritDmg` are read by the critical-hit model and do not touch the
/// derived block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StatBonuses {
    totals: BTreeMap<StatKey, i32>,
}

impl StatBonuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flat delta for a stat key. Deltas accumulate.
    pub fn add(&mut self, key: StatKey, delta: i32) {
        *self.totals.entry(key).or_insert(0) += delta;
    }

    /// Merges another bonus set into this one.
    pub fn merge(&mut self, other: &StatBonuses) {
        for (key, delta) in &other.totals {
            self.add(*key, *delta);
        }
    }

    /// Total delta for a key (zero when absent).
    pub fn get(&self, key: StatKey) -> i32 {
        self.totals.get(&key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Attributes with the attribute-key deltas folded in.
    pub fn adjusted_attributes(&self, base: Attributes) -> Attributes {
        Attributes {
            strength: base.strength + self.get(StatKey::Str),
            dexterity: base.dexterity + self.get(StatKey::Dex),
            magic: base.magic + self.get(StatKey::Mag),
            constitution: base.constitution + self.get(StatKey::Con),
        }
    }

    /// Folds combat-key deltas into a derived block, clamping stats to zero
    /// and resource maxima to at least one HP.
    pub fn apply_combat(&self, derived: &mut DerivedCombat) {
        derived.atk = (derived.atk + self.get(StatKey::Atk)).max(0);
        derived.def = (derived.def + self.get(StatKey::Def)).max(0);
        derived.matk = (derived.matk + self.get(StatKey::MAtk)).max(0);
        derived.mdef = (derived.mdef + self.get(StatKey::MDef)).max(0);
        derived.hp_max =
            (derived.hp_max as i64 + self.get(StatKey::HpMax) as i64).max(1) as u32;
        derived.mp_max =
            (derived.mp_max as i64 + self.get(StatKey::MpMax) as i64).max(0) as u32;
    }
}
