//! Status effects and action cooldowns.
//!
//! Status instances move from active to expired monotonically; an expired
//! instance is never reactivated — reapplying an effect pushes a fresh
//! instance. Buff/debuff stat deltas are never folded into a running total:
//! the recompute path re-derives stats from base plus the currently active
//! set, so expiry is just removal from the list.

use std::collections::BTreeMap;

use crate::stats::StatKey;

/// Closed set of status effect kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusKind {
    /// Fixed damage at each start-of-turn tick.
    Dot,
    /// Suppresses the entity's action for the turn.
    Stun,
    /// Positive stat delta while active.
    Buff,
    /// Negative stat delta while active.
    Debuff,
}

/// Content-authored status effect, attached to spells and items.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StatusSpec {
    /// Effect identity; defaults to the kind name when unspecified.
    #[serde(default)]
    pub id: Option<String>,
    pub kind: StatusKind,
    /// Stat targeted by a buff/debuff. Ignored for dot/stun.
    #[serde(default)]
    pub stat: Option<StatKey>,
    /// Damage per tick for dot; signed stat delta for buff/debuff.
    #[serde(default)]
    pub value: i32,
    /// Number of start-of-turn activations before expiry.
    pub turns: u32,
}

/// A live status effect instance on an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Status {
    pub id: String,
    pub kind: StatusKind,
    pub stat: Option<StatKey>,
    pub value: i32,
    /// Remaining start-of-turn activations; removed at zero.
    pub turns_left: u32,
    /// Originating ability/item id. Diagnostic only.
    pub source: Option<String>,
}

impl Status {
    /// Instantiates a spec as pushed by an ability or item.
    pub fn from_spec(spec: &StatusSpec, source: Option<&str>) -> Self {
        Self {
            id: spec
                .id
                .clone()
                .unwrap_or_else(|| spec.kind.to_string()),
            kind: spec.kind,
            stat: spec.stat,
            value: spec.value,
            turns_left: spec.turns,
            source: source.map(str::to_owned),
        }
    }

    pub fn is_active(&self) -> bool {
        self.turns_left > 0
    }
}

/// Per-entity cooldown tracking, keyed by ability/item id.
///
/// Entries with zero turns remaining are absent, not zero-valued.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Cooldowns {
    remaining: BTreeMap<String, u32>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cooldown. A zero duration is a no-op.
    pub fn set(&mut self, id: &str, turns: u32) {
        if turns > 0 {
            self.remaining.insert(id.to_owned(), turns);
        }
    }

    /// Remaining turns for an id (zero when not cooling down).
    pub fn remaining(&self, id: &str) -> u32 {
        self.remaining.get(id).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.remaining(id) == 0
    }

    /// Decrements every entry by one; entries reaching zero are removed.
    pub fn tick(&mut self) {
        self.remaining.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.remaining.iter().map(|(id, turns)| (id.as_str(), *turns))
    }
}
