//! Deterministic turn-based combat rules and data types.
//!
//! `rpg-core` defines the canonical battle model (entities, stats, statuses,
//! damage resolution, rewards) as pure state-in/state-out APIs. All state
//! mutation flows through the action functions in [`battle`]; content
//! catalogs, persistence, progression, and RNG reach the engine through the
//! oracle traits bundled in [`env::BattleEnv`].
pub mod battle;
pub mod config;
pub mod entity;
pub mod env;
pub mod scaling;
pub mod stats;
pub mod status;

pub use battle::{
    ActionError, BattleOutcome, BattleState, CritProfile, TurnSide, UpkeepOutcome, attack,
    cast_spell, enemy_turn, use_item,
};
pub use config::{CritTuning, ExpScalingMode, ScalingTuning, Tuning};
pub use entity::{
    BuildError, CombatStats, EnemyData, EnemySpec, Entity, EntityKind, PlayerData, RecomputeMode,
    ResourcePool, UpkeepMark, build_enemies, build_enemy, build_player,
};
pub use env::{
    BattleEnv, BattleEvent, ConsumableEffect, DamageSchool, DropSpec, Element, EmitError,
    EnemyOracle, EnemyTemplate, EquipSlot, EventSink, ItemDef, ItemKind, ItemOracle, OracleError,
    PcgRng, PlayerOracle, PlayerTemplate, ProgressError, ProgressRecord, ProgressStore,
    ProgressionError, ProgressionOracle, RngOracle, SpellDef, SpellKind, SpellOracle,
    compute_seed, normalize_id,
};
pub use scaling::ScaledStats;
pub use stats::{Attributes, DerivedCombat, StatBonuses, StatKey};
pub use status::{Cooldowns, Status, StatusKind, StatusSpec};
