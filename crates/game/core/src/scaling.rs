//! Enemy level scaling.
//!
//! Pure functions from a content template and a level to a concrete stat
//! block. Scaling runs once at entity construction, never per turn, and
//! reads nothing outside the supplied template and tuning.

use crate::config::{ExpScalingMode, ScalingTuning};
use crate::env::EnemyTemplate;

/// Concrete, fully defaulted stat block for one scaled enemy.
///
/// Also serves as the enemy's `_base` snapshot: derived-stat recomputation
/// restarts from these values plus the active modifier set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ScaledStats {
    pub hp_max: u32,
    pub mp_max: u32,
    pub atk: i32,
    pub matk: i32,
    pub def: i32,
    pub mdef: i32,
    pub exp_reward: u32,
}

/// `floor(base × (1 + rate)^(level-1))`, clamped non-negative.
fn exponential(base: f64, rate: f64, level: u32) -> i64 {
    (base * (1.0 + rate).powf(f64::from(level.saturating_sub(1)))).floor() as i64
}

/// `floor(base × (1 + (level-1) × rate))`, clamped non-negative.
fn linear(base: f64, rate: f64, level: u32) -> i64 {
    (base * (1.0 + f64::from(level.saturating_sub(1)) * rate)).floor() as i64
}

// Saturating narrowing: absurd levels pin stats at the type maximum
// instead of wrapping.
fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}

/// Scales an enemy template to a level.
///
/// HP grows exponentially so high-level single targets stay meaningfully
/// tougher; combat stats and MP grow linearly; the exp reward follows the
/// configured mode, then the boss bonus and dungeon multiplier.
///
/// `level <= 1` returns the floored base unchanged, so authored
/// zero-reward enemies stay at exactly zero. Missing template fields take
/// their documented defaults (atk 1, def 0, mdef = def, matk = atk,
/// hp_max 10, mp_max 0, exp 0).
pub fn scale(template: &EnemyTemplate, level: u32, tuning: &ScalingTuning) -> ScaledStats {
    let base_hp = template.hp_max.unwrap_or(EnemyTemplate::DEFAULT_HP_MAX);
    let base_mp = template.mp_max.unwrap_or(EnemyTemplate::DEFAULT_MP_MAX);
    let base_atk = template.atk.unwrap_or(EnemyTemplate::DEFAULT_ATK);
    let base_matk = template.matk.unwrap_or(base_atk);
    let base_def = template.def.unwrap_or(EnemyTemplate::DEFAULT_DEF);
    let base_mdef = template.mdef.unwrap_or(base_def);
    let base_exp = template
        .exp_reward
        .unwrap_or(EnemyTemplate::DEFAULT_EXP_REWARD);

    let hp_max = clamp_u32(exponential(f64::from(base_hp), tuning.hp_rate, level)).max(1);
    let mp_max = clamp_u32(linear(f64::from(base_mp), tuning.mp_rate, level));
    let atk = clamp_i32(linear(f64::from(base_atk), tuning.atk_rate, level));
    let matk = clamp_i32(linear(f64::from(base_matk), tuning.matk_rate, level));
    let def = clamp_i32(linear(f64::from(base_def), tuning.def_rate, level));
    let mdef = clamp_i32(linear(f64::from(base_mdef), tuning.mdef_rate, level));

    let mut exp = match tuning.exp_mode {
        ExpScalingMode::Linear => linear(f64::from(base_exp), tuning.exp_rate, level),
        ExpScalingMode::Exponential => exponential(f64::from(base_exp), tuning.exp_rate, level),
    } as f64;
    if template.boss {
        exp *= tuning.boss_bonus;
    }
    exp *= tuning.dungeon_multiplier.max(0.0);

    ScaledStats {
        hp_max,
        mp_max,
        atk,
        matk,
        def,
        mdef,
        exp_reward: exp.floor().max(0.0) as u32,
    }
}
