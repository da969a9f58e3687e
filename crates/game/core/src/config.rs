//! Tunable combat parameters.
//!
//! All balance constants live in explicit configuration values that are
//! threaded into the functions that consume them. Nothing here is global or
//! mutable at module level, so tests can run with isolated tuning per case.

/// Exp-reward scaling curve selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpScalingMode {
    /// `floor(base × (1 + (level-1) × rate))`
    #[default]
    Linear,
    /// `floor(base × (1 + rate)^(level-1))`
    Exponential,
}

/// Growth-rate constants for enemy level scaling.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScalingTuning {
    /// HP growth per level (exponential curve).
    pub hp_rate: f64,
    /// Attack growth per level (linear).
    pub atk_rate: f64,
    /// Magic attack growth per level (linear).
    pub matk_rate: f64,
    /// Defense growth per level (linear).
    pub def_rate: f64,
    /// Magic defense growth per level (linear).
    pub mdef_rate: f64,
    /// Max-MP growth per level (linear).
    pub mp_rate: f64,
    /// Exp-reward growth per level.
    pub exp_rate: f64,
    /// Which curve the exp reward follows.
    pub exp_mode: ExpScalingMode,
    /// Multiplier applied to the exp reward of boss-flagged templates.
    pub boss_bonus: f64,
    /// Current-dungeon exp multiplier, applied last. Clamped to `>= 0`.
    pub dungeon_multiplier: f64,
}

impl ScalingTuning {
    pub const DEFAULT_HP_RATE: f64 = 0.10;
    pub const DEFAULT_ATK_RATE: f64 = 0.06;
    pub const DEFAULT_MATK_RATE: f64 = 0.08;
    pub const DEFAULT_DEF_RATE: f64 = 0.04;
    pub const DEFAULT_MDEF_RATE: f64 = 0.04;
    pub const DEFAULT_MP_RATE: f64 = 0.05;
    pub const DEFAULT_EXP_RATE: f64 = 0.16;
    pub const DEFAULT_BOSS_BONUS: f64 = 1.5;

    pub fn new() -> Self {
        Self {
            hp_rate: Self::DEFAULT_HP_RATE,
            atk_rate: Self::DEFAULT_ATK_RATE,
            matk_rate: Self::DEFAULT_MATK_RATE,
            def_rate: Self::DEFAULT_DEF_RATE,
            mdef_rate: Self::DEFAULT_MDEF_RATE,
            mp_rate: Self::DEFAULT_MP_RATE,
            exp_rate: Self::DEFAULT_EXP_RATE,
            exp_mode: ExpScalingMode::Linear,
            boss_bonus: Self::DEFAULT_BOSS_BONUS,
            dungeon_multiplier: 1.0,
        }
    }

    /// Sets the current-dungeon exp multiplier, clamping negatives to zero.
    pub fn with_dungeon_multiplier(mut self, multiplier: f64) -> Self {
        self.dungeon_multiplier = multiplier.max(0.0);
        self
    }
}

impl Default for ScalingTuning {
    fn default() -> Self {
        Self::new()
    }
}

/// Critical-hit chance and multiplier constants.
///
/// Chance: `base_chance + DEX × dex_to_chance + CRIT × 0.01`, clamped to
/// `[0, max_chance]`. Multiplier: `base_mult + CRITDMG × mult_per_point`,
/// clamped to `[1, max_mult]`.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CritTuning {
    pub base_chance: f64,
    pub dex_to_chance: f64,
    pub max_chance: f64,
    pub base_mult: f64,
    pub mult_per_point: f64,
    pub max_mult: f64,
}

impl CritTuning {
    pub const DEFAULT_BASE_CHANCE: f64 = 0.05;
    pub const DEFAULT_DEX_TO_CHANCE: f64 = 0.004;
    pub const DEFAULT_MAX_CHANCE: f64 = 0.5;
    pub const DEFAULT_BASE_MULT: f64 = 1.5;
    pub const DEFAULT_MULT_PER_POINT: f64 = 0.01;
    pub const DEFAULT_MAX_MULT: f64 = 3.0;

    pub fn new() -> Self {
        Self {
            base_chance: Self::DEFAULT_BASE_CHANCE,
            dex_to_chance: Self::DEFAULT_DEX_TO_CHANCE,
            max_chance: Self::DEFAULT_MAX_CHANCE,
            base_mult: Self::DEFAULT_BASE_MULT,
            mult_per_point: Self::DEFAULT_MULT_PER_POINT,
            max_mult: Self::DEFAULT_MAX_MULT,
        }
    }
}

impl Default for CritTuning {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level tuning bundle threaded through battle construction and actions.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub scaling: ScalingTuning,
    pub crit: CritTuning,
    /// Battle log retention: older lines beyond this window are dropped.
    pub log_window: usize,
}

impl Tuning {
    pub const DEFAULT_LOG_WINDOW: usize = 50;

    pub fn new() -> Self {
        Self {
            scaling: ScalingTuning::new(),
            crit: CritTuning::new(),
            log_window: Self::DEFAULT_LOG_WINDOW,
        }
    }

    /// Effective log window; a zero value falls back to the default so a
    /// malformed config cannot silence the battle log entirely.
    pub fn log_window(&self) -> usize {
        if self.log_window == 0 {
            Self::DEFAULT_LOG_WINDOW
        } else {
            self.log_window
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new()
    }
}
