//! Damage math: base formulas, elemental multipliers, critical hits.

use std::collections::BTreeMap;

use crate::config::CritTuning;
use crate::env::{Element, RngOracle};

/// Physical base damage: `max(1, atk − def)`.
///
/// Widened to `i64` before subtracting; extreme stat pairs must not
/// overflow.
pub(crate) fn physical_base(atk: i32, def: i32) -> u32 {
    (i64::from(atk) - i64::from(def)).max(1) as u32
}

/// Magical base damage: `max(1, matk − mdef)`.
pub(crate) fn magical_base(matk: i32, mdef: i32) -> u32 {
    (i64::from(matk) - i64::from(mdef)).max(1) as u32
}

/// Scales a base amount by a power multiplier, flooring and keeping the
/// one-point damage floor.
pub(crate) fn apply_power(base: u32, power: f64) -> u32 {
    ((f64::from(base) * power).floor() as i64).max(1) as u32
}

/// Looks up the target's multiplier for the acting element.
///
/// Defaults to 1.0 when the action carries no element or the target has no
/// entry for it.
pub(crate) fn element_multiplier(
    element: Option<Element>,
    mods: &BTreeMap<Element, f64>,
) -> f64 {
    element
        .and_then(|e| mods.get(&e).copied())
        .unwrap_or(1.0)
}

/// Applies an elemental multiplier: `max(1, floor(base × mult))`.
pub(crate) fn apply_element(base: u32, mult: f64) -> u32 {
    ((f64::from(base) * mult).floor() as i64).max(1) as u32
}

/// Resolved critical-hit parameters for one attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CritProfile {
    /// Probability of a critical hit, in `[0, max_chance]`.
    pub chance: f64,
    /// Damage multiplier on a crit, in `[1, max_mult]`.
    pub multiplier: f64,
}

impl CritProfile {
    /// A profile that never crits; used for enemies and opted-out actions.
    pub const NONE: CritProfile = CritProfile {
        chance: 0.0,
        multiplier: 1.0,
    };

    /// Computes the profile from attacker stats.
    ///
    /// Chance: `base + DEX × dex_to_chance + CRIT × 0.01`, clamped.
    /// Multiplier: `base + CRITDMG × mult_per_point`, clamped.
    pub fn compute(dex: i32, crit: i32, crit_dmg: i32, tuning: &CritTuning) -> Self {
        let chance = tuning.base_chance
            + f64::from(dex) * tuning.dex_to_chance
            + f64::from(crit) * 0.01;
        let multiplier = tuning.base_mult + f64::from(crit_dmg) * tuning.mult_per_point;

        Self {
            chance: chance.clamp(0.0, tuning.max_chance),
            multiplier: multiplier.clamp(1.0, tuning.max_mult),
        }
    }
}

/// Rolls for a critical hit. A roll strictly below the chance crits.
pub(crate) fn roll_crit(profile: CritProfile, rng: &dyn RngOracle, seed: u64) -> bool {
    profile.chance > 0.0 && rng.roll_unit(seed) < profile.chance
}

/// Applies the crit multiplier, flooring and keeping the damage floor.
pub(crate) fn apply_crit(base: u32, multiplier: f64) -> u32 {
    ((f64::from(base) * multiplier).floor() as i64).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    #[test]
    fn damage_floor_holds_for_any_defense() {
        assert_eq!(physical_base(5, 3), 2);
        assert_eq!(physical_base(5, 5), 1);
        assert_eq!(physical_base(5, 9999), 1);
        assert_eq!(magical_base(i32::MIN, i32::MAX), 1);
    }

    #[test]
    fn extreme_stat_pairs_do_not_overflow() {
        assert_eq!(physical_base(i32::MAX, -1), 1_u32 << 31);
        assert_eq!(physical_base(i32::MAX, i32::MIN), u32::MAX);
        assert_eq!(magical_base(i32::MIN, i32::MAX), 1);
    }

    #[test]
    fn element_multiplier_defaults_to_one() {
        let mut mods = BTreeMap::new();
        mods.insert(Element::Fire, 2.0);

        assert_eq!(element_multiplier(Some(Element::Fire), &mods), 2.0);
        assert_eq!(element_multiplier(Some(Element::Ice), &mods), 1.0);
        assert_eq!(element_multiplier(None, &mods), 1.0);
    }

    #[test]
    fn elemental_application_floors_and_keeps_floor() {
        assert_eq!(apply_element(10, 2.0), 20);
        assert_eq!(apply_element(3, 0.5), 1);
        assert_eq!(apply_element(10, 0.0), 1);
        assert_eq!(apply_element(7, 1.5), 10);
    }

    #[test]
    fn crit_profile_respects_default_bounds() {
        let tuning = CritTuning::new();

        // Enormous stats still clamp to the caps.
        let capped = CritProfile::compute(10_000, 10_000, 10_000, &tuning);
        assert_eq!(capped.chance, tuning.max_chance);
        assert_eq!(capped.multiplier, tuning.max_mult);

        // Negative stats clamp to the floors.
        let floored = CritProfile::compute(-10_000, -10_000, -10_000, &tuning);
        assert_eq!(floored.chance, 0.0);
        assert_eq!(floored.multiplier, 1.0);

        // Plain stats land between.
        let plain = CritProfile::compute(10, 0, 0, &tuning);
        assert!((plain.chance - 0.09).abs() < 1e-9);
        assert!((plain.multiplier - 1.5).abs() < 1e-9);
    }

    #[test]
    fn zero_chance_profile_never_crits() {
        let rng = PcgRng;
        for seed in 0..100 {
            assert!(!roll_crit(CritProfile::NONE, &rng, seed));
        }
    }

    #[test]
    fn certain_profile_always_crits() {
        let rng = PcgRng;
        let profile = CritProfile {
            chance: 1.0,
            multiplier: 2.0,
        };
        for seed in 0..100 {
            assert!(roll_crit(profile, &rng, seed));
        }
        assert_eq!(apply_crit(10, profile.multiplier), 20);
    }
}
