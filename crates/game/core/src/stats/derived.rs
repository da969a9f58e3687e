//! Derived combat stats.
//!
//! Pure functions of base attributes and level. These are NOT stored as
//! authoritative state — recompute whenever attributes, equipment, or the
//! active modifier set change.

use super::Attributes;

/// Combat-facing stat block derived from attributes.
///
/// # Formulas
///
/// ```text
/// atk    = 2 + 2×STR + level/2
/// def    = 1 + DEX + level/3
/// matk   = 2 + 2×MAG + level/2
/// mdef   = 1 + (MAG + CON)/2 + level/3
/// hp_max = 20 + 8×CON + 2×level
/// mp_max = 10 + 6×MAG + level
/// ```
///
/// All divisions are integer (floor); stats clamp to zero, `hp_max` to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DerivedCombat {
    pub atk: i32,
    pub def: i32,
    pub matk: i32,
    pub mdef: i32,
    pub hp_max: u32,
    pub mp_max: u32,
}

impl DerivedCombat {
    /// Compute the derived block from attributes and level.
    pub fn compute(attrs: &Attributes, level: u32) -> Self {
        let level = level as i32;

        let atk = 2 + 2 * attrs.strength + level / 2;
        let def = 1 + attrs.dexterity + level / 3;
        let matk = 2 + 2 * attrs.magic + level / 2;
        let mdef = 1 + (attrs.magic + attrs.constitution) / 2 + level / 3;
        let hp_max = 20 + 8 * attrs.constitution + 2 * level;
        let mp_max = 10 + 6 * attrs.magic + level;

        Self {
            atk: atk.max(0),
            def: def.max(0),
            matk: matk.max(0),
            mdef: mdef.max(0),
            hp_max: hp_max.max(1) as u32,
            mp_max: mp_max.max(0) as u32,
        }
    }
}
