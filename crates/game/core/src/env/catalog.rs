//! Content catalog records and lookup oracles.
//!
//! Catalogs are loaded once by the content layer and treated as immutable
//! for the process lifetime. The engine reads them through the oracle
//! traits below and never mutates a record.
//!
//! # Authoring tolerance
//!
//! Numeric fields on enemy templates are optional; a missing or malformed
//! value falls back to a documented default at entity-construction time, so
//! a broken content row degrades the enemy instead of crashing combat.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::stats::{Attributes, StatKey};
use crate::status::StatusSpec;

/// Normalizes id punctuation: hyphens become underscores.
///
/// Player spellbooks were authored with both conventions; every spell
/// lookup goes through this so `fire-bolt` and `fire_bolt` resolve to the
/// same record.
pub fn normalize_id(id: &str) -> String {
    id.replace('-', "_")
}

/// Damage elements for attacks, spells, and enemy affinities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
    Holy,
    Shadow,
}

/// One entry of an enemy's drop table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DropSpec {
    pub item_id: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

/// Enemy content-table record.
///
/// All stat fields are optional: defaults are atk 1, def 0, mdef = def,
/// matk = atk, hp_max 10, mp_max 0, exp_reward 0.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hp_max: Option<u32>,
    #[serde(default)]
    pub mp_max: Option<u32>,
    #[serde(default)]
    pub atk: Option<i32>,
    #[serde(default)]
    pub matk: Option<i32>,
    #[serde(default)]
    pub def: Option<i32>,
    #[serde(default)]
    pub mdef: Option<i32>,
    #[serde(default)]
    pub exp_reward: Option<u32>,
    #[serde(default)]
    pub element: Option<Element>,
    /// Element → damage multiplier. Absent elements multiply by 1.0.
    #[serde(default, deserialize_with = "deserialize_element_mods")]
    pub element_mods: BTreeMap<Element, f64>,
    #[serde(default)]
    pub drops: Vec<DropSpec>,
    #[serde(default)]
    pub boss: bool,
}

impl EnemyTemplate {
    pub const DEFAULT_HP_MAX: u32 = 10;
    pub const DEFAULT_MP_MAX: u32 = 0;
    pub const DEFAULT_ATK: i32 = 1;
    pub const DEFAULT_DEF: i32 = 0;
    pub const DEFAULT_EXP_REWARD: u32 = 0;

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Merges `overrides` over this template: any `Some` field wins,
    /// non-empty collections win, flags OR together.
    pub fn merged_with(&self, overrides: &EnemyTemplate) -> EnemyTemplate {
        EnemyTemplate {
            id: if overrides.id.is_empty() {
                self.id.clone()
            } else {
                overrides.id.clone()
            },
            name: overrides.name.clone().or_else(|| self.name.clone()),
            hp_max: overrides.hp_max.or(self.hp_max),
            mp_max: overrides.mp_max.or(self.mp_max),
            atk: overrides.atk.or(self.atk),
            matk: overrides.matk.or(self.matk),
            def: overrides.def.or(self.def),
            mdef: overrides.mdef.or(self.mdef),
            exp_reward: overrides.exp_reward.or(self.exp_reward),
            element: overrides.element.or(self.element),
            element_mods: if overrides.element_mods.is_empty() {
                self.element_mods.clone()
            } else {
                overrides.element_mods.clone()
            },
            drops: if overrides.drops.is_empty() {
                self.drops.clone()
            } else {
                overrides.drops.clone()
            },
            boss: self.boss || overrides.boss,
        }
    }
}

/// Accepts element multipliers as numbers or numeric strings; a string
/// that fails to parse degrades to 1.0 rather than failing the load.
fn deserialize_element_mods<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<Element, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Number(f64),
        Text(String),
    }

    let raw: BTreeMap<Element, Flexible> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(element, value)| {
            let mult = match value {
                Flexible::Number(n) => n,
                Flexible::Text(s) => s.trim().parse().unwrap_or(1.0),
            };
            (element, mult)
        })
        .collect())
}

/// Which base formula a damage spell resolves with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageSchool {
    /// `max(1, atk − def)`
    Physical,
    /// `max(1, matk − mdef)`
    #[default]
    Magical,
}

/// Spell effect payload.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpellKind {
    Damage {
        /// Multiplier over the base formula.
        #[serde(default = "default_power")]
        power: f64,
        #[serde(default)]
        element: Option<Element>,
        #[serde(default)]
        school: DamageSchool,
        /// Hits all living enemies instead of one target.
        #[serde(default)]
        aoe: bool,
        #[serde(default = "default_can_crit")]
        can_crit: bool,
    },
    Heal {
        amount: u32,
    },
}

fn default_power() -> f64 {
    1.0
}

fn default_can_crit() -> bool {
    true
}

/// Spell content-table record.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpellDef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// MP cost deducted on cast.
    #[serde(default)]
    pub cost: u32,
    /// Turns before the spell can be cast again. Zero means no cooldown.
    #[serde(default)]
    pub cooldown: u32,
    #[serde(flatten)]
    pub kind: SpellKind,
    /// Statuses pushed onto the target(s) after the effect resolves.
    #[serde(default)]
    pub statuses: Vec<StatusSpec>,
}

impl SpellDef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Equipment slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Helm,
    Accessory,
}

/// What a consumable does when used in battle.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ConsumableEffect {
    RestoreHp {
        amount: u32,
    },
    RestoreMp {
        amount: u32,
    },
    Damage {
        #[serde(default = "default_power")]
        power: f64,
        #[serde(default)]
        element: Option<Element>,
        #[serde(default)]
        aoe: bool,
        #[serde(default = "default_can_crit")]
        can_crit: bool,
    },
}

/// Item type with type-specific data.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ItemKind {
    /// Usable in battle; one unit is consumed per use.
    Consumable(ConsumableEffect),
    /// Equippable; contributes flat stat bonuses while worn.
    Equipment {
        slot: EquipSlot,
        #[serde(default)]
        bonuses: BTreeMap<StatKey, i32>,
    },
}

/// Item content-table record.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ItemDef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Turns before the item can be used again. Zero means no cooldown.
    #[serde(default)]
    pub cooldown: u32,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ItemDef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Player base template, merged under persisted progress at battle start.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PlayerTemplate {
    #[serde(default = "default_player_name")]
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub stats: Attributes,
    #[serde(default)]
    pub spells: Vec<String>,
    #[serde(default)]
    pub equipped: BTreeMap<EquipSlot, String>,
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    #[serde(default)]
    pub gold: u64,
}

fn default_player_name() -> String {
    "Hero".to_owned()
}

fn default_level() -> u32 {
    1
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            level: default_level(),
            stats: Attributes::default(),
            spells: Vec::new(),
            equipped: BTreeMap::new(),
            inventory: BTreeMap::new(),
            gold: 0,
        }
    }
}

// ============================================================================
// Catalog Oracles
// ============================================================================

/// Read-only enemy template lookup.
pub trait EnemyOracle: Send + Sync {
    fn enemy(&self, id: &str) -> Option<EnemyTemplate>;
}

/// Read-only spell lookup.
///
/// Implementations must tolerate hyphen/underscore id variants; routing
/// lookups through [`normalize_id`] satisfies the contract.
pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: &str) -> Option<SpellDef>;
}

/// Read-only item lookup.
pub trait ItemOracle: Send + Sync {
    fn item(&self, id: &str) -> Option<ItemDef>;
}

/// Supplies the player base template.
pub trait PlayerOracle: Send + Sync {
    fn base_template(&self) -> PlayerTemplate;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_folds_hyphens() {
        assert_eq!(normalize_id("fire-bolt"), "fire_bolt");
        assert_eq!(normalize_id("fire_bolt"), "fire_bolt");
        assert_eq!(normalize_id("heal"), "heal");
    }

    #[test]
    fn element_mods_accept_numeric_strings() {
        let template: EnemyTemplate = serde_json::from_str(
            r#"{
                "id": "imp",
                "element_mods": { "fire": "0.5", "ice": 2.0, "holy": "junk" }
            }"#,
        )
        .unwrap();

        assert_eq!(template.element_mods[&Element::Fire], 0.5);
        assert_eq!(template.element_mods[&Element::Ice], 2.0);
        assert_eq!(template.element_mods[&Element::Holy], 1.0);
    }

    #[test]
    fn merged_template_prefers_override_fields() {
        let base: EnemyTemplate = serde_json::from_str(
            r#"{ "id": "goblin", "hp_max": 10, "atk": 4, "def": 2 }"#,
        )
        .unwrap();
        let overrides: EnemyTemplate =
            serde_json::from_str(r#"{ "id": "", "atk": 9, "boss": true }"#).unwrap();

        let merged = base.merged_with(&overrides);
        assert_eq!(merged.id, "goblin");
        assert_eq!(merged.atk, Some(9));
        assert_eq!(merged.hp_max, Some(10));
        assert!(merged.boss);
    }

    #[test]
    fn spell_def_parses_flattened_kind() {
        let spell: SpellDef = serde_json::from_str(
            r#"{
                "id": "fire_bolt",
                "cost": 4,
                "cooldown": 2,
                "kind": "damage",
                "power": 1.5,
                "element": "fire"
            }"#,
        )
        .unwrap();

        match spell.kind {
            SpellKind::Damage { power, element, school, aoe, can_crit } => {
                assert_eq!(power, 1.5);
                assert_eq!(element, Some(Element::Fire));
                assert_eq!(school, DamageSchool::Magical);
                assert!(!aoe);
                assert!(can_crit);
            }
            SpellKind::Heal { .. } => panic!("expected damage spell"),
        }
    }

    #[test]
    fn item_kind_distinguishes_equipment_from_consumable() {
        let potion: ItemDef = serde_json::from_str(
            r#"{ "id": "potion", "effect": "restore_hp", "amount": 20 }"#,
        )
        .unwrap();
        assert!(matches!(
            potion.kind,
            ItemKind::Consumable(ConsumableEffect::RestoreHp { amount: 20 })
        ));

        let sword: ItemDef = serde_json::from_str(
            r#"{ "id": "sword", "slot": "weapon", "bonuses": { "atk": 5 } }"#,
        )
        .unwrap();
        match sword.kind {
            ItemKind::Equipment { slot, bonuses } => {
                assert_eq!(slot, EquipSlot::Weapon);
                assert_eq!(bonuses[&crate::stats::StatKey::Atk], 5);
            }
            ItemKind::Consumable(_) => panic!("expected equipment"),
        }
    }
}
