//! Entity construction from catalog templates and persisted progress.

use std::collections::BTreeMap;

use crate::config::Tuning;
use crate::env::{
    BattleEnv, EnemyTemplate, EquipSlot, ItemKind, ItemOracle, OracleError, PlayerTemplate,
    ProgressRecord,
};
use crate::scaling;
use crate::stats::StatBonuses;
use crate::status::Cooldowns;

use super::{CombatStats, EnemyData, Entity, EntityKind, PlayerData, RecomputeMode, ResourcePool};

/// Errors raised while building battle entities.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No catalog record for the requested enemy id.
    #[error("unknown enemy id: {id}")]
    UnknownEnemy { id: String },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// How one enemy of the encounter is specified.
///
/// UI callers usually pass bare or scaled id strings; quest scripting may
/// pass a leveled spec with field overrides or a fully inline template that
/// bypasses the catalog.
#[derive(Clone, Debug, PartialEq)]
pub enum EnemySpec {
    /// Bare id (`"goblin"`) or scaled id (`"goblin-lv5"` / `"goblin_lv5"`).
    Id(String),
    /// Catalog template at an explicit level, with optional field overrides.
    Leveled {
        base_id: String,
        level: u32,
        overrides: Option<Box<EnemyTemplate>>,
    },
    /// Direct stat block, no catalog lookup.
    Inline(Box<EnemyTemplate>),
}

impl EnemySpec {
    /// Parses an id string, detecting the `<base>[-_]lv<N>` scaled form.
    pub fn parse(raw: &str) -> EnemySpec {
        if let Some((base_id, level)) = split_scaled_id(raw) {
            return EnemySpec::Leveled {
                base_id,
                level,
                overrides: None,
            };
        }
        EnemySpec::Id(raw.to_owned())
    }
}

impl From<&str> for EnemySpec {
    fn from(raw: &str) -> Self {
        EnemySpec::parse(raw)
    }
}

/// Splits `goblin-lv5` / `goblin_lv5` into `("goblin", 5)`.
fn split_scaled_id(raw: &str) -> Option<(String, u32)> {
    let sep = raw.rfind(['-', '_'])?;
    let (base, suffix) = (&raw[..sep], &raw[sep + 1..]);
    let level: u32 = suffix.strip_prefix("lv")?.parse().ok()?;
    if base.is_empty() {
        return None;
    }
    Some((base.to_owned(), level))
}

/// Builds one runtime enemy from a spec.
///
/// Resolves the catalog template (unless inline), applies level scaling,
/// and produces an entity at full resources with empty statuses and
/// cooldowns. Malformed numeric fields degrade to documented defaults; an
/// unknown id is the one unrecoverable case.
pub fn build_enemy(
    spec: &EnemySpec,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<Entity, BuildError> {
    let (template, level) = match spec {
        EnemySpec::Id(raw) => match split_scaled_id(raw) {
            Some((base_id, level)) => (lookup(env, &base_id)?, level),
            None => (lookup(env, raw)?, 1),
        },
        EnemySpec::Leveled {
            base_id,
            level,
            overrides,
        } => {
            let base = lookup(env, base_id)?;
            let template = match overrides {
                Some(overrides) => base.merged_with(overrides),
                None => base,
            };
            (template, *level)
        }
        EnemySpec::Inline(template) => ((**template).clone(), 1),
    };

    let base = scaling::scale(&template, level, &tuning.scaling);

    let mut entity = Entity {
        id: template.id.clone(),
        name: template.display_name().to_owned(),
        resources: ResourcePool::at_max(base.hp_max, base.mp_max),
        combat: CombatStats {
            atk: base.atk,
            def: base.def,
            matk: base.matk,
            mdef: base.mdef,
        },
        statuses: Vec::new(),
        cooldowns: Cooldowns::new(),
        kind: EntityKind::Enemy(EnemyData {
            exp_reward: base.exp_reward,
            base,
            element: template.element,
            element_mods: template.element_mods.clone(),
            drops: template.drops.clone(),
            death_processed: false,
        }),
        last_upkeep: None,
    };
    entity.recompute(RecomputeMode::RestoreToMax);
    Ok(entity)
}

/// Builds the full enemy roster; the first entry is the default target.
pub fn build_enemies(
    specs: &[EnemySpec],
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<Vec<Entity>, BuildError> {
    specs
        .iter()
        .map(|spec| build_enemy(spec, env, tuning))
        .collect()
}

fn lookup(env: &BattleEnv<'_>, id: &str) -> Result<EnemyTemplate, BuildError> {
    env.enemies()?
        .enemy(id)
        .ok_or_else(|| BuildError::UnknownEnemy { id: id.to_owned() })
}

/// Builds the runtime player: persisted progress merged over the base
/// template, equipment bonuses folded in, resources at the derived maxima.
pub fn build_player(
    template: &PlayerTemplate,
    progress: Option<&ProgressRecord>,
    items: Option<&dyn ItemOracle>,
) -> Entity {
    let data = match progress {
        Some(record) => PlayerData {
            level: record.level.max(1),
            exp: record.exp,
            unspent_points: record.unspent_points,
            stats: record.stats,
            equipped: record.equipped.clone(),
            inventory: record.inventory.clone(),
            spells: record.spells.clone(),
            gold: record.gold,
            equip_bonuses: equipment_bonuses(&record.equipped, items),
        },
        None => PlayerData {
            level: template.level.max(1),
            exp: 0,
            unspent_points: 0,
            stats: template.stats,
            equipped: template.equipped.clone(),
            inventory: template.inventory.clone(),
            spells: template.spells.clone(),
            gold: template.gold,
            equip_bonuses: equipment_bonuses(&template.equipped, items),
        },
    };

    let mut entity = Entity {
        id: "player".to_owned(),
        name: template.name.clone(),
        resources: ResourcePool::at_max(1, 0),
        combat: CombatStats::default(),
        statuses: Vec::new(),
        cooldowns: Cooldowns::new(),
        kind: EntityKind::Player(data),
        last_upkeep: None,
    };
    entity.recompute(RecomputeMode::RestoreToMax);
    entity
}

/// Folds flat stat bonuses from the equipped set.
///
/// Unknown item ids and non-equipment entries contribute nothing; an
/// inconsistent save must not break battle construction.
pub(crate) fn equipment_bonuses(
    equipped: &BTreeMap<EquipSlot, String>,
    items: Option<&dyn ItemOracle>,
) -> StatBonuses {
    let mut bonuses = StatBonuses::new();
    let Some(items) = items else {
        return bonuses;
    };

    for (slot, item_id) in equipped {
        match items.item(item_id).map(|def| def.kind) {
            Some(ItemKind::Equipment { bonuses: item_bonuses, .. }) => {
                for (key, delta) in &item_bonuses {
                    bonuses.add(*key, *delta);
                }
            }
            Some(ItemKind::Consumable(_)) | None => {
                tracing::debug!(%slot, item_id, "ignoring unresolvable equipped item");
            }
        }
    }
    bonuses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scaled_ids_with_either_separator() {
        assert_eq!(
            EnemySpec::parse("goblin-lv5"),
            EnemySpec::Leveled {
                base_id: "goblin".to_owned(),
                level: 5,
                overrides: None,
            }
        );
        assert_eq!(
            EnemySpec::parse("dire_wolf_lv12"),
            EnemySpec::Leveled {
                base_id: "dire_wolf".to_owned(),
                level: 12,
                overrides: None,
            }
        );
    }

    #[test]
    fn plain_ids_stay_plain() {
        assert_eq!(EnemySpec::parse("goblin"), EnemySpec::Id("goblin".to_owned()));
        // "lv" without a number is part of the name, not a level marker.
        assert_eq!(
            EnemySpec::parse("goblin-lvx"),
            EnemySpec::Id("goblin-lvx".to_owned())
        );
        assert_eq!(EnemySpec::parse("-lv3"), EnemySpec::Id("-lv3".to_owned()));
    }

    #[test]
    fn inline_spec_needs_no_catalog() {
        let template = EnemyTemplate {
            id: "training-dummy".to_owned(),
            hp_max: Some(1),
            atk: Some(0),
            ..EnemyTemplate::default()
        };
        let env = BattleEnv::empty();
        let entity =
            build_enemy(&EnemySpec::Inline(Box::new(template)), &env, &Tuning::new()).unwrap();

        assert_eq!(entity.resources.hp, 1);
        assert_eq!(entity.combat.atk, 0);
        assert!(entity.is_enemy());
        assert!(entity.statuses.is_empty());
        assert!(entity.cooldowns.is_empty());
    }

    #[test]
    fn unknown_enemy_id_is_an_error() {
        let env = BattleEnv::empty();
        let err = build_enemy(&EnemySpec::parse("ghost"), &env, &Tuning::new()).unwrap_err();
        assert_eq!(err, BuildError::Oracle(OracleError::EnemiesNotAvailable));
    }

    #[test]
    fn player_without_progress_uses_template() {
        let template = PlayerTemplate {
            level: 3,
            stats: crate::stats::Attributes::new(4, 3, 2, 5),
            spells: vec!["heal".to_owned()],
            ..PlayerTemplate::default()
        };
        let player = build_player(&template, None, None);

        assert!(player.is_player());
        assert_eq!(player.player_data().unwrap().level, 3);
        assert_eq!(player.resources.hp, player.resources.hp_max);
        // hp_max = 20 + 8×5 + 2×3
        assert_eq!(player.resources.hp_max, 66);
    }
}
