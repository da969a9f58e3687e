//! Public battle operations.
//!
//! Every operation takes the current state by shared reference and returns
//! the successor state; the input is never mutated. An illegal request
//! (wrong turn, unknown id, cooldown, cost) resolves to an unchanged
//! successor: the caller gets a fresh state back either way and the reason
//! goes to the diagnostic log only.

use crate::config::Tuning;
use crate::entity::Entity;
use crate::env::{
    BattleEnv, ConsumableEffect, DamageSchool, Element, ItemKind, SpellKind, compute_seed,
    normalize_id,
};
use crate::stats::StatKey;
use crate::status::Status;

use super::damage::{
    CritProfile, apply_crit, apply_element, apply_power, element_multiplier, magical_base,
    physical_base, roll_crit,
};
use super::error::ActionError;
use super::rewards;
use super::state::{BattleState, TurnSide};
use super::upkeep::{Combatant, run_upkeep};

// Roll contexts keep independent rolls within one action from sharing a
// seed.
const CTX_ATTACK: u32 = 0;
const CTX_SPELL: u32 = 1;
const CTX_ITEM: u32 = 2;

/// Basic physical attack against one enemy.
///
/// `target` is an index into the enemy roster; `None` targets the first
/// living enemy.
pub fn attack(
    state: &BattleState,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> BattleState {
    let mut next = state.advance();
    if let Err(error) = try_attack(&mut next, target, env, tuning) {
        tracing::debug!(%error, "attack rejected");
        return state.advance();
    }
    next
}

/// Casts a spell from the player's spellbook.
pub fn cast_spell(
    state: &BattleState,
    spell_id: &str,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> BattleState {
    let mut next = state.advance();
    if let Err(error) = try_cast_spell(&mut next, spell_id, target, env, tuning) {
        tracing::debug!(%error, spell_id, "cast rejected");
        return state.advance();
    }
    next
}

/// Uses a consumable from the inventory.
pub fn use_item(
    state: &BattleState,
    item_id: &str,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> BattleState {
    let mut next = state.advance();
    if let Err(error) = try_use_item(&mut next, item_id, target, env, tuning) {
        tracing::debug!(%error, item_id, "item use rejected");
        return state.advance();
    }
    next
}

/// Runs the full enemy phase, then hands the turn back to the player.
///
/// Also legal when the player's own upkeep flagged a stun skip
/// ([`BattleState::player_must_skip`]): the phase then starts by forfeiting
/// the player's action.
pub fn enemy_turn(state: &BattleState, env: &BattleEnv<'_>, tuning: &Tuning) -> BattleState {
    let mut next = state.advance();
    if let Err(error) = try_enemy_turn(&mut next, env, tuning) {
        tracing::debug!(%error, "enemy turn rejected");
        return state.advance();
    }
    next
}

fn ensure_player_can_act(state: &BattleState) -> Result<(), ActionError> {
    if state.over {
        return Err(ActionError::BattleOver);
    }
    if state.turn != TurnSide::Player {
        return Err(ActionError::NotYourTurn);
    }
    if state.player_must_skip() {
        return Err(ActionError::Stunned);
    }
    Ok(())
}

fn resolve_target(state: &BattleState, target: Option<usize>) -> Result<usize, ActionError> {
    match target {
        Some(idx) => {
            if state.enemies.get(idx).is_some_and(Entity::is_alive) {
                Ok(idx)
            } else {
                Err(ActionError::InvalidTarget)
            }
        }
        None => state.first_living_enemy().ok_or(ActionError::InvalidTarget),
    }
}

fn living_enemy_indices(state: &BattleState) -> Vec<usize> {
    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .map(|(idx, _)| idx)
        .collect()
}

/// The player's critical-hit parameters from current attributes and
/// crit-point bonuses.
fn player_crit(state: &BattleState, tuning: &Tuning) -> CritProfile {
    let dex = state
        .player
        .effective_attributes()
        .map_or(0, |attrs| attrs.dexterity);
    CritProfile::compute(
        dex,
        state.player.bonus_total(StatKey::Crit),
        state.player.bonus_total(StatKey::CritDmg),
        &tuning.crit,
    )
}

/// One resolved player-side damage effect, applied per target.
struct DamageSpec<'a> {
    power: f64,
    element: Option<Element>,
    school: DamageSchool,
    profile: CritProfile,
    context: u32,
    /// Log prefix, e.g. `"Hero attacks"` or `"Fire Bolt hits"`.
    label: &'a str,
}

/// Applies one damage effect to one enemy. Returns whether it died.
///
/// Pipeline: base formula → power multiplier → elemental multiplier →
/// crit, flooring at one point throughout. A missing RNG downgrades the
/// hit to non-critical rather than failing the action.
fn strike_enemy(
    state: &mut BattleState,
    idx: usize,
    spec: &DamageSpec<'_>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> bool {
    let window = tuning.log_window();
    let (atk, matk) = (state.player.combat.atk, state.player.combat.matk);

    let seed = compute_seed(state.seed, state.nonce, idx as u32, spec.context);
    let crit = if spec.profile.chance > 0.0 {
        match env.rng() {
            Ok(rng) => roll_crit(spec.profile, rng, seed),
            Err(error) => {
                tracing::warn!(%error, "crit roll skipped");
                false
            }
        }
    } else {
        false
    };

    let enemy = &mut state.enemies[idx];
    let base = match spec.school {
        DamageSchool::Physical => physical_base(atk, enemy.combat.def),
        DamageSchool::Magical => magical_base(matk, enemy.combat.mdef),
    };
    let mut amount = apply_power(base, spec.power);
    let mult = enemy
        .enemy_data()
        .map_or(1.0, |data| element_multiplier(spec.element, &data.element_mods));
    amount = apply_element(amount, mult);
    if crit {
        amount = apply_crit(amount, spec.profile.multiplier);
    }

    let dealt = enemy.resources.damage(amount);
    let name = enemy.name.clone();
    let died = !enemy.is_alive();

    let suffix = if crit { " Critical hit!" } else { "" };
    state.push_log(
        format!("{} {} for {} damage.{}", spec.label, name, dealt, suffix),
        window,
    );

    if died {
        rewards::process_enemy_death(state, idx, env, tuning);
    }
    died
}

/// Common tail of every player action: roster cleanup, end check, and the
/// turn hand-off when the battle continues.
fn finish_player_action(state: &mut BattleState, tuning: &Tuning) {
    state.prune_dead();
    state.check_end(tuning.log_window());
    if !state.over {
        state.turn = TurnSide::Enemy;
    }
}

fn try_attack(
    state: &mut BattleState,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<(), ActionError> {
    ensure_player_can_act(state)?;
    let idx = resolve_target(state, target)?;

    let label = format!("{} attacks", state.player.name);
    let spec = DamageSpec {
        power: 1.0,
        element: Some(Element::Physical),
        school: DamageSchool::Physical,
        profile: player_crit(state, tuning),
        context: CTX_ATTACK,
        label: &label,
    };
    strike_enemy(state, idx, &spec, env, tuning);

    finish_player_action(state, tuning);
    Ok(())
}

fn try_cast_spell(
    state: &mut BattleState,
    spell_id: &str,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<(), ActionError> {
    ensure_player_can_act(state)?;
    let window = tuning.log_window();

    let id = normalize_id(spell_id);
    let known = state
        .player
        .player_data()
        .is_some_and(|data| data.spells.iter().any(|s| normalize_id(s) == id));
    if !known {
        return Err(ActionError::SpellNotKnown { id });
    }

    let spell = env
        .spells()?
        .spell(&id)
        .ok_or_else(|| ActionError::UnknownSpell { id: id.clone() })?;

    let turns = state.player.cooldowns.remaining(&id);
    if turns > 0 {
        return Err(ActionError::OnCooldown { id, turns });
    }
    if state.player.resources.mp < spell.cost {
        return Err(ActionError::InsufficientMana {
            cost: spell.cost,
            have: state.player.resources.mp,
        });
    }

    match &spell.kind {
        SpellKind::Damage {
            power,
            element,
            school,
            aoe,
            can_crit,
        } => {
            let targets = if *aoe {
                living_enemy_indices(state)
            } else {
                vec![resolve_target(state, target)?]
            };
            if targets.is_empty() {
                return Err(ActionError::InvalidTarget);
            }

            state.player.resources.spend_mp(spell.cost);
            let profile = if *can_crit {
                player_crit(state, tuning)
            } else {
                CritProfile::NONE
            };
            let label = format!("{} hits", spell.display_name());
            let spec = DamageSpec {
                power: *power,
                element: *element,
                school: *school,
                profile,
                context: CTX_SPELL,
                label: &label,
            };

            for idx in targets {
                let died = strike_enemy(state, idx, &spec, env, tuning);
                if !died {
                    for status_spec in &spell.statuses {
                        state.enemies[idx].push_status(Status::from_spec(status_spec, Some(&id)));
                    }
                }
            }
        }
        SpellKind::Heal { amount } => {
            if state.player.resources.hp >= state.player.resources.hp_max {
                return Err(ActionError::NothingToRestore);
            }
            state.player.resources.spend_mp(spell.cost);
            let healed = state.player.resources.heal(*amount);
            state.push_log(
                format!(
                    "{} casts {}: restores {} HP.",
                    state.player.name,
                    spell.display_name(),
                    healed
                ),
                window,
            );
            // Riders on a heal apply to the caster.
            for status_spec in &spell.statuses {
                state.player.push_status(Status::from_spec(status_spec, Some(&id)));
            }
        }
    }

    state.player.cooldowns.set(&id, spell.cooldown);
    finish_player_action(state, tuning);
    Ok(())
}

fn try_use_item(
    state: &mut BattleState,
    item_id: &str,
    target: Option<usize>,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<(), ActionError> {
    ensure_player_can_act(state)?;
    let window = tuning.log_window();

    let id = normalize_id(item_id);
    // Inventories may carry either id convention; find the stored key.
    let carried_key = state.player.player_data().and_then(|data| {
        data.inventory
            .iter()
            .find(|(key, count)| normalize_id(key) == id && **count > 0)
            .map(|(key, _)| key.clone())
    });
    let Some(carried_key) = carried_key else {
        return Err(ActionError::NotCarried { id });
    };

    let item = env
        .items()?
        .item(&id)
        .ok_or_else(|| ActionError::NotUsable { id: id.clone() })?;

    let turns = state.player.cooldowns.remaining(&id);
    if turns > 0 {
        return Err(ActionError::OnCooldown { id, turns });
    }

    let effect = match &item.kind {
        ItemKind::Consumable(effect) => effect.clone(),
        ItemKind::Equipment { .. } => return Err(ActionError::NotUsable { id }),
    };

    match effect {
        ConsumableEffect::RestoreHp { amount } => {
            if state.player.resources.hp >= state.player.resources.hp_max {
                return Err(ActionError::NothingToRestore);
            }
            let healed = state.player.resources.heal(amount);
            state.push_log(
                format!(
                    "{} uses {}: restores {} HP.",
                    state.player.name,
                    item.display_name(),
                    healed
                ),
                window,
            );
        }
        ConsumableEffect::RestoreMp { amount } => {
            if state.player.resources.mp >= state.player.resources.mp_max {
                return Err(ActionError::NothingToRestore);
            }
            let restored = state.player.resources.restore_mp(amount);
            state.push_log(
                format!(
                    "{} uses {}: restores {} MP.",
                    state.player.name,
                    item.display_name(),
                    restored
                ),
                window,
            );
        }
        ConsumableEffect::Damage {
            power,
            element,
            aoe,
            can_crit,
        } => {
            let targets = if aoe {
                living_enemy_indices(state)
            } else {
                vec![resolve_target(state, target)?]
            };
            if targets.is_empty() {
                return Err(ActionError::InvalidTarget);
            }

            let profile = if can_crit {
                player_crit(state, tuning)
            } else {
                CritProfile::NONE
            };
            let label = format!("{} hits", item.display_name());
            // Thrown consumables resolve against physical defense.
            let spec = DamageSpec {
                power,
                element,
                school: DamageSchool::Physical,
                profile,
                context: CTX_ITEM,
                label: &label,
            };
            for idx in targets {
                strike_enemy(state, idx, &spec, env, tuning);
            }
        }
    }

    if let Some(data) = state.player.player_data_mut() {
        let depleted = match data.inventory.get_mut(&carried_key) {
            Some(count) => {
                *count -= 1;
                *count == 0
            }
            None => false,
        };
        if depleted {
            data.inventory.remove(&carried_key);
        }
    }
    state.player.cooldowns.set(&id, item.cooldown);
    finish_player_action(state, tuning);
    Ok(())
}

fn try_enemy_turn(
    state: &mut BattleState,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> Result<(), ActionError> {
    if state.over {
        return Err(ActionError::BattleOver);
    }
    match state.turn {
        TurnSide::Enemy => {}
        TurnSide::Player if state.player_must_skip() => {
            // Stunned player forfeits the action; the phase proceeds.
            state.turn = TurnSide::Enemy;
        }
        TurnSide::Player => return Err(ActionError::NotYourTurn),
    }

    let window = tuning.log_window();
    state.turn_tick += 1;

    for idx in 0..state.enemies.len() {
        if state.over {
            break;
        }
        if !state.enemies[idx].is_alive() {
            continue;
        }
        let outcome = run_upkeep(state, Combatant::Enemy(idx), env, tuning);
        if outcome.died || outcome.skipped || state.over {
            continue;
        }

        // Plain physical strike; enemies carry no element or crit model.
        let base = physical_base(state.enemies[idx].combat.atk, state.player.combat.def);
        let dealt = state.player.resources.damage(base);
        let name = state.enemies[idx].name.clone();
        state.push_log(
            format!("{} hits {} for {} damage.", name, state.player.name, dealt),
            window,
        );
        if !state.player.is_alive() {
            state.check_end(window);
            break;
        }
    }

    state.prune_dead();
    state.check_end(window);

    if !state.over {
        state.turn = TurnSide::Player;
        state.turn_tick += 1;
        run_upkeep(state, Combatant::Player, env, tuning);
    }
    Ok(())
}
