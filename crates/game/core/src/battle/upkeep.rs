//! Start-of-turn protocol.
//!
//! The fixed sequence every entity runs before it may act:
//! cooldown tick → DOT application → stun check → status decay → stat
//! recompute. Runs once per entity per logical turn; the entity's
//! [`crate::entity::UpkeepMark`] makes a duplicate invocation within the
//! same `turn_tick` replay the recorded outcome instead of double-ticking.

use crate::config::Tuning;
use crate::entity::{Entity, RecomputeMode, UpkeepMark};
use crate::env::BattleEnv;
use crate::status::{Status, StatusKind};

use super::rewards;
use super::state::BattleState;

/// Result of one start-of-turn run.
///
/// Callers must not invoke the entity's action this turn when either flag
/// is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpkeepOutcome {
    /// An active stun suppresses the entity's action.
    pub skipped: bool,
    /// The entity died during upkeep (DOT); death handling already ran.
    pub died: bool,
}

/// Which combatant the protocol runs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Combatant {
    Player,
    Enemy(usize),
}

fn entity<'a>(state: &'a BattleState, who: Combatant) -> &'a Entity {
    match who {
        Combatant::Player => &state.player,
        Combatant::Enemy(idx) => &state.enemies[idx],
    }
}

fn entity_mut<'a>(state: &'a mut BattleState, who: Combatant) -> &'a mut Entity {
    match who {
        Combatant::Player => &mut state.player,
        Combatant::Enemy(idx) => &mut state.enemies[idx],
    }
}

/// Runs the start-of-turn protocol for one combatant.
pub(crate) fn run_upkeep(
    state: &mut BattleState,
    who: Combatant,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) -> UpkeepOutcome {
    let window = tuning.log_window();
    let tick = state.turn_tick;

    // Already processed this tick: replay the recorded outcome.
    if let Some(mark) = entity(state, who).last_upkeep {
        if mark.tick == tick {
            return UpkeepOutcome {
                skipped: mark.skipped,
                died: mark.died,
            };
        }
    }

    // 1. Cooldowns tick down even while stunned.
    entity_mut(state, who).cooldowns.tick();

    // 2. DOT application. Processing stops for an entity that dies here:
    //    no further statuses act on it this tick.
    let mut lines = Vec::new();
    let died = {
        let combatant = entity_mut(state, who);
        let dots: Vec<(String, u32)> = combatant
            .statuses
            .iter()
            .filter(|s| s.kind == StatusKind::Dot && s.is_active())
            .map(|s| (s.id.clone(), s.value.max(0) as u32))
            .collect();

        let mut died = false;
        for (id, value) in dots {
            let dealt = combatant.resources.damage(value);
            lines.push(format!(
                "{} takes {} damage from {}.",
                combatant.name, dealt, id
            ));
            if !combatant.is_alive() {
                died = true;
                break;
            }
        }
        died
    };
    for line in lines {
        state.push_log(line, window);
    }

    if died {
        entity_mut(state, who).last_upkeep = Some(UpkeepMark {
            tick,
            skipped: false,
            died: true,
        });
        if let Combatant::Enemy(idx) = who {
            rewards::process_enemy_death(state, idx, env, tuning);
        }
        state.check_end(window);
        return UpkeepOutcome {
            skipped: false,
            died: true,
        };
    }

    // 3. Stun check.
    let skipped = entity(state, who).is_stunned();
    if skipped {
        let name = entity(state, who).name.clone();
        state.push_log(format!("{name} is stunned and cannot act!"), window);
    }

    // 4. Decay, then 5. recompute from the now-current status set. Expired
    //    buff/debuff deltas disappear because recomputation starts from
    //    base, not from the previous cached stats.
    let combatant = entity_mut(state, who);
    for status in &mut combatant.statuses {
        status.turns_left = status.turns_left.saturating_sub(1);
    }
    combatant.statuses.retain(Status::is_active);
    combatant.recompute(RecomputeMode::PreserveCurrent);
    combatant.last_upkeep = Some(UpkeepMark {
        tick,
        skipped,
        died: false,
    });

    UpkeepOutcome {
        skipped,
        died: false,
    }
}
