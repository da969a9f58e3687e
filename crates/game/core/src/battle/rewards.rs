//! Death processing: exp, persistence, notifications, drops.
//!
//! Everything here is best-effort against external collaborators. A
//! progression, persistence, or notification failure is logged and the
//! battle proceeds; rewards must never wedge an encounter.

use crate::config::Tuning;
use crate::entity::{RecomputeMode, equipment_bonuses};
use crate::env::{BattleEnv, BattleEvent};

use super::state::BattleState;

/// Processes one enemy's death exactly once.
///
/// Sequence: defeat log → exp grant through the progression collaborator
/// (merging the returned record into the player, level-up refills) →
/// best-effort progress save → kill notification → drop collection with
/// per-item notifications. The `death_processed` flag guards re-entry, so
/// observing the same corpse twice grants nothing twice.
pub(crate) fn process_enemy_death(
    state: &mut BattleState,
    idx: usize,
    env: &BattleEnv<'_>,
    tuning: &Tuning,
) {
    let window = tuning.log_window();

    let Some(enemy) = state.enemies.get_mut(idx) else {
        return;
    };
    if enemy.is_alive() {
        return;
    }
    let Some(data) = enemy.enemy_data_mut() else {
        return;
    };
    if data.death_processed {
        return;
    }
    data.death_processed = true;

    let enemy_id = enemy.id.clone();
    let enemy_name = enemy.name.clone();
    let exp = enemy.enemy_data().map_or(0, |d| d.exp_reward);
    let drops = enemy.enemy_data().map_or_else(Vec::new, |d| d.drops.clone());

    state.push_log(format!("{enemy_name} is defeated!"), window);

    if exp > 0 {
        grant_exp(state, exp, env, window);
    }

    if let Ok(sink) = env.events() {
        let event = BattleEvent::EnemySlain {
            enemy_id: enemy_id.clone(),
            name: enemy_name.clone(),
        };
        if let Err(error) = sink.emit(&event) {
            tracing::warn!(%error, enemy_id, "kill notification failed");
        }
    }

    for drop in drops {
        if let Some(player) = state.player.player_data_mut() {
            *player.inventory.entry(drop.item_id.clone()).or_insert(0) += drop.qty;
        }
        state.push_log(
            format!("Found {} x{}.", drop.item_id, drop.qty),
            window,
        );
        if let Ok(sink) = env.events() {
            let event = BattleEvent::ItemCollected {
                item_id: drop.item_id.clone(),
                qty: drop.qty,
            };
            if let Err(error) = sink.emit(&event) {
                tracing::warn!(%error, item_id = drop.item_id, "pickup notification failed");
            }
        }
    }
}

/// Routes an exp grant through the progression collaborator and merges the
/// returned record back into the battle player.
fn grant_exp(state: &mut BattleState, exp: u32, env: &BattleEnv<'_>, window: usize) {
    state.push_log(format!("Gained {exp} exp."), window);

    let progression = match env.progression() {
        Ok(oracle) => oracle,
        Err(error) => {
            tracing::warn!(%error, exp, "exp grant skipped");
            return;
        }
    };
    let record = match progression.apply_exp_gain(exp) {
        Ok(record) => record,
        Err(error) => {
            tracing::warn!(%error, exp, "exp grant failed");
            return;
        }
    };

    let leveled_up = state
        .player
        .player_data()
        .is_some_and(|data| record.level > data.level);

    if let Some(data) = state.player.player_data_mut() {
        data.level = record.level.max(1);
        data.exp = record.exp;
        data.unspent_points = record.unspent_points;
        data.stats = record.stats;
        data.gold = record.gold;
        data.equip_bonuses = equipment_bonuses(&record.equipped, env.items().ok());
        data.equipped = record.equipped.clone();
        data.spells = record.spells.clone();
        // Inventory stays battle-local: drops collected mid-fight would be
        // clobbered by the persisted copy.
    }

    if leveled_up {
        let level = state.player.player_data().map_or(0, |d| d.level);
        state.player.recompute(RecomputeMode::RestoreToMax);
        state.push_log(format!("Level up! Now level {level}."), window);
    } else {
        state.player.recompute(RecomputeMode::PreserveCurrent);
    }

    if let Ok(store) = env.progress() {
        if let Err(error) = store.save(&record) {
            tracing::warn!(%error, "progress save failed");
        }
    }
}
