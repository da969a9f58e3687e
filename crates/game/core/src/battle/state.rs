//! Battle state: the root aggregate for one encounter.

use crate::config::Tuning;
use crate::entity::{BuildError, EnemySpec, Entity, build_enemies, build_player};
use crate::env::BattleEnv;

/// Whose action is currently legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSide {
    Player,
    Enemy,
}

/// Terminal outcome, set exactly when `over` is true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// One encounter's full state.
///
/// # Invariants
///
/// - `result.is_some()` iff `over`.
/// - No enemy with zero HP survives a completed public operation; dead
///   enemies are pruned once their death processing finishes.
/// - The log is tail-truncated to the tuning's window.
///
/// # Aliasing discipline
///
/// Public actions never mutate the state they are given: each derives a
/// fresh state through [`BattleState::advance`], mutates only that copy,
/// and returns it. The caller's previous state stays usable for diffing
/// or rollback.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BattleState {
    pub player: Entity,
    /// Living enemies in encounter order; index 0 is the default target.
    pub enemies: Vec<Entity>,
    pub turn: TurnSide,
    pub over: bool,
    pub result: Option<BattleOutcome>,
    /// Human-readable event lines, newest last.
    pub log: Vec<String>,
    /// Start-of-turn counter; makes upkeep idempotent within one turn.
    pub turn_tick: u64,
    /// Base seed for deterministic combat rolls.
    pub seed: u64,
    /// Action sequence number, mixed into roll seeds.
    pub nonce: u64,
}

impl BattleState {
    /// Starts an encounter: player seeded from the base template plus any
    /// persisted progress, enemies built from the given specs.
    pub fn start(
        specs: &[EnemySpec],
        env: &BattleEnv<'_>,
        tuning: &Tuning,
        seed: u64,
    ) -> Result<Self, BuildError> {
        let template = env.player()?.base_template();
        let progress = env.progress().ok().and_then(|store| store.load());
        let player = build_player(&template, progress.as_ref(), env.items().ok());
        let enemies = build_enemies(specs, env, tuning)?;

        let mut state = Self {
            player,
            enemies,
            turn: TurnSide::Player,
            over: false,
            result: None,
            log: Vec::new(),
            turn_tick: 1,
            seed,
            nonce: 0,
        };
        let names: Vec<&str> = state.enemies.iter().map(|e| e.name.as_str()).collect();
        state.push_log(format!("Battle starts: {}!", names.join(", ")), tuning.log_window());
        Ok(state)
    }

    /// Derives the successor state every action mutates.
    ///
    /// A deep clone with a bumped nonce: the one place the copy discipline
    /// lives, so no action can accidentally alias the caller's state.
    pub(crate) fn advance(&self) -> BattleState {
        let mut next = self.clone();
        next.nonce += 1;
        next
    }

    /// Appends a log line, dropping the oldest beyond the window.
    pub(crate) fn push_log(&mut self, line: String, window: usize) {
        self.log.push(line);
        if self.log.len() > window {
            let excess = self.log.len() - window;
            self.log.drain(..excess);
        }
    }

    /// Index of the first living enemy, the default attack target.
    pub fn first_living_enemy(&self) -> Option<usize> {
        self.enemies.iter().position(Entity::is_alive)
    }

    pub fn any_enemy_alive(&self) -> bool {
        self.enemies.iter().any(Entity::is_alive)
    }

    /// Whether the player's pending action is suppressed by a stun
    /// registered at the current tick. UI callers should hand the turn
    /// straight back to [`crate::battle::enemy_turn`] when this is set.
    pub fn player_must_skip(&self) -> bool {
        self.player
            .last_upkeep
            .is_some_and(|mark| mark.tick == self.turn_tick && mark.skipped)
    }

    /// Removes dead enemies whose death processing has completed.
    pub(crate) fn prune_dead(&mut self) {
        self.enemies.retain(|enemy| {
            enemy.is_alive()
                || enemy
                    .enemy_data()
                    .is_some_and(|data| !data.death_processed)
        });
    }

    /// End-condition check, run after every mutation that can change HP or
    /// roster membership. All enemies dead wins even when the player died
    /// in the same action batch: the mutual-knockout tie-break favors the
    /// player.
    pub(crate) fn check_end(&mut self, window: usize) {
        debug_assert_eq!(self.over, self.result.is_some());
        if self.over {
            return;
        }
        if !self.any_enemy_alive() {
            self.over = true;
            self.result = Some(BattleOutcome::Victory);
            self.push_log("Victory!".to_owned(), window);
        } else if !self.player.is_alive() {
            self.over = true;
            self.result = Some(BattleOutcome::Defeat);
            self.push_log("You have fallen...".to_owned(), window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CombatStats, EnemyData, EntityKind, ResourcePool};
    use crate::scaling::ScaledStats;
    use crate::stats::Attributes;
    use crate::status::Cooldowns;

    fn test_enemy(hp: u32) -> Entity {
        let base = ScaledStats {
            hp_max: hp.max(1),
            mp_max: 0,
            atk: 1,
            matk: 1,
            def: 0,
            mdef: 0,
            exp_reward: 0,
        };
        let mut entity = Entity {
            id: "dummy".to_owned(),
            name: "Dummy".to_owned(),
            resources: ResourcePool::at_max(base.hp_max, 0),
            combat: CombatStats {
                atk: 1,
                def: 0,
                matk: 1,
                mdef: 0,
            },
            statuses: Vec::new(),
            cooldowns: Cooldowns::new(),
            kind: EntityKind::Enemy(EnemyData {
                base,
                exp_reward: 0,
                element: None,
                element_mods: Default::default(),
                drops: Vec::new(),
                death_processed: false,
            }),
            last_upkeep: None,
        };
        entity.resources.hp = hp;
        entity
    }

    fn test_state(enemies: Vec<Entity>) -> BattleState {
        let template = crate::env::PlayerTemplate {
            stats: Attributes::new(3, 3, 3, 3),
            ..Default::default()
        };
        BattleState {
            player: crate::entity::build_player(&template, None, None),
            enemies,
            turn: TurnSide::Player,
            over: false,
            result: None,
            log: Vec::new(),
            turn_tick: 1,
            seed: 0,
            nonce: 0,
        }
    }

    #[test]
    fn log_truncates_to_window() {
        let mut state = test_state(vec![test_enemy(5)]);
        for i in 0..60 {
            state.push_log(format!("line {i}"), 50);
        }
        assert_eq!(state.log.len(), 50);
        assert_eq!(state.log.first().unwrap(), "line 10");
        assert_eq!(state.log.last().unwrap(), "line 59");
    }

    #[test]
    fn advance_leaves_original_untouched() {
        let state = test_state(vec![test_enemy(5)]);
        let mut next = state.advance();
        next.player.resources.hp = 1;
        next.enemies[0].resources.hp = 0;
        next.log.push("mutated".to_owned());

        assert_eq!(state.player.resources.hp, state.player.resources.hp_max);
        assert_eq!(state.enemies[0].resources.hp, 5);
        assert!(state.log.is_empty());
        assert_eq!(next.nonce, state.nonce + 1);
    }

    #[test]
    fn mutual_knockout_is_a_victory() {
        let mut state = test_state(vec![test_enemy(0)]);
        state.enemies[0].enemy_data_mut().unwrap().death_processed = true;
        state.player.resources.hp = 0;

        state.check_end(50);
        assert!(state.over);
        assert_eq!(state.result, Some(BattleOutcome::Victory));
    }

    #[test]
    fn player_death_with_living_enemies_is_defeat() {
        let mut state = test_state(vec![test_enemy(5)]);
        state.player.resources.hp = 0;

        state.check_end(50);
        assert_eq!(state.result, Some(BattleOutcome::Defeat));
        assert!(state.over);
    }

    #[test]
    fn prune_keeps_unprocessed_dead_enemies() {
        let mut state = test_state(vec![test_enemy(0), test_enemy(5)]);
        state.prune_dead();
        // Death not yet processed: the corpse stays for reward dispatch.
        assert_eq!(state.enemies.len(), 2);

        state.enemies[0].enemy_data_mut().unwrap().death_processed = true;
        state.prune_dead();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].resources.hp, 5);
    }
}
