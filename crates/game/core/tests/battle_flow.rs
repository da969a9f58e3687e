//! End-to-end battle scenarios over an in-memory content catalog.

use std::sync::Mutex;

use rpg_core::{
    BattleEnv, BattleEvent, BattleOutcome, BattleState, EmitError, EnemyOracle, EnemySpec,
    EnemyTemplate, EventSink, ItemDef, ItemOracle, PlayerOracle, PlayerTemplate, ProgressError,
    ProgressRecord, ProgressStore, ProgressionError, ProgressionOracle, RngOracle, SpellDef,
    SpellOracle, Tuning, TurnSide, attack, cast_spell, enemy_turn, use_item,
};

/// Deterministic "never crit" RNG: every unit roll lands just below 1.0.
struct NeverCrit;

impl RngOracle for NeverCrit {
    fn next_u32(&self, _seed: u64) -> u32 {
        u32::MAX
    }
}

struct TestCatalog;

impl EnemyOracle for TestCatalog {
    fn enemy(&self, id: &str) -> Option<EnemyTemplate> {
        let raw = match id {
            "slime" => {
                r#"{
                    "id": "slime", "name": "Slime",
                    "hp_max": 10, "atk": 4, "def": 0, "exp_reward": 3,
                    "drops": [{ "item_id": "goo" }]
                }"#
            }
            "imp" => {
                r#"{
                    "id": "imp", "name": "Imp",
                    "hp_max": 30, "atk": 5, "def": 1, "exp_reward": 5,
                    "element_mods": { "fire": 2.0 }
                }"#
            }
            _ => return None,
        };
        Some(serde_json::from_str(raw).unwrap())
    }
}

impl SpellOracle for TestCatalog {
    fn spell(&self, id: &str) -> Option<SpellDef> {
        let raw = match id {
            "fire_bolt" => {
                r#"{
                    "id": "fire_bolt", "cost": 2,
                    "kind": "damage", "power": 1.0, "element": "fire",
                    "can_crit": false
                }"#
            }
            "venom" => {
                r#"{
                    "id": "venom", "cost": 2,
                    "kind": "damage", "power": 0.5, "can_crit": false,
                    "statuses": [{ "id": "poison", "kind": "dot", "value": 4, "turns": 3 }]
                }"#
            }
            "heal" => r#"{ "id": "heal", "cost": 2, "kind": "heal", "amount": 10 }"#,
            "flash" => {
                r#"{
                    "id": "flash", "cost": 1,
                    "kind": "damage", "power": 0.1, "can_crit": false,
                    "statuses": [{ "kind": "stun", "turns": 1 }]
                }"#
            }
            _ => return None,
        };
        Some(serde_json::from_str(raw).unwrap())
    }
}

impl ItemOracle for TestCatalog {
    fn item(&self, id: &str) -> Option<ItemDef> {
        let raw = match id {
            "potion" => r#"{ "id": "potion", "effect": "restore_hp", "amount": 20 }"#,
            "bomb" => r#"{ "id": "bomb", "effect": "damage", "power": 2.0, "aoe": true, "can_crit": false }"#,
            _ => return None,
        };
        Some(serde_json::from_str(raw).unwrap())
    }
}

impl PlayerOracle for TestCatalog {
    fn base_template(&self) -> PlayerTemplate {
        serde_json::from_str(
            r#"{
                "name": "Hero",
                "stats": { "str": 4, "dex": 2, "mag": 5, "con": 5 },
                "spells": ["fire_bolt", "venom", "heal", "flash"],
                "inventory": { "potion": 1, "bomb": 2 }
            }"#,
        )
        .unwrap()
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<BattleEvent>>);

impl EventSink for RecordingSink {
    fn emit(&self, event: &BattleEvent) -> Result<(), EmitError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(())
    }
}

impl RecordingSink {
    fn kills(&self) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, BattleEvent::EnemySlain { .. }))
            .count()
    }
}

/// Grants exp by leaving the record untouched apart from the exp total;
/// counts invocations.
#[derive(Default)]
struct CountingProgression {
    calls: Mutex<u32>,
    level: u32,
}

impl ProgressionOracle for CountingProgression {
    fn apply_exp_gain(&self, amount: u32) -> Result<ProgressRecord, ProgressionError> {
        *self.calls.lock().unwrap() += 1;
        Ok(ProgressRecord {
            level: self.level.max(1),
            exp: u64::from(amount),
            stats: TestCatalog.base_template().stats,
            spells: TestCatalog.base_template().spells,
            ..ProgressRecord::default()
        })
    }
}

#[derive(Default)]
struct MemoryStore(Mutex<Option<ProgressRecord>>);

impl ProgressStore for MemoryStore {
    fn load(&self) -> Option<ProgressRecord> {
        self.0.lock().unwrap().clone()
    }

    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, ProgressError> {
        *self.0.lock().unwrap() = Some(record.clone());
        Ok(record.clone())
    }
}

fn start(enemy_ids: &[&str], env: &BattleEnv<'_>, tuning: &Tuning) -> BattleState {
    let specs: Vec<EnemySpec> = enemy_ids.iter().map(|id| EnemySpec::parse(id)).collect();
    BattleState::start(&specs, env, tuning, 7).unwrap()
}

#[test]
fn attack_until_victory_dispatches_rewards_once() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let sink = RecordingSink::default();
    let progression = CountingProgression {
        level: 2,
        ..CountingProgression::default()
    };
    let store = MemoryStore::default();
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_items(&catalog)
        .with_player(&catalog)
        .with_progression(&progression)
        .with_progress(&store)
        .with_events(&sink)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let mut state = start(&["slime"], &env, &tuning);
    for _ in 0..10 {
        if state.over {
            break;
        }
        state = attack(&state, None, &env, &tuning);
        if !state.over {
            state = enemy_turn(&state, &env, &tuning);
        }
    }

    assert!(state.over);
    assert_eq!(state.result, Some(BattleOutcome::Victory));
    assert_eq!(*progression.calls.lock().unwrap(), 1);
    assert_eq!(sink.kills(), 1);
    // The drop landed in the inventory and was announced.
    let data = state.player.player_data().unwrap();
    assert_eq!(data.inventory.get("goo"), Some(&1));
    assert!(sink.0.lock().unwrap().iter().any(|e| matches!(
        e,
        BattleEvent::ItemCollected { item_id, qty: 1 } if item_id == "goo"
    )));
    // Level-up from the progression record refilled resources.
    assert_eq!(data.level, 2);
    assert_eq!(state.player.resources.hp, state.player.resources.hp_max);
    // Progress was persisted.
    assert!(store.load().is_some_and(|record| record.level == 2));

    // Post-battle actions are inert.
    let after = attack(&state, None, &env, &tuning);
    assert_eq!(after.enemies, state.enemies);
    assert_eq!(after.log, state.log);
}

#[test]
fn dot_kill_during_enemy_upkeep_rewards_exactly_once() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let sink = RecordingSink::default();
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_player(&catalog)
        .with_events(&sink)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let mut state = start(&["slime"], &env, &tuning);
    // matk 12 vs mdef 0, power 0.5 → 6 damage; slime at 4 HP with a
    // 4-per-turn poison dies in its own upkeep before it can swing.
    state = cast_spell(&state, "venom", None, &env, &tuning);
    assert_eq!(state.enemies[0].resources.hp, 4);
    assert_eq!(state.turn, TurnSide::Enemy);

    let before_hp = state.player.resources.hp;
    state = enemy_turn(&state, &env, &tuning);

    assert!(state.over);
    assert_eq!(state.result, Some(BattleOutcome::Victory));
    assert_eq!(state.player.resources.hp, before_hp, "no swing got through");
    assert_eq!(sink.kills(), 1);
}

#[test]
fn fire_spell_doubles_against_fire_weak_enemy() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_player(&catalog)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let state = start(&["imp"], &env, &tuning);
    let next = cast_spell(&state, "fire_bolt", None, &env, &tuning);

    // matk 12 vs mdef 1 → 11 base, fire ×2.0 → 22.
    assert_eq!(next.enemies[0].resources.hp, 30 - 22);
    // Hyphenated spelling resolves to the same record.
    let hyphenated = cast_spell(&state, "fire-bolt", None, &env, &tuning);
    assert_eq!(hyphenated.enemies[0].resources.hp, 30 - 22);
}

#[test]
fn stunned_enemy_skips_its_swing() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_player(&catalog)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let mut state = start(&["imp"], &env, &tuning);
    state = cast_spell(&state, "flash", None, &env, &tuning);
    assert!(state.enemies[0].is_stunned());

    let before_hp = state.player.resources.hp;
    state = enemy_turn(&state, &env, &tuning);
    assert_eq!(state.player.resources.hp, before_hp);
    // The stun expired with its one activation.
    assert!(!state.enemies[0].is_stunned());

    // Next phase the imp swings again: atk 5 vs def 3 → 2.
    state = attack(&state, None, &env, &tuning);
    state = enemy_turn(&state, &env, &tuning);
    assert_eq!(state.player.resources.hp, before_hp - 2);
}

#[test]
fn aoe_item_hits_every_living_enemy_and_consumes_one_unit() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_items(&catalog)
        .with_player(&catalog)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let state = start(&["slime", "slime"], &env, &tuning);
    // atk 10 vs def 0, power 2.0 → 20 per slime: both die.
    let next = use_item(&state, "bomb", None, &env, &tuning);

    assert!(next.over);
    assert_eq!(next.result, Some(BattleOutcome::Victory));
    assert_eq!(
        next.player.player_data().unwrap().inventory.get("bomb"),
        Some(&1)
    );
}

#[test]
fn heal_is_rejected_at_full_health_and_works_after_damage() {
    let catalog = TestCatalog;
    let rng = NeverCrit;
    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_spells(&catalog)
        .with_player(&catalog)
        .with_rng(&rng);
    let tuning = Tuning::new();

    let state = start(&["imp"], &env, &tuning);
    // Full HP: the cast is a no-op, no mana spent, still the player's turn.
    let rejected = cast_spell(&state, "heal", None, &env, &tuning);
    assert_eq!(rejected.player, state.player);
    assert_eq!(rejected.turn, TurnSide::Player);

    // Take a hit, then heal.
    let mut state = attack(&state, None, &env, &tuning);
    state = enemy_turn(&state, &env, &tuning);
    let hurt_hp = state.player.resources.hp;
    assert!(hurt_hp < state.player.resources.hp_max);

    let mp_before = state.player.resources.mp;
    state = cast_spell(&state, "heal", None, &env, &tuning);
    assert_eq!(state.player.resources.hp, (hurt_hp + 10).min(state.player.resources.hp_max));
    assert_eq!(state.player.resources.mp, mp_before - 2);
}

#[test]
fn persisted_progress_seeds_the_player() {
    let catalog = TestCatalog;
    let store = MemoryStore::default();
    store
        .save(&ProgressRecord {
            level: 4,
            exp: 120,
            stats: rpg_core::Attributes::new(6, 2, 5, 5),
            spells: vec!["fire_bolt".to_owned()],
            ..ProgressRecord::default()
        })
        .unwrap();

    let env = BattleEnv::empty()
        .with_enemies(&catalog)
        .with_player(&catalog)
        .with_progress(&store);
    let tuning = Tuning::new();

    let state = start(&["slime"], &env, &tuning);
    let data = state.player.player_data().unwrap();
    assert_eq!(data.level, 4);
    assert_eq!(data.exp, 120);
    assert_eq!(data.spells, vec!["fire_bolt".to_owned()]);
    // hp_max = 20 + 8×5 + 2×4 = 68, at full.
    assert_eq!(state.player.resources.hp, 68);
}
