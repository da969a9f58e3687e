//! Fire-and-forget battle event notifications.
//!
//! External quest tracking listens for kills and item pickups. Emission is
//! best-effort: the engine swallows sink failures at the call site (with a
//! diagnostic log) and never depends on a return value or ordering
//! guarantee from downstream listeners.

use super::error::EmitError;

/// Typed battle notification for external listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    EnemySlain { enemy_id: String, name: String },
    ItemCollected { item_id: String, qty: u32 },
}

/// Notification sink for battle events.
///
/// Implementations may use interior mutability; the engine holds a shared
/// reference only.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BattleEvent) -> Result<(), EmitError>;
}
