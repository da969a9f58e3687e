//! Turn-based battle resolution.
//!
//! [`BattleState`] is the root aggregate; the action functions re-exported
//! below are the only public mutations, and each returns a fresh successor
//! state instead of editing the one it was given. Collaborators
//! (catalogs, progression, persistence, events, RNG) arrive through
//! [`crate::env::BattleEnv`].

mod actions;
mod damage;
mod error;
mod rewards;
mod state;
mod upkeep;

pub use actions::{attack, cast_spell, enemy_turn, use_item};
pub use damage::CritProfile;
pub use error::ActionError;
pub use state::{BattleOutcome, BattleState, TurnSide};
pub use upkeep::UpkeepOutcome;
