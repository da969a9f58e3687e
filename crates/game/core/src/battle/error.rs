//! Action legality errors.

use crate::env::OracleError;

/// Why a requested action could not be taken.
///
/// These never surface to callers of the public battle operations: an
/// illegal action resolves to an unchanged successor state. They exist so
/// the validation helpers compose with `?` and so rejection diagnostics
/// name a reason.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("the battle is already over")]
    BattleOver,

    #[error("it is not that side's turn")]
    NotYourTurn,

    #[error("the actor is stunned this turn")]
    Stunned,

    #[error("no living enemy at the requested target")]
    InvalidTarget,

    #[error("no spell record for id: {id}")]
    UnknownSpell { id: String },

    #[error("spell not in the player's spellbook: {id}")]
    SpellNotKnown { id: String },

    #[error("{id} is still cooling down ({turns} turns left)")]
    OnCooldown { id: String, turns: u32 },

    #[error("not enough MP: need {cost}, have {have}")]
    InsufficientMana { cost: u32, have: u32 },

    #[error("nothing to restore")]
    NothingToRestore,

    #[error("item not carried: {id}")]
    NotCarried { id: String },

    #[error("item cannot be used in battle: {id}")]
    NotUsable { id: String },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}
