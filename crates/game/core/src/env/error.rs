//! Errors surfaced by the environment aggregate and collaborators.

/// A required oracle was not provided to the [`super::BattleEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("enemy catalog not available")]
    EnemiesNotAvailable,

    #[error("spell catalog not available")]
    SpellsNotAvailable,

    #[error("item catalog not available")]
    ItemsNotAvailable,

    #[error("player template not available")]
    PlayerNotAvailable,

    #[error("progress store not available")]
    ProgressNotAvailable,

    #[error("progression collaborator not available")]
    ProgressionNotAvailable,

    #[error("event sink not available")]
    EventsNotAvailable,

    #[error("rng oracle not available")]
    RngNotAvailable,
}

/// The progression collaborator rejected an exp grant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("progression failed: {0}")]
pub struct ProgressionError(pub String);

/// The progress store could not persist an update.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("progress save failed: {0}")]
pub struct ProgressError(pub String);

/// A downstream event listener rejected an emission.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("event emission failed: {0}")]
pub struct EmitError(pub String);
