//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, input providers, and the battle
//! engine so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{BattleOutcome, CommitError, InitializationError, PhaseError, Side};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{side} action provider not set")]
    ProviderNotSet { side: Side },

    #[error("action provider channel closed")]
    ProviderChannelClosed,

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires battle content before building")]
    MissingContent,

    #[error("failed to bind combatants to the battle")]
    Initialization(#[from] InitializationError),

    #[error("battle already ended: {0}")]
    BattleOver(BattleOutcome),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}
