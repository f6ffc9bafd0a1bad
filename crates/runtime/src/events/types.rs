//! Event types for different topics.

use serde::{Deserialize, Serialize};

use battle_core::{
    ActionId, BattleOutcome, CombatantId, LegalAction, MarkEvent, ReactionId, TurnStart,
};

use crate::presentation::{PresentationStage, StageTicket};

/// Events related to turn management
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A combatant's turn began.
    Started {
        actor: CombatantId,
        round: u32,
        turn: u32,
    },

    /// The actor is being asked for a selection.
    AwaitingInput {
        actor: CombatantId,
        attempt: u32,
        legal: Vec<LegalAction>,
    },

    /// A selection (or its fallback) was committed and paid for.
    Committed {
        actor: CombatantId,
        action: ActionId,
        charge: u32,
        targets: Vec<CombatantId>,
        nonce: u64,
        fallback: bool,
    },
}

impl From<&TurnStart> for TurnEvent {
    fn from(start: &TurnStart) -> Self {
        TurnEvent::Started {
            actor: start.actor,
            round: start.round,
            turn: start.turn,
        }
    }
}

/// Events emitted while an action resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionEvent {
    /// The pipeline started executing a committed action.
    Resolving {
        actor: CombatantId,
        action: ActionId,
        targets: Vec<CombatantId>,
    },

    /// One beat of damage landed.
    DamageApplied {
        source: CombatantId,
        target: CombatantId,
        amount: u32,
        remaining: u32,
        killed: bool,
        /// Set when the damage came from a mark reaction.
        reaction: Option<ReactionId>,
    },

    /// HP or another resource was restored.
    Restored {
        source: CombatantId,
        target: CombatantId,
        amount: u32,
    },

    /// Timed-hit CP handed back to the actor after the hits landed.
    ChargeRefunded { actor: CombatantId, amount: u32 },

    /// The pipeline ran to completion.
    Resolved {
        actor: CombatantId,
        action: ActionId,
        total_damage: u32,
    },

    /// A stage stopped the chain without faulting.
    Halted {
        actor: CombatantId,
        action: ActionId,
        stage: String,
    },

    /// The requested selection was replaced by the fallback action.
    Fallback {
        actor: CombatantId,
        requested: Option<ActionId>,
        reason: String,
    },

    /// The pipeline faulted; the turn degrades to the fallback action.
    Faulted {
        actor: CombatantId,
        action: ActionId,
        error: String,
    },
}

/// Requests and signals for presentation collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// Play a stage, then acknowledge `ticket` through the runtime handle.
    AnimationStageRequest {
        ticket: StageTicket,
        stage: PresentationStage,
        actor: CombatantId,
        target: Option<CombatantId>,
        duration_hint_ms: u64,
    },

    /// A stage was acknowledged.
    StageCompleted { ticket: StageTicket },

    /// An advisory animation lock was raised or released.
    LockChanged { locked: bool },
}

/// Battle lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    Started { combatants: usize, seed: u64 },
    Ended { outcome: BattleOutcome, turns: u32 },
    Reset,
}

/// Re-exported so mark-changed payloads keep a single definition.
pub type MarkChanged = MarkEvent;
