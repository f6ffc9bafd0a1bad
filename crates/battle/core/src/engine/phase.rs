use crate::error::{BattleError, ErrorSeverity};

/// Battle State Machine phases.
///
/// `Idle → AwaitingAction → Resolving → {AwaitingAction | Victory | Defeat}`,
/// with `reset` forcing `Idle` from anywhere.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    #[default]
    Idle,
    AwaitingAction,
    Resolving,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat)
    }

    /// Whether the machine may move from `self` to `next`.
    pub const fn can_transition(self, next: BattlePhase) -> bool {
        matches!(
            (self, next),
            (_, BattlePhase::Idle)
                | (BattlePhase::Idle, BattlePhase::AwaitingAction)
                | (BattlePhase::AwaitingAction, BattlePhase::Resolving)
                | (
                    BattlePhase::Resolving,
                    BattlePhase::AwaitingAction | BattlePhase::Victory | BattlePhase::Defeat
                )
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: BattlePhase, to: BattlePhase },

    #[error("no living combatant can take a turn")]
    NoLivingCombatants,
}

impl BattleError for PhaseError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PhaseError::InvalidTransition { .. } => ErrorSeverity::Validation,
            PhaseError::NoLivingCombatants => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PhaseError::InvalidTransition { .. } => "PHASE_INVALID_TRANSITION",
            PhaseError::NoLivingCombatants => "PHASE_NO_LIVING",
        }
    }
}

/// How a finished battle ended.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    /// No living enemies remain.
    Victory,
    /// No living allies remain.
    Defeat,
    /// The turn limit ran out.
    TurnLimit,
}

impl BattleOutcome {
    pub const fn phase(self) -> BattlePhase {
        match self {
            BattleOutcome::Victory => BattlePhase::Victory,
            BattleOutcome::Defeat | BattleOutcome::TurnLimit => BattlePhase::Defeat,
        }
    }
}
