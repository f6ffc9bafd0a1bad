//! Authoritative battle state.

use std::collections::VecDeque;

use crate::engine::BattlePhase;
use crate::judgment::JudgmentRecorder;

use super::combatant::{Combatant, CombatantId, Side};

/// Errors raised while binding combatants to a battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitializationError {
    #[error("combatant {0} is bound twice")]
    DuplicateCombatant(CombatantId),

    #[error("battle needs at least one living combatant on the {0} side")]
    EmptySide(Side),
}

/// Turn bookkeeping owned by the battle state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// 1-based round number, 0 before the battle starts.
    pub round: u32,
    /// Combatants still to act this round, in order.
    pub queue: VecDeque<CombatantId>,
    /// Combatant whose turn it currently is.
    pub current: Option<CombatantId>,
    /// Total turns started since the battle began.
    pub turns_taken: u32,
    /// Commit sequence number, mixed into judgment seeds.
    pub nonce: u64,
}

/// Complete in-memory state of one battle session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub combatants: Vec<Combatant>,
    pub phase: BattlePhase,
    pub turn: TurnState,
    /// Every judgment committed since the battle started.
    pub judgments: JudgmentRecorder,
}

impl BattleState {
    /// Binds combatants to a fresh battle in the `Idle` phase.
    pub fn new(combatants: Vec<Combatant>) -> Result<Self, InitializationError> {
        for (index, combatant) in combatants.iter().enumerate() {
            if combatants[..index].iter().any(|c| c.id == combatant.id) {
                return Err(InitializationError::DuplicateCombatant(combatant.id));
            }
        }
        for side in [Side::Ally, Side::Enemy] {
            if !combatants.iter().any(|c| c.side == side && c.is_alive()) {
                return Err(InitializationError::EmptySide(side));
            }
        }

        Ok(Self {
            combatants,
            phase: BattlePhase::Idle,
            turn: TurnState::default(),
            judgments: JudgmentRecorder::new(),
        })
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Living members of a side, in binding order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .iter()
            .filter(move |c| c.side == side && c.is_alive())
    }

    pub fn has_living(&self, side: Side) -> bool {
        self.living(side).next().is_some()
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.turn.current
    }
}
