//! Turn order.
//!
//! Rounds are ordered by speed (descending) with ties broken by id. Dead
//! combatants are skipped when their slot comes up, and a fresh round is
//! built from the living once the queue drains.

use std::collections::VecDeque;

use crate::mark::{MarkEngine, MarkEvent};
use crate::state::CombatantId;

use super::{BattleEngine, BattleOutcome, PhaseError};

/// A combatant's turn has begun.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnStart {
    pub actor: CombatantId,
    pub round: u32,
    /// 1-based count of turns started in this battle.
    pub turn: u32,
    /// The actor's mark, if it ran out as the turn began.
    pub expired: Option<MarkEvent>,
}

/// What follows a resolved action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    NextTurn(TurnStart),
    Ended(BattleOutcome),
}

impl<'a> BattleEngine<'a> {
    /// Turn order for a new round, built from the living.
    pub fn round_order(&self) -> VecDeque<CombatantId> {
        let mut living: Vec<_> = self
            .state
            .combatants
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.stats.speed, c.id))
            .collect();
        living.sort_by(|(speed_a, id_a), (speed_b, id_b)| {
            speed_b.cmp(speed_a).then(id_a.cmp(id_b))
        });
        living.into_iter().map(|(_, id)| id).collect()
    }

    /// Pops the next living actor and starts its turn.
    pub(super) fn advance_turn(&mut self) -> Result<TurnStart, PhaseError> {
        let actor = loop {
            if self.state.turn.queue.is_empty() {
                let order = self.round_order();
                if order.is_empty() {
                    return Err(PhaseError::NoLivingCombatants);
                }
                self.state.turn.round += 1;
                tracing::debug!(
                    target: "battle::engine",
                    round = self.state.turn.round,
                    order = ?order,
                    "round started"
                );
                self.state.turn.queue = order;
            }

            let Some(next) = self.state.turn.queue.pop_front() else {
                continue;
            };
            if self.state.combatant(next).is_some_and(|c| c.is_alive()) {
                break next;
            }
        };

        self.state.turn.current = Some(actor);
        self.state.turn.turns_taken += 1;
        if let Some(combatant) = self.state.combatant_mut(actor) {
            combatant.turn_counter += 1;
        }
        let expired = MarkEngine::expire(self.state, actor);

        tracing::debug!(
            target: "battle::engine",
            %actor,
            round = self.state.turn.round,
            turn = self.state.turn.turns_taken,
            "turn started"
        );

        Ok(TurnStart {
            actor,
            round: self.state.turn.round,
            turn: self.state.turn.turns_taken,
            expired,
        })
    }
}
