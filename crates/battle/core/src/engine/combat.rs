//! Effect application through the Resource Ledger.
//!
//! The runtime pipeline calls these one beat at a time so presentation can
//! interleave; each call is a complete, consistent state change on its own.

use crate::action::ActionEffect;
use crate::economy::{HitSequence, scale};
use crate::mark::{MarkEngine, MarkEvent, ReactionDefinition};
use crate::state::{CombatantId, DamageOutcome, LedgerError, ResourceKind, ResourceLedger};

use super::{BattleEngine, Committed};

/// One hit landing on one combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitOutcome {
    pub source: CombatantId,
    pub target: CombatantId,
    pub damage: DamageOutcome,
    /// Mark removed because the hit was lethal.
    pub cleared: Option<MarkEvent>,
}

/// Bonus damage from a mark detonation.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionOutcome {
    pub reaction: ReactionDefinition,
    pub hit: HitOutcome,
}

/// Everything the mark rules of one action changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkPass {
    pub events: Vec<MarkEvent>,
    pub reactions: Vec<ReactionOutcome>,
}

impl<'a> BattleEngine<'a> {
    /// Damage beats of a committed action against one target.
    pub fn plan_hits(
        &self,
        committed: &Committed,
        target: CombatantId,
    ) -> Result<HitSequence, LedgerError> {
        let source = committed.actor();
        let attacker = self
            .state
            .combatant(source)
            .ok_or(LedgerError::UnknownCombatant(source))?;
        let defender = self
            .state
            .combatant(target)
            .ok_or(LedgerError::UnknownCombatant(target))?;
        Ok(committed.effect.plan_hits(
            &attacker.stats,
            &defender.stats,
            committed.multiplier,
            committed.timed.as_ref(),
        ))
    }

    /// Applies one hit. A lethal hit clears the target's mark.
    pub fn apply_hit(
        &mut self,
        source: CombatantId,
        target: CombatantId,
        amount: u32,
    ) -> Result<HitOutcome, LedgerError> {
        let damage = self.state.damage(target, amount)?;
        let cleared = if damage.killed {
            tracing::info!(target: "battle::engine", %source, combatant = %target, "combatant defeated");
            MarkEngine::clear(self.state, target, Some(source))
        } else {
            None
        };
        tracing::debug!(
            target: "battle::engine",
            %source,
            combatant = %target,
            applied = damage.applied,
            remaining = damage.remaining,
            "hit applied"
        );
        Ok(HitOutcome {
            source,
            target,
            damage,
            cleared,
        })
    }

    /// Applies a support effect to one target. Returns the amount restored.
    pub fn apply_support(
        &mut self,
        committed: &Committed,
        target: CombatantId,
    ) -> Result<u32, LedgerError> {
        let source = committed.actor();
        match &committed.effect {
            ActionEffect::Heal { .. } => {
                let caster = self
                    .state
                    .combatant(source)
                    .ok_or(LedgerError::UnknownCombatant(source))?
                    .stats;
                let amount = committed.effect.healing(&caster, committed.multiplier);
                self.state.heal(target, amount)
            }
            ActionEffect::Restore { resource, amount } => {
                self.state
                    .refund(target, *resource, scale(*amount, committed.multiplier))
            }
            _ => Ok(0),
        }
    }

    /// Runs the action's mark rules and applies any reaction damage.
    pub fn apply_marks(&mut self, committed: &Committed) -> MarkPass {
        if committed.definition.mark_rules.is_empty() {
            return MarkPass::default();
        }

        let outcomes = self.env.mark_engine().apply_rules(
            self.state,
            &committed.definition.mark_rules,
            &committed.judgment,
            &committed.targets,
        );

        let mut pass = MarkPass::default();
        for outcome in outcomes {
            let target = outcome.event.target;
            pass.events.push(outcome.event);
            let Some(reaction) = outcome.reaction else {
                continue;
            };
            match self.apply_hit(committed.actor(), target, reaction.bonus_damage) {
                Ok(hit) => {
                    pass.events.extend(hit.cleared);
                    pass.reactions.push(ReactionOutcome { reaction, hit });
                }
                Err(error) => tracing::warn!(
                    target: "battle::engine",
                    %error,
                    "reaction damage skipped"
                ),
            }
        }
        pass
    }

    /// Returns the timed-hit CP refund to the actor.
    pub fn refund_charge(&mut self, committed: &Committed) -> Result<u32, LedgerError> {
        let refund = committed.timed.map(|t| t.cp_refund).unwrap_or_default();
        if refund == 0 {
            return Ok(0);
        }
        self.state.refund(committed.actor(), ResourceKind::Cp, refund)
    }
}
