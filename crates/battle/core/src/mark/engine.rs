//! Mark rule evaluation against committed judgments.

use crate::action::TargetShape;
use crate::economy::TimedGrade;
use crate::error::{BattleError, ErrorSeverity};
use crate::judgment::{ActionJudgment, TargetJudgment};
use crate::rng::RngOracle;
use crate::state::{BattleState, CombatantId};

use super::definition::{ElementId, MarkId, MarkRegistry, MarkRule, MarkRuleKind};
use super::interaction::{MarkInteraction, resolve_interaction};
use super::reaction::{ReactionDefinition, ReactionId, ReactionKey, ReactionTable};

/// Battle-wide tuning for mark qualification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkSettings {
    /// Area rules without their own chance start from this probability.
    pub area_base_chance: f32,
    /// Added to the area chance per committed charge point.
    pub area_per_cp_bonus: f32,
    /// Charge a single-target rule with `requires_cp` needs.
    pub single_min_cp: u32,
    /// Floor for `requires_timed_success`, raised further by the rule's own grade.
    pub single_min_grade: TimedGrade,
}

impl Default for MarkSettings {
    fn default() -> Self {
        Self {
            area_base_chance: 0.35,
            area_per_cp_bonus: 0.15,
            single_min_cp: 1,
            single_min_grade: TimedGrade::Success,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkChangeReason {
    Applied,
    Refreshed,
    Detonated,
    Expired,
    /// Removed by death or battle reset.
    Cleared,
}

/// Observable change to one combatant's mark slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkEvent {
    pub target: CombatantId,
    pub mark: MarkId,
    pub element: ElementId,
    pub reason: MarkChangeReason,
    /// Combatant whose action caused the change, if any.
    pub actor: Option<CombatantId>,
    pub reaction: Option<ReactionId>,
}

/// A mark event plus the reaction it triggered.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkOutcome {
    pub event: MarkEvent,
    pub reaction: Option<ReactionDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarkError {
    #[error("mark {0} is not registered")]
    UnknownMark(MarkId),

    #[error("combatant {0} is not bound to this battle")]
    UnknownCombatant(CombatantId),

    #[error("slot of {target} holds {existing} and cannot take {incoming} without a blow-up")]
    SlotOccupied {
        target: CombatantId,
        existing: MarkId,
        incoming: MarkId,
    },
}

impl BattleError for MarkError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MarkError::UnknownMark(_) | MarkError::UnknownCombatant(_) => {
                ErrorSeverity::Validation
            }
            MarkError::SlotOccupied { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MarkError::UnknownMark(_) => "MARK_UNKNOWN",
            MarkError::UnknownCombatant(_) => "MARK_UNKNOWN_COMBATANT",
            MarkError::SlotOccupied { .. } => "MARK_SLOT_OCCUPIED",
        }
    }
}

/// Evaluates an action's mark rules against its resolved targets.
///
/// Rolls come from the per-target judgment, so replaying a judgment against
/// the same target list reproduces every qualification decision.
pub struct MarkEngine<'a> {
    marks: &'a MarkRegistry,
    reactions: &'a ReactionTable,
    settings: &'a MarkSettings,
    rng: &'a dyn RngOracle,
}

impl<'a> MarkEngine<'a> {
    pub fn new(
        marks: &'a MarkRegistry,
        reactions: &'a ReactionTable,
        settings: &'a MarkSettings,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            marks,
            reactions,
            settings,
            rng,
        }
    }

    /// Whether `rule` fires against `target` for this commit.
    pub fn qualifies(
        &self,
        rule: &MarkRule,
        rule_index: usize,
        judgment: &ActionJudgment,
        target: &TargetJudgment,
    ) -> bool {
        if !rule.gates.charge_allows(judgment.cp_spent) {
            return false;
        }

        match judgment.shape {
            TargetShape::Single => {
                if rule.gates.requires_cp && judgment.cp_spent < self.settings.single_min_cp {
                    return false;
                }
                let floor = rule.gates.min_grade.max(self.settings.single_min_grade);
                !(rule.gates.requires_timed_success && judgment.timed_grade < floor)
            }
            TargetShape::All => {
                let chance = self.area_chance(rule, judgment.cp_spent);
                self.rng.chance(target.roll_seed(rule_index as u32), chance)
            }
        }
    }

    /// `clamp01(base + cp_spent * per_cp_bonus)`; the rule's own chance replaces the base.
    pub fn area_chance(&self, rule: &MarkRule, cp_spent: u32) -> f32 {
        let base = rule.chance.unwrap_or(self.settings.area_base_chance);
        (base + cp_spent as f32 * self.settings.area_per_cp_bonus).clamp(0.0, 1.0)
    }

    /// Runs every rule, in order, against every living target, in order.
    ///
    /// Rule failures are logged and skipped so one bad rule cannot abort the
    /// rest of the action.
    pub fn apply_rules(
        &self,
        state: &mut BattleState,
        rules: &[MarkRule],
        judgment: &ActionJudgment,
        targets: &[TargetJudgment],
    ) -> Vec<MarkOutcome> {
        let mut outcomes = Vec::new();
        for target in targets {
            for (rule_index, rule) in rules.iter().enumerate() {
                let alive = state
                    .combatant(target.target)
                    .is_some_and(|c| c.is_alive());
                if !alive {
                    break;
                }
                match self.apply_rule(state, rule, rule_index, judgment, target) {
                    Ok(Some(outcome)) => outcomes.push(outcome),
                    Ok(None) => {}
                    Err(error) if error.severity().is_internal() => {
                        tracing::error!(
                            target: "battle::mark",
                            code = error.error_code(),
                            %error,
                            "mark rule violated slot invariant"
                        );
                    }
                    Err(error) => {
                        tracing::warn!(
                            target: "battle::mark",
                            code = error.error_code(),
                            %error,
                            "mark rule skipped"
                        );
                    }
                }
            }
        }
        outcomes
    }

    /// Evaluates a single rule against a single target.
    pub fn apply_rule(
        &self,
        state: &mut BattleState,
        rule: &MarkRule,
        rule_index: usize,
        judgment: &ActionJudgment,
        target: &TargetJudgment,
    ) -> Result<Option<MarkOutcome>, MarkError> {
        let definition = self
            .marks
            .get(rule.mark)
            .ok_or(MarkError::UnknownMark(rule.mark))?;

        if !self.qualifies(rule, rule_index, judgment, target) {
            tracing::trace!(
                target: "battle::mark",
                mark = %rule.mark,
                combatant = %target.target,
                "rule did not qualify"
            );
            return Ok(None);
        }

        let combatant = state
            .combatant_mut(target.target)
            .ok_or(MarkError::UnknownCombatant(target.target))?;
        let owner_turn = combatant.turn_counter;
        let actor = Some(judgment.source);

        let reason = match (rule.kind, resolve_interaction(combatant.mark.element(), definition)) {
            (MarkRuleKind::Apply, MarkInteraction::Apply) => MarkChangeReason::Applied,
            (_, MarkInteraction::Refresh) => MarkChangeReason::Refreshed,
            (kind, MarkInteraction::BlowUp { existing }) => {
                let Some(active) = combatant.mark.current().copied() else {
                    return Ok(None);
                };
                if kind == MarkRuleKind::Apply || rule.consume_on_detonate {
                    combatant.mark.clear();
                }
                return Ok(Some(self.detonated(
                    target.target,
                    active.mark,
                    existing,
                    definition.element,
                    rule,
                    actor,
                )));
            }
            // Detonating an empty slot places nothing.
            (MarkRuleKind::Detonate, MarkInteraction::Apply) | (_, MarkInteraction::Ignore) => {
                return Ok(None);
            }
        };

        let placed = combatant
            .mark
            .occupy(definition, judgment.source, owner_turn)
            .map_err(|occupied| MarkError::SlotOccupied {
                target: target.target,
                existing: occupied.existing.mark,
                incoming: definition.id,
            })?;
        let event = MarkEvent {
            target: target.target,
            mark: placed.mark,
            element: placed.element,
            reason,
            actor,
            reaction: None,
        };

        tracing::debug!(
            target: "battle::mark",
            mark = %event.mark,
            combatant = %event.target,
            reason = %event.reason,
            "mark changed"
        );
        Ok(Some(MarkOutcome {
            event,
            reaction: None,
        }))
    }

    fn detonated(
        &self,
        target: CombatantId,
        mark: MarkId,
        existing: ElementId,
        incoming: ElementId,
        rule: &MarkRule,
        actor: Option<CombatantId>,
    ) -> MarkOutcome {
        let reaction = self
            .reactions
            .lookup(ReactionKey::new(existing, incoming, rule.subtype))
            .cloned();
        tracing::debug!(
            target: "battle::mark",
            %mark,
            combatant = %target,
            reaction = ?reaction.as_ref().map(|r| r.id),
            "mark detonated"
        );
        MarkOutcome {
            event: MarkEvent {
                target,
                mark,
                element: existing,
                reason: MarkChangeReason::Detonated,
                actor,
                reaction: reaction.as_ref().map(|r| r.id),
            },
            reaction,
        }
    }

    /// Counts down the owner's mark after its turn counter advanced.
    pub fn expire(state: &mut BattleState, owner: CombatantId) -> Option<MarkEvent> {
        let combatant = state.combatant_mut(owner)?;
        let expired = combatant.mark.tick(combatant.turn_counter)?;
        tracing::debug!(target: "battle::mark", mark = %expired.mark, combatant = %owner, "mark expired");
        Some(MarkEvent {
            target: owner,
            mark: expired.mark,
            element: expired.element,
            reason: MarkChangeReason::Expired,
            actor: None,
            reaction: None,
        })
    }

    /// Empties one slot, e.g. on death.
    pub fn clear(
        state: &mut BattleState,
        target: CombatantId,
        actor: Option<CombatantId>,
    ) -> Option<MarkEvent> {
        let cleared = state.combatant_mut(target)?.mark.clear()?;
        Some(MarkEvent {
            target,
            mark: cleared.mark,
            element: cleared.element,
            reason: MarkChangeReason::Cleared,
            actor,
            reaction: None,
        })
    }

    /// Empties every slot.
    pub fn clear_all(state: &mut BattleState) -> Vec<MarkEvent> {
        let ids: Vec<_> = state.combatants.iter().map(|c| c.id).collect();
        ids.into_iter()
            .filter_map(|id| Self::clear(state, id, None))
            .collect()
    }
}
