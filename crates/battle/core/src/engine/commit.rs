//! Committing selections.
//!
//! A commit validates everything before it spends anything: a selection that
//! fails any check leaves the ledger untouched. Once spent, resources are never
//! refunded by a later failure; the runtime routes such failures to the
//! fallback action instead.

use crate::action::{
    ActionDefinition, ActionEffect, ActionId, Selection, TargetResolver, TargetingError,
};
use crate::economy::{ChargeError, TimedGrade, TimedHitResult};
use crate::error::{BattleError, ErrorSeverity};
use crate::judgment::{ActionJudgment, TargetJudgment};
use crate::rng::compute_seed;
use crate::state::{CombatantId, LedgerError, ResourceKind, ResourceLedger};

use super::{BattleEngine, BattlePhase};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("an action is already resolving")]
    ResolutionInProgress,

    #[error("cannot commit while the battle is {0}")]
    InvalidPhase(BattlePhase),

    #[error("no combatant is taking a turn")]
    NoActor,

    #[error("{0} is not in the catalog")]
    UnknownAction(ActionId),

    #[error("{0} has no bound effect")]
    MissingImplementation(ActionId),

    #[error("the timed-hit input was cancelled")]
    Cancelled,

    #[error("no fallback action is available for {0}")]
    NoFallback(CombatantId),

    #[error(transparent)]
    Charge(#[from] ChargeError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Targeting(#[from] TargetingError),
}

impl BattleError for CommitError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CommitError::ResolutionInProgress
            | CommitError::InvalidPhase(_)
            | CommitError::UnknownAction(_)
            | CommitError::MissingImplementation(_) => ErrorSeverity::Validation,
            CommitError::Cancelled => ErrorSeverity::Recoverable,
            CommitError::NoActor | CommitError::NoFallback(_) => ErrorSeverity::Internal,
            CommitError::Charge(e) => e.severity(),
            CommitError::Ledger(e) => e.severity(),
            CommitError::Targeting(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CommitError::ResolutionInProgress => "COMMIT_RESOLVING",
            CommitError::InvalidPhase(_) => "COMMIT_INVALID_PHASE",
            CommitError::NoActor => "COMMIT_NO_ACTOR",
            CommitError::UnknownAction(_) => "COMMIT_UNKNOWN_ACTION",
            CommitError::MissingImplementation(_) => "COMMIT_MISSING_IMPLEMENTATION",
            CommitError::Cancelled => "COMMIT_CANCELLED",
            CommitError::NoFallback(_) => "COMMIT_NO_FALLBACK",
            CommitError::Charge(e) => e.error_code(),
            CommitError::Ledger(e) => e.error_code(),
            CommitError::Targeting(e) => e.error_code(),
        }
    }
}

/// A committed action, ready for the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Committed {
    pub definition: ActionDefinition,
    pub effect: ActionEffect,
    pub judgment: ActionJudgment,
    /// Ordered per-target judgments.
    pub targets: Vec<TargetJudgment>,
    /// Charge multiplier from the combo scaling profile.
    pub multiplier: f32,
    /// Timed-hit result re-scored against the action's profile.
    pub timed: Option<TimedHitResult>,
    /// Substituted for an illegal selection or a faulted pipeline.
    pub fallback: bool,
}

impl Committed {
    pub fn actor(&self) -> CombatantId {
        self.judgment.source
    }

    pub fn target_ids(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.targets.iter().map(|t| t.target)
    }
}

impl<'a> BattleEngine<'a> {
    /// `AwaitingAction → Resolving` for a legal selection by the current actor.
    pub fn commit(&mut self, selection: Selection) -> Result<Committed, CommitError> {
        match self.state.phase {
            BattlePhase::AwaitingAction => {}
            BattlePhase::Resolving => return Err(CommitError::ResolutionInProgress),
            other => return Err(CommitError::InvalidPhase(other)),
        }
        let actor = self.state.turn.current.ok_or(CommitError::NoActor)?;
        let catalog = self.env.catalog;

        let definition = catalog
            .get(selection.action)
            .ok_or(CommitError::UnknownAction(selection.action))?;
        let effect = catalog
            .effect_for(definition)
            .ok_or(CommitError::MissingImplementation(selection.action))?;
        if selection.timed_hit.is_some_and(|t| t.cancelled) {
            return Err(CommitError::Cancelled);
        }

        self.state.check_cost(actor, &definition.cost, 0)?;
        let available = self.state.available(actor, ResourceKind::Cp)?;
        let cp_max = self.cp_maximum(actor);
        let charge = self.env.config.charge.validate(
            selection.charge,
            available,
            definition.cost.cp,
            cp_max,
        )?;
        let targets = TargetResolver::resolve(
            self.state,
            actor,
            definition.audience,
            definition.shape,
            selection.targets.as_deref(),
        )?;

        let timed = definition
            .timed_hit
            .and_then(|profile| catalog.timed_hit(profile))
            .zip(selection.timed_hit)
            .map(|(profile, reported)| profile.sanitize(charge, &reported));

        self.state.spend_cost(actor, &definition.cost, charge)?;
        self.state.phase = BattlePhase::Resolving;

        tracing::debug!(
            target: "battle::engine",
            %actor,
            action = %definition.id,
            charge,
            targets = targets.len(),
            "selection committed"
        );

        Ok(self.seal(actor, definition, effect, charge, timed, &targets, false))
    }

    /// Substitutes the cheapest legal action for the current actor.
    ///
    /// From `AwaitingAction` the fallback pays its base cost like any commit.
    /// From `Resolving` (after a pipeline fault, when the turn's spend already
    /// happened) it resolves without further spend.
    pub fn commit_fallback(&mut self) -> Result<Committed, CommitError> {
        let actor = self.state.turn.current.ok_or(CommitError::NoActor)?;
        let free = match self.state.phase {
            BattlePhase::AwaitingAction => false,
            BattlePhase::Resolving => true,
            other => return Err(CommitError::InvalidPhase(other)),
        };
        let catalog = self.env.catalog;

        let chosen = catalog.by_cost().into_iter().find_map(|definition| {
            let effect = catalog.effect_for(definition)?;
            if !free && self.state.check_cost(actor, &definition.cost, 0).is_err() {
                return None;
            }
            let targets = TargetResolver::resolve(
                self.state,
                actor,
                definition.audience,
                definition.shape,
                None,
            )
            .ok()?;
            Some((definition, effect, targets))
        });
        let (definition, effect, targets) = chosen.ok_or(CommitError::NoFallback(actor))?;

        if !free {
            self.state.spend_cost(actor, &definition.cost, 0)?;
            self.state.phase = BattlePhase::Resolving;
        }

        tracing::warn!(
            target: "battle::engine",
            %actor,
            action = %definition.id,
            free,
            "fallback action committed"
        );

        Ok(self.seal(actor, definition, effect, 0, None, &targets, true))
    }

    fn cp_maximum(&self, actor: CombatantId) -> u32 {
        self.state
            .combatant(actor)
            .map(|c| c.resources.cp.maximum)
            .unwrap_or_default()
    }

    /// Records the judgment and advances the commit nonce.
    #[allow(clippy::too_many_arguments)]
    fn seal(
        &mut self,
        actor: CombatantId,
        definition: &ActionDefinition,
        effect: &ActionEffect,
        charge: u32,
        timed: Option<TimedHitResult>,
        targets: &[CombatantId],
        fallback: bool,
    ) -> Committed {
        let nonce = self.state.turn.nonce;
        self.state.turn.nonce += 1;

        let judgment = ActionJudgment {
            action_id: definition.id,
            source: actor,
            cp_spent: charge,
            timed_grade: timed.map(|t| t.grade()).unwrap_or(TimedGrade::None),
            audience: definition.audience,
            shape: definition.shape,
            rng_seed: compute_seed(self.env.config.seed, nonce, actor.0, definition.id.0),
            nonce,
        };
        let target_judgments = judgment.targets(targets);
        self.state.judgments.record(judgment.clone());

        Committed {
            definition: definition.clone(),
            effect: effect.clone(),
            judgment,
            targets: target_judgments,
            multiplier: self.env.config.scaling.multiplier(charge),
            timed,
            fallback,
        }
    }
}
