//! Turn orchestrator.
//!
//! Owns the authoritative [`BattleState`] and drives one turn at a time:
//!
//! 1. Wait on the presentation gate (locks defer enemy turns, suspension
//!    defers every turn).
//! 2. Offer the legal-action set to the side's [`ActionProvider`]. A
//!    cancelled prompt is retried up to `max_prompts` times.
//! 3. Commit the selection. Anything the engine rejects is replaced by the
//!    fallback action instead of stalling the turn.
//! 4. Run the committed action through the [`ActionPipeline`]. A faulted
//!    pipeline is logged and the turn degrades to a free fallback; spent
//!    resources are never handed back.
//! 5. Finish resolution and announce the next turn or the outcome.
//!
//! Only one action is ever in flight: the orchestrator holds the state
//! exclusively for the whole turn, and the engine refuses a second commit
//! while `Resolving`.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use battle_core::{
    ActionId, BattleContent, BattleEngine, BattleError, BattleOutcome, BattlePhase, BattleState,
    CombatantId, CommitError, Committed, MarkEvent, Progress, Side, TurnStart,
};

use crate::api::{ActionProvider, Result, RuntimeError, SelectionRequest};
use crate::events::{ActionEvent, BattleEvent, Event, EventBus, TurnEvent};
use crate::pipeline::{ActionPipeline, ExecutionContext, ExecutionReport};
use crate::presentation::PresentationGate;

/// Prompts per turn before a cancelled selection falls back.
pub const DEFAULT_MAX_PROMPTS: u32 = 3;

/// What one orchestrated turn did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub actor: CombatantId,
    pub action: ActionId,
    /// The fallback action replaced the selection (or a faulted pipeline).
    pub fallback: bool,
    pub report: ExecutionReport,
    pub progress: Progress,
}

pub struct Orchestrator {
    state: BattleState,
    content: Arc<BattleContent>,
    pipeline: ActionPipeline,
    allies: Option<Arc<dyn ActionProvider>>,
    enemies: Option<Arc<dyn ActionProvider>>,
    bus: EventBus,
    gate: PresentationGate,
    max_prompts: u32,
    /// Enemy turn parked until the gate clears.
    pending_enemy_turn: Option<TurnStart>,
    current: Option<TurnStart>,
    outcome: Option<BattleOutcome>,
}

impl Orchestrator {
    pub fn new(
        state: BattleState,
        content: Arc<BattleContent>,
        bus: EventBus,
        gate: PresentationGate,
    ) -> Self {
        Self {
            state,
            content,
            pipeline: ActionPipeline::standard(),
            allies: None,
            enemies: None,
            bus,
            gate,
            max_prompts: DEFAULT_MAX_PROMPTS,
            pending_enemy_turn: None,
            current: None,
            outcome: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: ActionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_max_prompts(mut self, max_prompts: u32) -> Self {
        self.max_prompts = max_prompts.max(1);
        self
    }

    pub fn with_provider(mut self, side: Side, provider: Arc<dyn ActionProvider>) -> Self {
        self.set_provider(side, provider);
        self
    }

    pub fn set_provider(&mut self, side: Side, provider: Arc<dyn ActionProvider>) {
        match side {
            Side::Ally => self.allies = Some(provider),
            Side::Enemy => self.enemies = Some(provider),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn content(&self) -> &BattleContent {
        &self.content
    }

    pub fn phase(&self) -> BattlePhase {
        self.state.phase
    }

    pub fn current_turn(&self) -> Option<TurnStart> {
        self.current
    }

    pub fn pending_enemy_turn(&self) -> Option<TurnStart> {
        self.pending_enemy_turn
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// `Idle → AwaitingAction` and the first turn.
    pub fn start(&mut self) -> Result<TurnStart> {
        let mut engine = BattleEngine::new(&mut self.state, self.content.env());
        let start = engine.start_battle()?;

        self.bus.publish(Event::Battle(BattleEvent::Started {
            combatants: self.state.combatants.len(),
            seed: self.content.config.seed,
        }));
        announce_turn(&self.bus, &start);
        self.current = Some(start);
        self.outcome = None;
        Ok(start)
    }

    /// Plays the current turn to completion. Starts the battle when idle.
    pub async fn step(&mut self) -> Result<TurnSummary> {
        match self.state.phase {
            BattlePhase::Idle => {
                self.start()?;
            }
            BattlePhase::Victory => {
                return Err(RuntimeError::BattleOver(
                    self.outcome.unwrap_or(BattleOutcome::Victory),
                ));
            }
            BattlePhase::Defeat => {
                return Err(RuntimeError::BattleOver(
                    self.outcome.unwrap_or(BattleOutcome::Defeat),
                ));
            }
            BattlePhase::AwaitingAction | BattlePhase::Resolving => {}
        }

        let actor = self
            .state
            .turn
            .current
            .ok_or(RuntimeError::Commit(CommitError::NoActor))?;
        let side = self
            .state
            .combatant(actor)
            .map(|c| c.side)
            .ok_or(RuntimeError::Commit(CommitError::NoActor))?;
        let provider = match side {
            Side::Ally => self.allies.clone(),
            Side::Enemy => self.enemies.clone(),
        }
        .ok_or(RuntimeError::ProviderNotSet { side })?;

        self.wait_for_gate(side).await;

        let Self {
            state,
            content,
            pipeline,
            bus,
            gate,
            max_prompts,
            ..
        } = self;
        let mut engine = BattleEngine::new(state, content.env());

        let committed = if engine.phase() == BattlePhase::Resolving {
            // A previous step was interrupted after its commit.
            warn!(target: "runtime::orchestrator", %actor, "resuming an interrupted resolution");
            engine.commit_fallback()?
        } else {
            select_and_commit(&mut engine, provider.as_ref(), bus, actor, side, *max_prompts)
                .await?
        };
        let action = committed.definition.id;
        let fallback = committed.fallback;
        announce_commit(bus, &committed);

        let (report, faulted) = execute(&mut engine, pipeline, bus, gate, committed).await;
        let progress = engine.finish_resolution()?;

        match progress {
            Progress::NextTurn(start) => {
                announce_turn(&self.bus, &start);
                self.current = Some(start);
            }
            Progress::Ended(outcome) => {
                info!(
                    target: "runtime::orchestrator",
                    %outcome,
                    turns = self.state.turn.turns_taken,
                    "battle over"
                );
                self.bus.publish(Event::Battle(BattleEvent::Ended {
                    outcome,
                    turns: self.state.turn.turns_taken,
                }));
                self.current = None;
                self.outcome = Some(outcome);
            }
        }

        Ok(TurnSummary {
            actor,
            action,
            fallback: fallback || faulted,
            report,
            progress,
        })
    }

    /// Steps until the battle ends.
    pub async fn run(&mut self) -> Result<BattleOutcome> {
        loop {
            if let Progress::Ended(outcome) = self.step().await?.progress {
                return Ok(outcome);
            }
        }
    }

    /// Forces the battle back to `Idle`, clearing every mark.
    pub fn reset(&mut self) -> Vec<MarkEvent> {
        let mut engine = BattleEngine::new(&mut self.state, self.content.env());
        let cleared = engine.reset_battle();

        for event in &cleared {
            self.bus.publish(Event::Mark(*event));
        }
        let abandoned = self.gate.abandon_pending();
        self.bus.publish(Event::Battle(BattleEvent::Reset));
        debug!(
            target: "runtime::orchestrator",
            cleared = cleared.len(),
            abandoned,
            "battle reset"
        );

        self.current = None;
        self.pending_enemy_turn = None;
        self.outcome = None;
        cleared
    }

    async fn wait_for_gate(&mut self, side: Side) {
        if side == Side::Enemy {
            self.pending_enemy_turn = self.current;
            if self.gate.is_locked() || self.gate.is_suspended() {
                debug!(
                    target: "runtime::orchestrator",
                    actor = ?self.current.map(|t| t.actor),
                    "enemy turn deferred until presentation clears"
                );
            }
            self.gate.wait_until_clear().await;
            self.pending_enemy_turn = None;
        } else {
            self.gate.wait_until_resumed().await;
        }
    }
}

fn announce_turn(bus: &EventBus, start: &TurnStart) {
    if let Some(expired) = start.expired {
        bus.publish(Event::Mark(expired));
    }
    bus.publish(Event::Turn(TurnEvent::from(start)));
}

fn announce_commit(bus: &EventBus, committed: &Committed) {
    bus.publish(Event::Turn(TurnEvent::Committed {
        actor: committed.actor(),
        action: committed.definition.id,
        charge: committed.judgment.cp_spent,
        targets: committed.target_ids().collect(),
        nonce: committed.judgment.nonce,
        fallback: committed.fallback,
    }));
}

/// Prompts the provider and commits, falling back when the selection cannot go through.
async fn select_and_commit(
    engine: &mut BattleEngine<'_>,
    provider: &dyn ActionProvider,
    bus: &EventBus,
    actor: CombatantId,
    side: Side,
    max_prompts: u32,
) -> Result<Committed> {
    let mut requested = None;
    let mut reason = String::from("every prompt was cancelled");

    for attempt in 1..=max_prompts.max(1) {
        let legal = engine.legal_actions();
        bus.publish(Event::Turn(TurnEvent::AwaitingInput {
            actor,
            attempt,
            legal: legal.clone(),
        }));

        let request = SelectionRequest {
            actor,
            side,
            attempt,
            legal: &legal,
            state: engine.state(),
            env: engine.env(),
        };
        let Some(selection) = provider.select(&request).await? else {
            debug!(target: "runtime::orchestrator", %actor, attempt, "selection cancelled");
            continue;
        };

        requested = Some(selection.action);
        match engine.commit(selection) {
            Ok(committed) => return Ok(committed),
            Err(CommitError::Cancelled) => {
                debug!(target: "runtime::orchestrator", %actor, attempt, "timed input cancelled");
            }
            Err(error) => {
                debug!(
                    target: "runtime::orchestrator",
                    %actor,
                    %error,
                    code = error.error_code(),
                    "selection rejected"
                );
                reason = error.to_string();
                break;
            }
        }
    }

    warn!(
        target: "runtime::orchestrator",
        %actor,
        requested = ?requested,
        reason = %reason,
        "substituting fallback action"
    );
    bus.publish(Event::Action(ActionEvent::Fallback {
        actor,
        requested,
        reason,
    }));
    Ok(engine.commit_fallback()?)
}

/// Runs one committed action. A fault degrades to a free fallback.
///
/// Returns the combined report and whether a fault occurred.
async fn execute(
    engine: &mut BattleEngine<'_>,
    pipeline: &ActionPipeline,
    bus: &EventBus,
    gate: &PresentationGate,
    committed: Committed,
) -> (ExecutionReport, bool) {
    let actor = committed.actor();
    let action = committed.definition.id;

    let mut ctx = ExecutionContext::new(&mut *engine, committed, bus, gate);
    let result = pipeline.execute(&mut ctx).await;
    let mut report = ctx.into_report();

    let fault = match result {
        Ok(()) => {
            if let Some(halt) = &report.halted {
                bus.publish(Event::Action(ActionEvent::Halted {
                    actor,
                    action,
                    stage: halt.stage.to_string(),
                }));
            }
            return (report, false);
        }
        Err(fault) => fault,
    };

    error!(
        target: "runtime::orchestrator",
        %actor,
        %action,
        error = %fault,
        code = fault.error_code(),
        "pipeline fault"
    );
    bus.publish(Event::Action(ActionEvent::Faulted {
        actor,
        action,
        error: fault.to_string(),
    }));

    let fallback = match engine.commit_fallback() {
        Ok(fallback) => fallback,
        Err(error) => {
            error!(target: "runtime::orchestrator", %actor, %error, "no fallback after fault");
            return (report, true);
        }
    };
    bus.publish(Event::Action(ActionEvent::Fallback {
        actor,
        requested: Some(action),
        reason: fault.to_string(),
    }));
    announce_commit(bus, &fallback);

    let mut ctx = ExecutionContext::new(&mut *engine, fallback, bus, gate);
    if let Err(error) = pipeline.execute(&mut ctx).await {
        error!(target: "runtime::orchestrator", %actor, %error, "fallback action faulted");
    }
    report.merge(ctx.into_report());
    (report, true)
}
