//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving turns, acknowledging presentation stages, or streaming events
//! from specific topics.
use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use battle_core::{BattleOutcome, BattleState, MarkEvent, TurnStart};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Subscription, Topic};
use crate::orchestrator::TurnSummary;
use crate::presentation::{PresentationGate, StageTicket};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    gate: PresentationGate,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        gate: PresentationGate,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            gate,
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Start the battle; returns the first turn.
    pub async fn start(&self) -> Result<TurnStart> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Play the current turn to completion.
    pub async fn step(&self) -> Result<TurnSummary> {
        self.request(|reply| Command::Step { reply }).await?
    }

    /// Play turns until the battle ends.
    pub async fn run_to_end(&self) -> Result<BattleOutcome> {
        self.request(|reply| Command::Run { reply }).await?
    }

    /// Query the current battle state (read-only snapshot)
    pub async fn query_state(&self) -> Result<BattleState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Force the battle back to idle. Returns the mark clear events.
    pub async fn reset(&self) -> Result<Vec<MarkEvent>> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Acknowledge a presentation stage. Also lifts a [`suspend`](Self::suspend).
    ///
    /// Returns false when the ticket is unknown or already acknowledged.
    pub fn stage_completed(&self, ticket: StageTicket) -> bool {
        self.gate.stage_completed(ticket)
    }

    pub fn pending_stages(&self) -> Vec<StageTicket> {
        self.gate.pending_tickets()
    }

    /// Raise or release an advisory animation lock.
    pub fn set_lock(&self, locked: bool) {
        self.gate.set_lock(locked);
    }

    /// Hold the orchestrator before its next turn until the next stage
    /// acknowledgement or [`resume`](Self::resume).
    pub fn suspend(&self) {
        self.gate.suspend();
    }

    pub fn resume(&self) {
        self.gate.resume();
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - Turn starts, input prompts and commits
    /// - `Topic::Action` - Damage, restores, fallbacks and faults
    /// - `Topic::Mark` - Mark changes with their reason
    /// - `Topic::Presentation` - Stage requests and lock changes
    /// - `Topic::Battle` - Start, end and reset
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use battle_runtime::{Event, PresentationEvent, Topic};
    ///
    /// let mut stages = handle.subscribe(Topic::Presentation);
    /// while let Some(event) = stages.recv().await {
    ///     if let Event::Presentation(PresentationEvent::AnimationStageRequest { ticket, .. }) = event {
    ///         // play the animation, then:
    ///         handle.stage_completed(ticket);
    ///     }
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, Subscription> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) fn gate(&self) -> &PresentationGate {
        &self.gate
    }

    pub(crate) async fn shutdown_worker(&self) {
        if self.command_tx.send(Command::Shutdown).await.is_err() {
            tracing::debug!(target: "runtime::worker", "worker already stopped");
        }
    }
}
