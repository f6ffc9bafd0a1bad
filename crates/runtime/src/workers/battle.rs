//! Battle worker that owns the [`Orchestrator`] and its authoritative state.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle) and answers
//! over oneshot channels. Presentation acknowledgements bypass the worker and
//! go straight to the shared gate, since the worker is usually the one
//! waiting on them.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use battle_core::{BattleOutcome, BattleState, MarkEvent, TurnStart};

use crate::api::Result;
use crate::orchestrator::{Orchestrator, TurnSummary};

/// Commands that can be sent to the battle worker
pub enum Command {
    /// Start the battle and announce the first turn.
    Start {
        reply: oneshot::Sender<Result<TurnStart>>,
    },
    /// Play the current turn.
    Step {
        reply: oneshot::Sender<Result<TurnSummary>>,
    },
    /// Play turns until the battle ends.
    Run {
        reply: oneshot::Sender<Result<BattleOutcome>>,
    },
    /// Query the current battle state (read-only).
    QueryState { reply: oneshot::Sender<BattleState> },
    /// Force the battle back to idle.
    Reset {
        reply: oneshot::Sender<Vec<MarkEvent>>,
    },
    Shutdown,
}

pub struct BattleWorker {
    orchestrator: Orchestrator,
    command_rx: mpsc::Receiver<Command>,
}

impl BattleWorker {
    pub fn new(orchestrator: Orchestrator, command_rx: mpsc::Receiver<Command>) -> Self {
        tracing::info!(
            target: "runtime::worker",
            combatants = orchestrator.state().combatants.len(),
            actions = orchestrator.content().catalog.len(),
            "battle worker initialized"
        );
        Self {
            orchestrator,
            command_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if matches!(cmd, Command::Shutdown) {
                debug!(target: "runtime::worker", "shutdown requested");
                break;
            }
            self.handle_command(cmd).await;
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                let result = self.orchestrator.start();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Start reply channel closed (caller dropped)");
                }
            }
            Command::Step { reply } => {
                let result = self.orchestrator.step().await;
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Step reply channel closed (caller dropped)");
                }
            }
            Command::Run { reply } => {
                let result = self.orchestrator.run().await;
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Run reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.orchestrator.state().clone()).is_err() {
                    debug!(target: "runtime::worker", "QueryState reply channel closed (caller dropped)");
                }
            }
            Command::Reset { reply } => {
                let cleared = self.orchestrator.reset();
                if reply.send(cleared).is_err() {
                    debug!(target: "runtime::worker", "Reset reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }
}
