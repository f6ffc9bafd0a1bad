//! High-level runtime.
//!
//! The runtime owns the battle worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the battle.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use battle_core::{BattleConfig, BattleContent, BattleOutcome, BattleState, Combatant, Side};

use crate::api::{ActionProvider, Result, RuntimeError, RuntimeHandle};
use crate::events::{EventBus, Subscription, Topic};
use crate::orchestrator::{DEFAULT_MAX_PROMPTS, Orchestrator, TurnSummary};
use crate::pipeline::ActionPipeline;
use crate::presentation::PresentationGate;
use crate::workers::{BattleWorker, Command};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Passed to the engine, pipeline and orchestrator; replaces the content's config.
    pub battle: BattleConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Resolve every presentation stage immediately (headless runs).
    pub auto_acknowledge: bool,
    /// Prompts per turn before a cancelled selection falls back.
    pub max_prompts: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            auto_acknowledge: true,
            max_prompts: DEFAULT_MAX_PROMPTS,
        }
    }
}

/// Main runtime that drives one battle session
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        self.handle.subscribe(topic)
    }

    /// Play the current turn
    pub async fn step(&self) -> Result<TurnSummary> {
        self.handle.step().await
    }

    /// Play until the battle ends
    pub async fn run(&self) -> Result<BattleOutcome> {
        self.handle.run_to_end().await
    }

    /// Shutdown the runtime gracefully
    ///
    /// Outstanding presentation stages are abandoned so a worker parked on
    /// one can finish its turn and exit.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.gate().close();
        self.handle.shutdown_worker().await;
        drop(self.handle);

        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<BattleContent>,
    combatants: Vec<Combatant>,
    allies: Option<Arc<dyn ActionProvider>>,
    enemies: Option<Arc<dyn ActionProvider>>,
    pipeline: Option<ActionPipeline>,
    event_bus: Option<EventBus>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            combatants: Vec::new(),
            allies: None,
            enemies: None,
            pipeline: None,
            event_bus: None,
        }
    }

    /// Override runtime configuration
    ///
    /// `config.battle` replaces the battle config carried by the content.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Battle content; adopts its battle config.
    pub fn content(mut self, content: BattleContent) -> Self {
        self.config.battle = content.config.clone();
        self.content = Some(content);
        self
    }

    pub fn combatants(mut self, combatants: impl IntoIterator<Item = Combatant>) -> Self {
        self.combatants.extend(combatants);
        self
    }

    pub fn combatant(mut self, combatant: Combatant) -> Self {
        self.combatants.push(combatant);
        self
    }

    pub fn ally_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.allies = Some(Arc::new(provider));
        self
    }

    pub fn enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.enemies = Some(Arc::new(provider));
        self
    }

    /// Same provider for both sides.
    pub fn provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        let shared: Arc<dyn ActionProvider> = Arc::new(provider);
        self.allies = Some(Arc::clone(&shared));
        self.enemies = Some(shared);
        self
    }

    /// Replace the default stage chain.
    pub fn pipeline(mut self, pipeline: ActionPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Share an existing bus instead of creating one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn auto_acknowledge(mut self, enabled: bool) -> Self {
        self.config.auto_acknowledge = enabled;
        self
    }

    /// Spawns the battle worker. Must be called inside a Tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let mut content = self.content.ok_or(RuntimeError::MissingContent)?;
        content.config = self.config.battle.clone();
        let state = BattleState::new(self.combatants)?;

        let bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let gate = PresentationGate::new(bus.clone(), self.config.auto_acknowledge);

        let mut orchestrator = Orchestrator::new(state, Arc::new(content), bus.clone(), gate.clone())
            .with_pipeline(self.pipeline.unwrap_or_default())
            .with_max_prompts(self.config.max_prompts);
        if let Some(provider) = self.allies {
            orchestrator.set_provider(Side::Ally, provider);
        }
        if let Some(provider) = self.enemies {
            orchestrator.set_provider(Side::Enemy, provider);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let worker = tokio::spawn(BattleWorker::new(orchestrator, command_rx).run());

        tracing::info!(
            target: "runtime::orchestrator",
            auto_acknowledge = self.config.auto_acknowledge,
            seed = self.config.battle.seed,
            "runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, bus, gate),
            worker,
        })
    }
}
