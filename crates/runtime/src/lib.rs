//! Async runtime for the battle engine.
//!
//! This crate wires the deterministic rules in `battle-core` to the outside
//! world: input providers choose actions, a pluggable pipeline resolves them,
//! and presentation collaborators pace the battle through stage
//! acknowledgements and advisory locks. Consumers embed [`Runtime`] to drive
//! turns, subscribe to events, and acknowledge stages through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the runtime and its builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`orchestrator`] runs turns against the battle state machine
//! - [`pipeline`] holds the action pipeline and its stages
//! - [`presentation`] gates progression on presentation collaborators
//! - [`providers`] ships scripted, channel-backed and AI input
pub mod api;
pub mod events;
pub mod orchestrator;
pub mod pipeline;
pub mod presentation;
pub mod providers;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, FirstLegalProvider, Result, RuntimeError, RuntimeHandle, SelectionRequest,
};
pub use events::{
    ActionEvent, BattleEvent, Event, EventBus, PresentationEvent, Subscription, Topic, TurnEvent,
};
pub use orchestrator::{DEFAULT_MAX_PROMPTS, Orchestrator, TurnSummary};
pub use pipeline::{
    ActionPipeline, AnnounceStage, EffectStage, ExecutionContext, ExecutionReport, Halt,
    MarkStage, Next, PipelineBuilder, PipelineError, PipelineStage, ValidationStage,
};
pub use presentation::{PresentationError, PresentationGate, PresentationStage, StageTicket};
pub use providers::{AiProvider, ChannelProvider, ScriptedProvider, SelectionSender};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
