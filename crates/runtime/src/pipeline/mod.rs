//! Action pipeline.
//!
//! A committed action runs through an ordered chain of [`PipelineStage`]s.
//! Each stage receives the shared [`ExecutionContext`] and a [`Next`]
//! continuation: it may work before and after forwarding, or return without
//! forwarding to stop the chain. The last stage in the default chain runs the
//! action's effect and suspends on presentation acknowledgements between beats.
//!
//! # Default chain
//!
//! ```text
//! ValidationStage → AnnounceStage → MarkStage → EffectStage
//! ```
//!
//! `MarkStage` forwards first and applies mark rules once the hits have
//! landed, so a target killed by the effect is never marked.
//!
//! Contexts are built per execution and borrowed mutably for its whole
//! length, so two executions can never share one.

mod context;
mod stages;

pub use context::{ExecutionContext, ExecutionReport, Halt};
pub use stages::{AnnounceStage, EffectStage, MarkStage, ValidationStage};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use battle_core::{BattleError, ErrorSeverity, LedgerError};

use crate::presentation::PresentationError;

/// Failure escaping a stage or effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Presentation(#[from] PresentationError),

    #[error("stage {stage} failed: {reason}")]
    Stage { stage: &'static str, reason: String },
}

impl BattleError for PipelineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PipelineError::Ledger(e) => e.severity(),
            PipelineError::Presentation(_) => ErrorSeverity::Recoverable,
            PipelineError::Stage { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Ledger(e) => e.error_code(),
            PipelineError::Presentation(PresentationError::Abandoned(_)) => {
                "PIPELINE_STAGE_ABANDONED"
            }
            PipelineError::Presentation(PresentationError::Closed) => "PIPELINE_GATE_CLOSED",
            PipelineError::Stage { .. } => "PIPELINE_STAGE_FAULT",
        }
    }
}

/// One pluggable link of the chain.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Used in logs and in [`Halt`] records.
    fn name(&self) -> &'static str;

    /// Handles the action. Call `next.run(ctx)` to continue the chain.
    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError>;
}

/// Continuation over the remaining stages.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn PipelineStage>],
}

impl<'a> Next<'a> {
    pub async fn run(self, ctx: &mut ExecutionContext<'_, '_>) -> Result<(), PipelineError> {
        let Some((stage, rest)) = self.stages.split_first() else {
            return Ok(());
        };
        tracing::trace!(target: "runtime::pipeline", stage = stage.name(), "entering stage");
        stage.handle(ctx, Next { stages: rest }).await
    }

    /// Stages left after this point.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }
}

/// Ordered stage chain, shared across executions.
#[derive(Clone)]
pub struct ActionPipeline {
    stages: Arc<[Arc<dyn PipelineStage>]>,
}

impl ActionPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The default chain.
    pub fn standard() -> Self {
        Self::builder()
            .stage(ValidationStage)
            .stage(AnnounceStage)
            .stage(MarkStage)
            .stage(EffectStage)
            .build()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn execute(&self, ctx: &mut ExecutionContext<'_, '_>) -> Result<(), PipelineError> {
        tracing::debug!(
            target: "runtime::pipeline",
            actor = %ctx.committed.actor(),
            action = %ctx.committed.definition.id,
            fallback = ctx.committed.fallback,
            "executing action"
        );
        Next {
            stages: &self.stages,
        }
        .run(ctx)
        .await
    }
}

impl Default for ActionPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ActionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn PipelineStage>>,
}

impl PipelineBuilder {
    /// Appends a stage; stages run in insertion order.
    pub fn stage(mut self, stage: impl PipelineStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn shared_stage(mut self, stage: Arc<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> ActionPipeline {
        ActionPipeline {
            stages: self.stages.into(),
        }
    }
}
