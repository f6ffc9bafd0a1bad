//! Per-execution context handed to every stage.

use battle_core::{BattleEngine, CombatantId, Committed, HitOutcome, MarkEvent, ReactionOutcome};

use crate::events::{Event, EventBus};
use crate::presentation::PresentationGate;

/// A stage stopped the chain on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    pub stage: &'static str,
    pub reason: String,
}

/// What an execution did, accumulated by the stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    pub hits: Vec<HitOutcome>,
    pub restored: Vec<(CombatantId, u32)>,
    pub refunded: u32,
    pub marks: Vec<MarkEvent>,
    pub reactions: Vec<ReactionOutcome>,
    pub halted: Option<Halt>,
}

impl ExecutionReport {
    /// Damage from the effect itself, reactions excluded.
    pub fn effect_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage.applied).sum()
    }

    pub fn total_damage(&self) -> u32 {
        self.effect_damage()
            + self
                .reactions
                .iter()
                .map(|r| r.hit.damage.applied)
                .sum::<u32>()
    }

    /// Appends another execution's results, keeping the first halt.
    pub fn merge(&mut self, other: ExecutionReport) {
        self.hits.extend(other.hits);
        self.restored.extend(other.restored);
        self.refunded += other.refunded;
        self.marks.extend(other.marks);
        self.reactions.extend(other.reactions);
        if self.halted.is_none() {
            self.halted = other.halted;
        }
    }
}

/// Shared mutable state for one pipeline execution.
///
/// Built fresh for every committed action; stages borrow it mutably in turn.
pub struct ExecutionContext<'a, 'e> {
    pub engine: &'a mut BattleEngine<'e>,
    pub committed: Committed,
    pub bus: &'a EventBus,
    pub gate: &'a PresentationGate,
    pub report: ExecutionReport,
}

impl<'a, 'e> ExecutionContext<'a, 'e> {
    pub fn new(
        engine: &'a mut BattleEngine<'e>,
        committed: Committed,
        bus: &'a EventBus,
        gate: &'a PresentationGate,
    ) -> Self {
        Self {
            engine,
            committed,
            bus,
            gate,
            report: ExecutionReport::default(),
        }
    }

    pub fn actor(&self) -> CombatantId {
        self.committed.actor()
    }

    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    /// Records a deliberate stop. The caller returns without forwarding.
    pub fn halt(&mut self, stage: &'static str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(
            target: "runtime::pipeline",
            stage,
            reason = %reason,
            actor = %self.actor(),
            "pipeline halted"
        );
        self.report.halted = Some(Halt { stage, reason });
    }

    pub fn into_report(self) -> ExecutionReport {
        self.report
    }
}
