//! Judgment recording: immutable, seed-bearing snapshots of committed actions.
//!
//! An [`ActionJudgment`] captures every randomness-relevant input behind one
//! commit. Per-target [`TargetJudgment`]s derive from it as
//! `action_seed ^ target_id ^ index`, so replaying a judgment against the same
//! ordered target list reproduces every roll.

use crate::action::{ActionId, TargetAudience, TargetShape};
use crate::economy::TimedGrade;
use crate::state::CombatantId;

/// Snapshot of one committed decision.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionJudgment {
    pub action_id: ActionId,
    pub source: CombatantId,
    /// Charge committed above the base cost.
    pub cp_spent: u32,
    pub timed_grade: TimedGrade,
    pub audience: TargetAudience,
    pub shape: TargetShape,
    pub rng_seed: u64,
    /// Commit sequence number this judgment was recorded under.
    pub nonce: u64,
}

impl ActionJudgment {
    /// Derives the judgment for the `index`-th entry of an ordered target list.
    pub fn target(&self, index: usize, target: CombatantId) -> TargetJudgment {
        TargetJudgment::derive(self.rng_seed, index, target)
    }

    /// Derives judgments for a whole ordered target list.
    pub fn targets(&self, targets: &[CombatantId]) -> Vec<TargetJudgment> {
        targets
            .iter()
            .enumerate()
            .map(|(index, &target)| self.target(index, target))
            .collect()
    }
}

/// Per-target slice of an [`ActionJudgment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetJudgment {
    pub index: usize,
    pub target: CombatantId,
    pub rng_seed: u64,
}

impl TargetJudgment {
    /// Pure derivation: `action_seed ^ target_id ^ index`.
    pub fn derive(action_seed: u64, index: usize, target: CombatantId) -> Self {
        Self {
            index,
            target,
            rng_seed: action_seed ^ target.seed_bits() ^ index as u64,
        }
    }

    /// Seed for the `salt`-th independent roll against this target.
    pub fn roll_seed(&self, salt: u32) -> u64 {
        self.rng_seed
            .wrapping_add((salt as u64).wrapping_mul(0x9e3779b97f4a7c15))
    }
}

/// Append-only log of committed judgments for replay and debugging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgmentRecorder {
    log: Vec<ActionJudgment>,
}

impl JudgmentRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a judgment and returns a reference to the stored copy.
    pub fn record(&mut self, judgment: ActionJudgment) -> &ActionJudgment {
        tracing::trace!(
            target: "battle::judgment",
            action = ?judgment.action_id,
            source = %judgment.source,
            seed = judgment.rng_seed,
            "judgment recorded"
        );
        self.log.push(judgment);
        &self.log[self.log.len() - 1]
    }

    pub fn last(&self) -> Option<&ActionJudgment> {
        self.log.last()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionJudgment> {
        self.log.iter()
    }

    /// Finds the judgment recorded under `nonce`.
    pub fn by_nonce(&self, nonce: u64) -> Option<&ActionJudgment> {
        self.log.iter().find(|j| j.nonce == nonce)
    }

    /// Re-derives the target judgments of a recorded commit.
    pub fn replay(&self, nonce: u64, targets: &[CombatantId]) -> Option<Vec<TargetJudgment>> {
        self.by_nonce(nonce).map(|judgment| judgment.targets(targets))
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}
