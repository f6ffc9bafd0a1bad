//! Selections submitted by input collaborators and the legal options offered to them.

use crate::economy::TimedHitResult;
use crate::state::CombatantId;

use super::definition::ActionId;

/// A choice returned by a human or AI input collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pub action: ActionId,
    /// CP committed above the base cost.
    pub charge: u32,
    pub timed_hit: Option<TimedHitResult>,
    /// Explicit targets; `None` lets the resolver pick.
    pub targets: Option<Vec<CombatantId>>,
}

impl Selection {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            charge: 0,
            timed_hit: None,
            targets: None,
        }
    }

    pub fn with_charge(mut self, charge: u32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_timed_hit(mut self, result: TimedHitResult) -> Self {
        self.timed_hit = Some(result);
        self
    }

    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.targets = Some(vec![target]);
        self
    }
}

/// One entry of the legal-action set offered to an input collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegalAction {
    pub action: ActionId,
    /// Largest charge the actor may commit right now.
    pub max_charge: u32,
    /// Living candidates, in resolution order.
    pub candidates: Vec<CombatantId>,
}
