//! Executability predicate and the legal-action set.

use crate::action::{ActionDefinition, LegalAction, TargetResolver};
use crate::state::{CombatantId, ResourceKind, ResourceLedger};

use super::BattleEngine;

impl<'a> BattleEngine<'a> {
    /// Whether `actor` could commit `definition` right now with zero charge.
    ///
    /// Requires a bound effect, an affordable base cost and at least one
    /// living candidate.
    pub fn is_executable(&self, actor: CombatantId, definition: &ActionDefinition) -> bool {
        self.legal_entry(actor, definition).is_some()
    }

    /// Legal actions for the current actor, in catalog order.
    pub fn legal_actions(&self) -> Vec<LegalAction> {
        let Some(actor) = self.state.turn.current else {
            return Vec::new();
        };
        self.legal_actions_for(actor)
    }

    pub fn legal_actions_for(&self, actor: CombatantId) -> Vec<LegalAction> {
        self.env
            .catalog
            .iter()
            .filter_map(|definition| self.legal_entry(actor, definition))
            .collect()
    }

    /// Cheapest legal action, used when a selection cannot go through.
    pub fn fallback_action(&self, actor: CombatantId) -> Option<LegalAction> {
        self.env
            .catalog
            .by_cost()
            .into_iter()
            .find_map(|definition| self.legal_entry(actor, definition))
    }

    fn legal_entry(&self, actor: CombatantId, definition: &ActionDefinition) -> Option<LegalAction> {
        self.env.catalog.effect_for(definition)?;
        self.state.check_cost(actor, &definition.cost, 0).ok()?;

        let candidates = TargetResolver::candidates(self.state, actor, definition.audience).ok()?;
        if candidates.is_empty() {
            return None;
        }

        let available = self.state.available(actor, ResourceKind::Cp).ok()?;
        let cp_max = self
            .state
            .combatant(actor)
            .map(|c| c.resources.cp.maximum)
            .unwrap_or_default();
        let max_charge = self
            .env
            .config
            .charge
            .charge_bound(available, definition.cost.cp, cp_max)
            .unwrap_or_default();

        Some(LegalAction {
            action: definition.id,
            max_charge,
            candidates,
        })
    }
}
