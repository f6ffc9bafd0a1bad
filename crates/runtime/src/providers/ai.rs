//! Greedy AI provider.

use async_trait::async_trait;

use battle_core::{
    ActionDefinition, ActionEffect, BattleState, CombatantId, LegalAction, Selection, TargetShape,
};

use crate::api::{ActionProvider, Result, SelectionRequest};

/// Picks the highest-power offensive action it can afford.
///
/// Decision order:
/// 1. Heal the most wounded ally when one is below `heal_threshold` of its HP.
/// 2. Otherwise attack with the strongest legal offensive action, charged up
///    to `charge` and aimed at the enemy with the least HP.
/// 3. Otherwise take the first legal action.
///
/// Ties break on the lower action id, so the same state always yields the
/// same selection. Timed-hit actions report every window as hit.
#[derive(Debug, Clone)]
pub struct AiProvider {
    charge: u32,
    heal_threshold: f32,
}

impl Default for AiProvider {
    fn default() -> Self {
        Self {
            charge: 0,
            heal_threshold: 0.35,
        }
    }
}

impl AiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// CP committed above the base cost, clamped to what each action allows.
    pub fn with_charge(mut self, charge: u32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_heal_threshold(mut self, ratio: f32) -> Self {
        self.heal_threshold = ratio.clamp(0.0, 1.0);
        self
    }

    fn choose(&self, request: &SelectionRequest<'_>) -> Option<Selection> {
        let catalog = request.env.catalog;
        let options: Vec<(&LegalAction, &ActionDefinition, &ActionEffect)> = request
            .legal
            .iter()
            .filter_map(|entry| {
                let definition = catalog.get(entry.action)?;
                let effect = catalog.effect_for(definition)?;
                Some((entry, definition, effect))
            })
            .collect();

        let heal = options
            .iter()
            .filter(|(_, _, effect)| matches!(effect, ActionEffect::Heal { .. }))
            .max_by_key(|(entry, _, effect)| (effect.power(), std::cmp::Reverse(entry.action)));
        if let Some((entry, definition, _)) = heal
            && let Some(target) = self.wounded(request.state, &entry.candidates)
        {
            return Some(self.selection(request, entry, definition, Some(target)));
        }

        let attack = options
            .iter()
            .filter(|(_, _, effect)| effect.is_offensive())
            .max_by_key(|(entry, _, effect)| (effect.power(), std::cmp::Reverse(entry.action)));
        if let Some((entry, definition, _)) = attack {
            let target = weakest(request.state, &entry.candidates);
            return Some(self.selection(request, entry, definition, target));
        }

        request
            .legal
            .first()
            .map(|entry| Selection::new(entry.action))
    }

    fn selection(
        &self,
        request: &SelectionRequest<'_>,
        entry: &LegalAction,
        definition: &ActionDefinition,
        target: Option<CombatantId>,
    ) -> Selection {
        let charge = self.charge.min(entry.max_charge);
        let mut selection = Selection::new(entry.action).with_charge(charge);
        if definition.shape == TargetShape::Single
            && let Some(target) = target
        {
            selection = selection.with_target(target);
        }
        if let Some(profile) = definition
            .timed_hit
            .and_then(|id| request.env.catalog.timed_hit(id))
        {
            selection = selection.with_timed_hit(profile.score(charge, u32::MAX));
        }
        selection
    }

    fn wounded(&self, state: &BattleState, candidates: &[CombatantId]) -> Option<CombatantId> {
        candidates
            .iter()
            .filter_map(|&id| state.combatant(id))
            .filter(|c| {
                let hp = c.resources.hp;
                hp.maximum > 0 && (hp.current as f32) < hp.maximum as f32 * self.heal_threshold
            })
            .min_by_key(|c| (c.resources.hp.current, c.id))
            .map(|c| c.id)
    }
}

fn weakest(state: &BattleState, candidates: &[CombatantId]) -> Option<CombatantId> {
    candidates
        .iter()
        .filter_map(|&id| state.combatant(id))
        .min_by_key(|c| (c.resources.hp.current, c.id))
        .map(|c| c.id)
}

#[async_trait]
impl ActionProvider for AiProvider {
    async fn select(&self, request: &SelectionRequest<'_>) -> Result<Option<Selection>> {
        let selection = self.choose(request);
        tracing::debug!(
            target: "runtime::providers",
            actor = %request.actor,
            action = ?selection.as_ref().map(|s| s.action),
            "ai selection"
        );
        Ok(selection)
    }
}
