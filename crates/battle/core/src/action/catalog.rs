//! Immutable action catalog supplied at battle start.
//!
//! The catalog owns action definitions, the effect implementations they
//! reference, and the timed-hit profiles they use. [`CatalogBuilder::build`]
//! checks each action against its effect's capabilities once, so the pipeline
//! never checks an effect for support at execution time.
//!
//! A definition whose effect is not bound is still stored: it is a
//! *missing implementation* and gets filtered out of the legal-action set.

use std::collections::HashMap;

use crate::economy::{TimedHitProfile, TimedHitProfileId};
use crate::error::{BattleError, ErrorSeverity};

use super::definition::{ActionDefinition, ActionId, EffectId, TargetShape};
use super::effect::{ActionEffect, EffectCapabilities};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("action {0} is defined twice")]
    DuplicateAction(ActionId),

    #[error("action {action} uses unknown timed-hit profile {profile:?}")]
    UnknownTimedHitProfile {
        action: ActionId,
        profile: TimedHitProfileId,
    },

    #[error("action {action} targets all but effect {effect:?} is single-target only")]
    AreaUnsupported { action: ActionId, effect: EffectId },

    #[error("action {action} has a timed-hit profile but effect {effect:?} ignores timed hits")]
    TimedHitUnsupported { action: ActionId, effect: EffectId },
}

impl BattleError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::DuplicateAction(_) => "CATALOG_DUPLICATE_ACTION",
            CatalogError::UnknownTimedHitProfile { .. } => "CATALOG_UNKNOWN_TIMED_HIT",
            CatalogError::AreaUnsupported { .. } => "CATALOG_AREA_UNSUPPORTED",
            CatalogError::TimedHitUnsupported { .. } => "CATALOG_TIMED_HIT_UNSUPPORTED",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ActionCatalog {
    /// Sorted by id.
    actions: Vec<ActionDefinition>,
    effects: HashMap<EffectId, ActionEffect>,
    timed_hits: HashMap<TimedHitProfileId, TimedHitProfile>,
}

impl ActionCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDefinition> {
        self.actions
            .binary_search_by_key(&id, |def| def.id)
            .ok()
            .map(|index| &self.actions[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The bound effect of a definition, `None` for a missing implementation.
    pub fn effect_for(&self, definition: &ActionDefinition) -> Option<&ActionEffect> {
        self.effects.get(&definition.effect)
    }

    pub fn timed_hit(&self, id: TimedHitProfileId) -> Option<&TimedHitProfile> {
        self.timed_hits.get(&id)
    }

    /// Definitions ordered cheapest first (ties broken by id).
    pub fn by_cost(&self) -> Vec<&ActionDefinition> {
        let mut sorted: Vec<_> = self.actions.iter().collect();
        sorted.sort_by_key(|def| (def.cost.total(), def.id));
        sorted
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    actions: Vec<ActionDefinition>,
    effects: HashMap<EffectId, ActionEffect>,
    timed_hits: HashMap<TimedHitProfileId, TimedHitProfile>,
}

impl CatalogBuilder {
    pub fn action(mut self, definition: ActionDefinition) -> Self {
        self.actions.push(definition);
        self
    }

    pub fn effect(mut self, id: EffectId, effect: ActionEffect) -> Self {
        self.effects.insert(id, effect);
        self
    }

    pub fn timed_hit(mut self, profile: TimedHitProfile) -> Self {
        self.timed_hits.insert(profile.id, profile);
        self
    }

    pub fn build(mut self) -> Result<ActionCatalog, CatalogError> {
        self.actions.sort_by_key(|def| def.id);
        if let Some(pair) = self.actions.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(CatalogError::DuplicateAction(pair[0].id));
        }

        for def in &self.actions {
            if let Some(profile) = def.timed_hit
                && !self.timed_hits.contains_key(&profile)
            {
                return Err(CatalogError::UnknownTimedHitProfile {
                    action: def.id,
                    profile,
                });
            }

            let Some(effect) = self.effects.get(&def.effect) else {
                tracing::debug!(
                    target: "battle::catalog",
                    action = %def.id,
                    effect = ?def.effect,
                    "action has no bound effect; it will never be legal"
                );
                continue;
            };
            let caps = effect.capabilities();

            if def.shape == TargetShape::All && !caps.contains(EffectCapabilities::MULTI_TARGET) {
                return Err(CatalogError::AreaUnsupported {
                    action: def.id,
                    effect: def.effect,
                });
            }
            if def.timed_hit.is_some() && !caps.contains(EffectCapabilities::TIMED_HIT) {
                return Err(CatalogError::TimedHitUnsupported {
                    action: def.id,
                    effect: def.effect,
                });
            }
        }

        Ok(ActionCatalog {
            actions: self.actions,
            effects: self.effects,
            timed_hits: self.timed_hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionCost, TargetAudience};
    use crate::economy::TimedHitTier;
    use crate::state::PowerStat;

    fn strike() -> ActionEffect {
        ActionEffect::Strike {
            power: 10,
            stat: PowerStat::Physical,
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let def = ActionDefinition::new(
            ActionId(1),
            "slash",
            ActionCost::FREE,
            TargetAudience::Enemies,
            TargetShape::Single,
            EffectId(1),
        );
        let err = ActionCatalog::builder()
            .action(def.clone())
            .action(def)
            .effect(EffectId(1), strike())
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateAction(ActionId(1)));
    }

    #[test]
    fn rejects_timed_hit_on_plain_strike() {
        let profile = TimedHitProfile {
            id: TimedHitProfileId(4),
            tiers: vec![TimedHitTier {
                windows: 2,
                per_hit_multiplier: 0.5,
                refund_per_success: 0,
                max_refund: 0,
            }],
        };
        let def = ActionDefinition::new(
            ActionId(1),
            "slash",
            ActionCost::FREE,
            TargetAudience::Enemies,
            TargetShape::Single,
            EffectId(1),
        )
        .with_timed_hit(profile.id);

        let err = ActionCatalog::builder()
            .action(def)
            .effect(EffectId(1), strike())
            .timed_hit(profile)
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::TimedHitUnsupported { .. }));
    }

    #[test]
    fn rejects_area_guard_and_keeps_unbound_actions() {
        let guard = ActionDefinition::new(
            ActionId(2),
            "guard",
            ActionCost::FREE,
            TargetAudience::SelfOnly,
            TargetShape::All,
            EffectId(9),
        );
        let err = ActionCatalog::builder()
            .action(guard)
            .effect(EffectId(9), ActionEffect::Guard)
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::AreaUnsupported { .. }));

        let unbound = ActionDefinition::new(
            ActionId(5),
            "unfinished",
            ActionCost::FREE,
            TargetAudience::Enemies,
            TargetShape::Single,
            EffectId(77),
        );
        let catalog = ActionCatalog::builder().action(unbound).build().unwrap();
        let def = catalog.get(ActionId(5)).unwrap();
        assert!(catalog.effect_for(def).is_none());
    }

    #[test]
    fn by_cost_orders_cheapest_first() {
        let catalog = ActionCatalog::builder()
            .action(ActionDefinition::new(
                ActionId(1),
                "fire",
                ActionCost::new(4, 0),
                TargetAudience::Enemies,
                TargetShape::Single,
                EffectId(1),
            ))
            .action(ActionDefinition::new(
                ActionId(2),
                "jab",
                ActionCost::new(0, 1),
                TargetAudience::Enemies,
                TargetShape::Single,
                EffectId(1),
            ))
            .effect(EffectId(1), strike())
            .build()
            .unwrap();
        let order: Vec<_> = catalog.by_cost().iter().map(|d| d.id).collect();
        assert_eq!(order, vec![ActionId(2), ActionId(1)]);
    }
}
