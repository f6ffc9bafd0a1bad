//! Asynchronous abstraction for sourcing combatant intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so battles can
//! run with human input, scripted fixtures, or AI policies.
use async_trait::async_trait;

use battle_core::{BattleEnv, BattleState, CombatantId, LegalAction, Selection, Side};

use super::errors::Result;

/// Everything a provider sees when asked for a selection.
pub struct SelectionRequest<'a> {
    pub actor: CombatantId,
    pub side: Side,
    /// 1-based prompt count for this turn; greater than 1 after a cancel.
    pub attempt: u32,
    pub legal: &'a [LegalAction],
    pub state: &'a BattleState,
    pub env: BattleEnv<'a>,
}

impl SelectionRequest<'_> {
    pub fn legal_action(&self, action: battle_core::ActionId) -> Option<&LegalAction> {
        self.legal.iter().find(|entry| entry.action == action)
    }
}

/// Trait for providing selections based on the current battle state.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - AI decisions
/// - Scripted/replayed selections
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Returns the actor's selection, or `None` to cancel this prompt.
    ///
    /// A cancelled prompt is retried a bounded number of times before the
    /// orchestrator substitutes the fallback action.
    async fn select(&self, request: &SelectionRequest<'_>) -> Result<Option<Selection>>;
}

/// A provider that always commits the first legal action with no charge.
/// Useful for testing or as a fallback.
pub struct FirstLegalProvider;

#[async_trait]
impl ActionProvider for FirstLegalProvider {
    async fn select(&self, request: &SelectionRequest<'_>) -> Result<Option<Selection>> {
        Ok(request
            .legal
            .first()
            .map(|entry| Selection::new(entry.action)))
    }
}
