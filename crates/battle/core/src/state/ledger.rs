//! Resource Ledger: the only mutation path for HP/SP/CP.
//!
//! The ledger enforces two rules:
//! - counters stay within `[0, maximum]` (mutators saturate)
//! - spends are all-or-nothing (a cost that cannot be paid in full is rejected
//!   before any counter changes)

use crate::action::ActionCost;
use crate::error::{BattleError, ErrorSeverity};

use super::battle::BattleState;
use super::combatant::CombatantId;
use super::resources::ResourceKind;

/// Result of applying damage through the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    /// HP actually removed (may be less than requested).
    pub applied: u32,
    /// HP left after the hit.
    pub remaining: u32,
    /// True when this hit brought HP to zero.
    pub killed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedgerError {
    #[error("combatant {0} is not bound to this battle")]
    UnknownCombatant(CombatantId),

    #[error("combatant {combatant} needs {required} {kind} but has {available}")]
    Insufficient {
        combatant: CombatantId,
        kind: ResourceKind,
        required: u32,
        available: u32,
    },
}

impl BattleError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            LedgerError::UnknownCombatant(_) => ErrorSeverity::Validation,
            LedgerError::Insufficient { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LedgerError::UnknownCombatant(_) => "LEDGER_UNKNOWN_COMBATANT",
            LedgerError::Insufficient { .. } => "LEDGER_INSUFFICIENT",
        }
    }
}

/// Narrow mutation interface over per-combatant resource counters.
pub trait ResourceLedger {
    /// Current value of a counter.
    fn available(&self, id: CombatantId, kind: ResourceKind) -> Result<u32, LedgerError>;

    /// Removes exactly `amount`, or fails without touching the counter.
    fn spend(&mut self, id: CombatantId, kind: ResourceKind, amount: u32)
    -> Result<(), LedgerError>;

    /// Returns resources, capped at the maximum. Yields the amount restored.
    fn refund(&mut self, id: CombatantId, kind: ResourceKind, amount: u32)
    -> Result<u32, LedgerError>;

    /// Removes HP. Dead combatants absorb nothing.
    fn damage(&mut self, id: CombatantId, amount: u32) -> Result<DamageOutcome, LedgerError>;

    /// Restores HP to a living combatant. Dead combatants are not revived.
    fn heal(&mut self, id: CombatantId, amount: u32) -> Result<u32, LedgerError>;

    /// Checks that `cost` plus `extra_cp` can be paid in full.
    fn check_cost(
        &self,
        id: CombatantId,
        cost: &ActionCost,
        extra_cp: u32,
    ) -> Result<(), LedgerError> {
        let sp = self.available(id, ResourceKind::Sp)?;
        if sp < cost.sp {
            return Err(LedgerError::Insufficient {
                combatant: id,
                kind: ResourceKind::Sp,
                required: cost.sp,
                available: sp,
            });
        }
        let cp = self.available(id, ResourceKind::Cp)?;
        let required = cost.cp.saturating_add(extra_cp);
        if cp < required {
            return Err(LedgerError::Insufficient {
                combatant: id,
                kind: ResourceKind::Cp,
                required,
                available: cp,
            });
        }
        Ok(())
    }

    /// Pays an action cost plus charge atomically.
    fn spend_cost(
        &mut self,
        id: CombatantId,
        cost: &ActionCost,
        extra_cp: u32,
    ) -> Result<(), LedgerError> {
        self.check_cost(id, cost, extra_cp)?;
        self.spend(id, ResourceKind::Sp, cost.sp)?;
        self.spend(id, ResourceKind::Cp, cost.cp.saturating_add(extra_cp))
    }
}

impl ResourceLedger for BattleState {
    fn available(&self, id: CombatantId, kind: ResourceKind) -> Result<u32, LedgerError> {
        self.combatant(id)
            .map(|c| c.resources.get(kind).current)
            .ok_or(LedgerError::UnknownCombatant(id))
    }

    fn spend(
        &mut self,
        id: CombatantId,
        kind: ResourceKind,
        amount: u32,
    ) -> Result<(), LedgerError> {
        let combatant = self
            .combatant_mut(id)
            .ok_or(LedgerError::UnknownCombatant(id))?;
        let meter = combatant.resources.get_mut(kind);
        if meter.current < amount {
            return Err(LedgerError::Insufficient {
                combatant: id,
                kind,
                required: amount,
                available: meter.current,
            });
        }
        meter.drain(amount);
        if kind == ResourceKind::Hp && meter.is_empty() {
            combatant.alive = false;
        }
        Ok(())
    }

    fn refund(
        &mut self,
        id: CombatantId,
        kind: ResourceKind,
        amount: u32,
    ) -> Result<u32, LedgerError> {
        let combatant = self
            .combatant_mut(id)
            .ok_or(LedgerError::UnknownCombatant(id))?;
        if kind == ResourceKind::Hp && !combatant.alive {
            return Ok(0);
        }
        Ok(combatant.resources.get_mut(kind).fill(amount))
    }

    fn damage(&mut self, id: CombatantId, amount: u32) -> Result<DamageOutcome, LedgerError> {
        let combatant = self
            .combatant_mut(id)
            .ok_or(LedgerError::UnknownCombatant(id))?;
        if !combatant.alive {
            return Ok(DamageOutcome {
                applied: 0,
                remaining: 0,
                killed: false,
            });
        }

        let hp = &mut combatant.resources.hp;
        let applied = hp.drain(amount);
        let remaining = hp.current;
        let killed = remaining == 0;
        if killed {
            combatant.alive = false;
        }

        Ok(DamageOutcome {
            applied,
            remaining,
            killed,
        })
    }

    fn heal(&mut self, id: CombatantId, amount: u32) -> Result<u32, LedgerError> {
        self.refund(id, ResourceKind::Hp, amount)
    }
}
