//! Charge bounds: how much CP a caller may commit above an action's base cost.
//!
//! The bound is `min(spend_ceiling, available_cp - base_cost)`. The spend ceiling
//! combines an absolute cap and a fraction of the actor's CP maximum; either may
//! be left unset, and with both unset only the available CP bounds the charge.

use crate::error::{BattleError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargeError {
    #[error("base cost {base_cost} CP exceeds the {available} CP available")]
    Insufficient { available: u32, base_cost: u32 },

    #[error("requested charge {requested} exceeds the bound of {bound}")]
    ExceedsBound { requested: u32, bound: u32 },
}

impl BattleError for ChargeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ChargeError::Insufficient { .. } => ErrorSeverity::Recoverable,
            ChargeError::ExceedsBound { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ChargeError::Insufficient { .. } => "CHARGE_INSUFFICIENT",
            ChargeError::ExceedsBound { .. } => "CHARGE_EXCEEDS_BOUND",
        }
    }
}

/// Spend-ceiling parameters for charged actions.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChargeProfile {
    /// Absolute cap on extra CP per action.
    pub max_charge: Option<u32>,
    /// Cap expressed as a fraction of the actor's CP maximum (e.g. `0.5`).
    pub spend_factor_ceiling: Option<f32>,
}

impl ChargeProfile {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_charge(max_charge: u32) -> Self {
        Self {
            max_charge: Some(max_charge),
            spend_factor_ceiling: None,
        }
    }

    /// Largest charge allowed by configuration alone.
    pub fn spend_ceiling(&self, cp_maximum: u32) -> u32 {
        let factor_cap = self
            .spend_factor_ceiling
            .map(|factor| (cp_maximum as f32 * factor.max(0.0)).floor() as u32);

        match (self.max_charge, factor_cap) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => u32::MAX,
        }
    }

    /// Maximum charge for an actor with `available_cp` paying `base_cost`.
    pub fn charge_bound(
        &self,
        available_cp: u32,
        base_cost: u32,
        cp_maximum: u32,
    ) -> Result<u32, ChargeError> {
        let headroom = available_cp
            .checked_sub(base_cost)
            .ok_or(ChargeError::Insufficient {
                available: available_cp,
                base_cost,
            })?;
        Ok(self.spend_ceiling(cp_maximum).min(headroom))
    }

    /// Accepts `requested` if it is within the bound.
    pub fn validate(
        &self,
        requested: u32,
        available_cp: u32,
        base_cost: u32,
        cp_maximum: u32,
    ) -> Result<u32, ChargeError> {
        let bound = self.charge_bound(available_cp, base_cost, cp_maximum)?;
        if requested > bound {
            return Err(ChargeError::ExceedsBound { requested, bound });
        }
        Ok(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_charge_within_headroom_and_ceiling() {
        let profile = ChargeProfile::with_max_charge(7);
        assert_eq!(profile.charge_bound(12, 5, 20), Ok(7));
        assert_eq!(profile.validate(4, 12, 5, 20), Ok(4));
    }

    #[test]
    fn headroom_bounds_when_ceiling_is_larger() {
        let profile = ChargeProfile::with_max_charge(10);
        assert_eq!(profile.charge_bound(12, 5, 20), Ok(7));
        assert_eq!(
            profile.validate(8, 12, 5, 20),
            Err(ChargeError::ExceedsBound {
                requested: 8,
                bound: 7
            })
        );
    }

    #[test]
    fn factor_ceiling_scales_with_maximum() {
        let profile = ChargeProfile {
            max_charge: Some(9),
            spend_factor_ceiling: Some(0.25),
        };
        assert_eq!(profile.spend_ceiling(20), 5);
        assert_eq!(profile.charge_bound(30, 0, 20), Ok(5));
    }

    #[test]
    fn unaffordable_base_cost_is_rejected() {
        let profile = ChargeProfile::unbounded();
        assert_eq!(
            profile.charge_bound(3, 5, 20),
            Err(ChargeError::Insufficient {
                available: 3,
                base_cost: 5
            })
        );
        assert_eq!(profile.charge_bound(5, 5, 20), Ok(0));
    }
}
