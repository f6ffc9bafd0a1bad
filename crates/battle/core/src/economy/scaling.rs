//! Combo scaling: resolves a charge tier to a damage multiplier.
//!
//! Resolution order for tier `t > 0`:
//! 1. the evaluation curve, when configured and positive at `t`
//! 2. the explicit multiplier list, extrapolated past its end with
//!    `bonus = bonus * growth_factor + growth_offset` once per extra tier
//! 3. the procedural default: `bonus(1) = 15`, `bonus(t) = bonus(t-1) * 2 + 10`
//!
//! Bonuses are percentage points over 1.0. The optional soft cap runs last.

use super::curve::{Curve, ResponseCurve};

/// Bonus of the first tier under the procedural default, in percentage points.
pub const DEFAULT_FIRST_BONUS: f32 = 15.0;
/// Per-tier growth factor of the procedural default.
pub const DEFAULT_GROWTH_FACTOR: f32 = 2.0;
/// Per-tier growth offset of the procedural default, in percentage points.
pub const DEFAULT_GROWTH_OFFSET: f32 = 10.0;

/// Diminishing-returns blend above a threshold multiplier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftCap {
    pub enabled: bool,
    /// Multiplier at which the cap starts bending growth.
    pub threshold: f32,
    /// Value approached as the excess grows; never exceeded.
    pub ceiling: f32,
    /// Excess over `threshold` that maps to a normalized ratio of 1.
    pub excess_span: f32,
    pub response: ResponseCurve,
}

impl SoftCap {
    pub fn new(threshold: f32, ceiling: f32, excess_span: f32) -> Self {
        Self {
            enabled: true,
            threshold,
            ceiling: ceiling.max(threshold),
            excess_span,
            response: ResponseCurve::default(),
        }
    }

    /// Normalized excess of `multiplier` above the threshold, in `[0, 1]`.
    pub fn excess_ratio(&self, multiplier: f32) -> f32 {
        let excess = multiplier - self.threshold;
        if excess <= 0.0 {
            return 0.0;
        }
        if self.excess_span <= f32::EPSILON {
            return 1.0;
        }
        (excess / self.excess_span).clamp(0.0, 1.0)
    }

    /// Blend `multiplier` toward the ceiling.
    ///
    /// The result never rises above the uncapped value and never exceeds the
    /// ceiling.
    pub fn apply(&self, multiplier: f32) -> f32 {
        if !self.enabled || multiplier <= self.threshold {
            return multiplier;
        }
        let ceiling = self.ceiling.max(self.threshold);
        let ratio = self.excess_ratio(multiplier);
        let blended = self.threshold + (ceiling - self.threshold) * self.response.evaluate(ratio);
        blended.min(multiplier)
    }
}

/// Charge tier → multiplier configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComboScalingProfile {
    /// Explicit multipliers for tiers 1..=len.
    pub multipliers: Vec<f32>,
    pub growth_factor: f32,
    pub growth_offset: f32,
    pub curve: Option<Curve>,
    pub soft_cap: Option<SoftCap>,
}

impl Default for ComboScalingProfile {
    fn default() -> Self {
        Self {
            multipliers: Vec::new(),
            growth_factor: DEFAULT_GROWTH_FACTOR,
            growth_offset: DEFAULT_GROWTH_OFFSET,
            curve: None,
            soft_cap: None,
        }
    }
}

impl ComboScalingProfile {
    /// Multiplier for `tier` with the soft cap applied.
    pub fn multiplier(&self, tier: u32) -> f32 {
        let raw = self.uncapped_multiplier(tier);
        match &self.soft_cap {
            Some(cap) => cap.apply(raw),
            None => raw,
        }
    }

    /// Multiplier for `tier` before the soft cap.
    pub fn uncapped_multiplier(&self, tier: u32) -> f32 {
        if tier == 0 {
            return 1.0;
        }

        if let Some(curve) = &self.curve {
            let value = curve.evaluate(tier as f32);
            if value > 0.0 {
                return value;
            }
        }

        if !self.multipliers.is_empty() {
            return self.extrapolate(tier);
        }

        default_multiplier(tier)
    }

    fn extrapolate(&self, tier: u32) -> f32 {
        let len = self.multipliers.len();
        let index = tier as usize;
        if index <= len {
            return self.multipliers[index - 1];
        }

        let mut bonus = (self.multipliers[len - 1] - 1.0) * 100.0;
        for _ in len..index {
            bonus = bonus * self.growth_factor + self.growth_offset;
            if !bonus.is_finite() {
                return f32::MAX;
            }
        }
        1.0 + bonus / 100.0
    }
}

/// Procedural bonus for `tier`, in percentage points. Tier 0 has no bonus.
pub fn default_bonus(tier: u32) -> f32 {
    if tier == 0 {
        return 0.0;
    }
    let mut bonus = DEFAULT_FIRST_BONUS;
    for _ in 1..tier {
        bonus = bonus * DEFAULT_GROWTH_FACTOR + DEFAULT_GROWTH_OFFSET;
        if !bonus.is_finite() {
            return f32::MAX;
        }
    }
    bonus
}

/// Procedural multiplier `1 + bonus(tier) / 100`.
pub fn default_multiplier(tier: u32) -> f32 {
    let bonus = default_bonus(tier);
    if bonus == f32::MAX {
        return f32::MAX;
    }
    1.0 + bonus / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::curve::Keyframe;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn default_chain_matches_bonus_sequence() {
        assert_eq!(default_bonus(1), 15.0);
        assert_eq!(default_bonus(2), 40.0);
        assert_eq!(default_bonus(3), 90.0);
        assert_eq!(default_bonus(4), 190.0);
        assert!(approx(ComboScalingProfile::default().multiplier(4), 2.90));
        assert_eq!(ComboScalingProfile::default().multiplier(0), 1.0);
    }

    #[test]
    fn explicit_list_extrapolates_past_end() {
        let profile = ComboScalingProfile {
            multipliers: vec![1.1, 1.3],
            growth_factor: 1.5,
            growth_offset: 5.0,
            ..Default::default()
        };
        assert!(approx(profile.multiplier(1), 1.1));
        assert!(approx(profile.multiplier(2), 1.3));
        // 30 * 1.5 + 5 = 50
        assert!(approx(profile.multiplier(3), 1.5));
        // 50 * 1.5 + 5 = 80
        assert!(approx(profile.multiplier(4), 1.8));
    }

    #[test]
    fn positive_curve_wins_over_list() {
        let profile = ComboScalingProfile {
            multipliers: vec![1.1],
            curve: Some(Curve::new(vec![
                Keyframe::new(1.0, 0.0),
                Keyframe::new(3.0, 4.0),
            ])),
            ..Default::default()
        };
        // Curve is 0 at tier 1, so the list answers.
        assert!(approx(profile.multiplier(1), 1.1));
        assert!(approx(profile.multiplier(2), 2.0));
        assert!(approx(profile.multiplier(3), 4.0));
    }

    #[test]
    fn soft_cap_bends_growth_below_ceiling() {
        let profile = ComboScalingProfile {
            soft_cap: Some(SoftCap::new(2.0, 3.0, 4.0)),
            ..Default::default()
        };
        // Tier 3 (1.9) sits under the threshold.
        assert!(approx(profile.multiplier(3), 1.9));
        let capped = profile.multiplier(4);
        assert!(capped > 2.0 && capped < 2.9);
        assert!(profile.multiplier(12) <= 3.0);
    }

    #[test]
    fn disabled_soft_cap_is_transparent() {
        let mut cap = SoftCap::new(1.0, 1.5, 1.0);
        cap.enabled = false;
        assert_eq!(cap.apply(9.0), 9.0);
    }

    proptest! {
        #[test]
        fn procedural_recurrence_holds(tier in 2u32..20) {
            let prev = default_bonus(tier - 1);
            prop_assert!(approx(default_bonus(tier), prev * 2.0 + 10.0));
            let expected = 1.0 + default_bonus(tier) / 100.0;
            prop_assert!(approx(default_multiplier(tier), expected));
        }

        #[test]
        fn soft_cap_respects_bounds(
            threshold in 1.0f32..4.0,
            headroom in 0.0f32..4.0,
            span in 0.1f32..8.0,
            multiplier in 0.5f32..20.0,
        ) {
            let cap = SoftCap::new(threshold, threshold + headroom, span);
            let capped = cap.apply(multiplier);
            prop_assert!(capped <= multiplier);
            if multiplier >= threshold {
                prop_assert!(capped >= threshold - 1e-5);
                prop_assert!(capped <= threshold + headroom + 1e-5);
            }
            if cap.excess_ratio(multiplier) == 0.0 {
                prop_assert_eq!(capped, multiplier);
            }
        }
    }
}
