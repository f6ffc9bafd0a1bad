//! Timed-hit windows and per-hit damage sequences.
//!
//! A timed-hit profile converts one charge tier into N discrete input windows.
//! Each window succeeds or fails on its own; the result carries the hit ratio,
//! the per-hit multiplier, and a CP refund capped at the tier's maximum.
//! Damage lands once per successful hit, so partial success scales
//! proportionally.

use arrayvec::ArrayVec;

/// Upper bound on discrete hits in one sequence.
pub const MAX_HITS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedHitProfileId(pub u32);

/// Quality of a timed-input sequence. Ordered from worst to best.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimedGrade {
    /// No timed input was attempted.
    #[default]
    None,
    Fail,
    Success,
    Perfect,
}

/// Window configuration for one charge tier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedHitTier {
    /// Number of input windows (hits) for this tier.
    pub windows: u32,
    /// Damage multiplier applied to each successful hit.
    pub per_hit_multiplier: f32,
    /// CP returned per successful window.
    pub refund_per_success: u32,
    /// Cap on the CP refund for the whole sequence.
    pub max_refund: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedHitProfile {
    pub id: TimedHitProfileId,
    /// Tier 1 is `tiers[0]`; charges above the list use the last tier.
    pub tiers: Vec<TimedHitTier>,
}

impl TimedHitProfile {
    /// Tier used for a given charge. A charge of 0 still uses the first tier.
    pub fn tier(&self, charge: u32) -> Option<&TimedHitTier> {
        let last = self.tiers.len().checked_sub(1)?;
        let index = (charge.max(1) as usize - 1).min(last);
        self.tiers.get(index)
    }

    /// Scores a sequence from the number of successful windows.
    pub fn score(&self, charge: u32, hits_succeeded: u32) -> TimedHitResult {
        let Some(tier) = self.tier(charge) else {
            return TimedHitResult::cancelled();
        };
        let total_hits = tier.windows.min(MAX_HITS as u32);
        let hits_succeeded = hits_succeeded.min(total_hits);
        let refund = hits_succeeded
            .saturating_mul(tier.refund_per_success)
            .min(tier.max_refund);

        TimedHitResult {
            hits_succeeded,
            total_hits,
            cp_refund: refund,
            damage_multiplier: tier.per_hit_multiplier,
            cancelled: false,
        }
    }

    /// Re-derives an externally reported result against this profile.
    ///
    /// Window count and multiplier come from the profile; the refund is the
    /// smaller of what was reported and what the tier allows.
    pub fn sanitize(&self, charge: u32, reported: &TimedHitResult) -> TimedHitResult {
        if reported.cancelled {
            return TimedHitResult::cancelled();
        }
        let mut scored = self.score(charge, reported.hits_succeeded);
        scored.cp_refund = scored.cp_refund.min(reported.cp_refund);
        scored
    }
}

/// Outcome of a timed-hit sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedHitResult {
    pub hits_succeeded: u32,
    pub total_hits: u32,
    pub cp_refund: u32,
    /// Multiplier applied to each successful hit.
    pub damage_multiplier: f32,
    pub cancelled: bool,
}

impl TimedHitResult {
    pub fn new(hits_succeeded: u32, total_hits: u32, cp_refund: u32, damage_multiplier: f32) -> Self {
        Self {
            hits_succeeded: hits_succeeded.min(total_hits),
            total_hits,
            cp_refund,
            damage_multiplier,
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            hits_succeeded: 0,
            total_hits: 0,
            cp_refund: 0,
            damage_multiplier: 0.0,
            cancelled: true,
        }
    }

    pub fn grade(&self) -> TimedGrade {
        if self.cancelled || self.total_hits == 0 {
            TimedGrade::None
        } else if self.hits_succeeded == 0 {
            TimedGrade::Fail
        } else if self.hits_succeeded >= self.total_hits {
            TimedGrade::Perfect
        } else {
            TimedGrade::Success
        }
    }

    /// `hits_succeeded / total_hits`, 0 when nothing was attempted.
    pub fn ratio(&self) -> f32 {
        if self.total_hits == 0 {
            return 0.0;
        }
        self.hits_succeeded as f32 / self.total_hits as f32
    }
}

/// Ordered damage values of the hits that land.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitSequence {
    hits: ArrayVec<u32, MAX_HITS>,
}

impl HitSequence {
    /// One hit carrying the whole amount.
    pub fn single(amount: u32) -> Self {
        let mut hits = ArrayVec::new();
        hits.push(amount);
        Self { hits }
    }

    /// Splits `amount` across `count` hits, remainder on the earliest hits.
    pub fn split(amount: u32, count: u32) -> Self {
        let count = count.clamp(1, MAX_HITS as u32);
        let share = amount / count;
        let remainder = amount % count;
        let hits = (0..count)
            .map(|i| share + u32::from(i < remainder))
            .collect();
        Self { hits }
    }

    /// One hit per successful window, each scaled by the per-hit multiplier.
    pub fn from_timed(base: u32, result: &TimedHitResult) -> Self {
        if result.cancelled {
            return Self::default();
        }
        let per_hit = scale(base, result.damage_multiplier);
        let count = result.hits_succeeded.min(MAX_HITS as u32);
        let hits = (0..count).map(|_| per_hit).collect();
        Self { hits }
    }

    pub fn hits(&self) -> &[u32] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Total damage reported for the sequence.
    pub fn total(&self) -> u32 {
        self.hits.iter().fold(0u32, |acc, hit| acc.saturating_add(*hit))
    }
}

/// Scales a non-zero amount, keeping at least 1 so a landed hit always counts.
pub fn scale(amount: u32, multiplier: f32) -> u32 {
    if amount == 0 || multiplier <= 0.0 {
        return 0;
    }
    let scaled = (amount as f64 * multiplier as f64).round();
    (scaled.min(u32::MAX as f64) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TimedHitProfile {
        TimedHitProfile {
            id: TimedHitProfileId(1),
            tiers: vec![
                TimedHitTier {
                    windows: 2,
                    per_hit_multiplier: 0.6,
                    refund_per_success: 1,
                    max_refund: 1,
                },
                TimedHitTier {
                    windows: 4,
                    per_hit_multiplier: 0.4,
                    refund_per_success: 1,
                    max_refund: 3,
                },
            ],
        }
    }

    #[test]
    fn tier_selection_clamps() {
        let profile = profile();
        assert_eq!(profile.tier(0).unwrap().windows, 2);
        assert_eq!(profile.tier(1).unwrap().windows, 2);
        assert_eq!(profile.tier(9).unwrap().windows, 4);
    }

    #[test]
    fn refund_is_capped_per_tier() {
        let result = profile().score(2, 4);
        assert_eq!(result.total_hits, 4);
        assert_eq!(result.cp_refund, 3);
        assert_eq!(result.grade(), TimedGrade::Perfect);
    }

    #[test]
    fn sanitize_never_trusts_reported_window_count() {
        let reported = TimedHitResult::new(9, 9, 9, 5.0);
        let clean = profile().sanitize(1, &reported);
        assert_eq!(clean.total_hits, 2);
        assert_eq!(clean.hits_succeeded, 2);
        assert_eq!(clean.cp_refund, 1);
        assert_eq!(clean.damage_multiplier, 0.6);
    }

    #[test]
    fn grades_follow_hit_ratio() {
        assert_eq!(TimedHitResult::new(0, 3, 0, 1.0).grade(), TimedGrade::Fail);
        assert_eq!(TimedHitResult::new(1, 3, 0, 1.0).grade(), TimedGrade::Success);
        assert_eq!(TimedHitResult::new(3, 3, 0, 1.0).grade(), TimedGrade::Perfect);
        assert_eq!(TimedHitResult::cancelled().grade(), TimedGrade::None);
        assert!(TimedGrade::Perfect > TimedGrade::Success);
        assert!(TimedGrade::Fail > TimedGrade::None);
    }

    #[test]
    fn partial_success_scales_damage() {
        let result = profile().score(2, 3);
        let hits = HitSequence::from_timed(50, &result);
        assert_eq!(hits.hits(), &[20, 20, 20]);
        assert_eq!(hits.total(), 60);
    }

    #[test]
    fn split_preserves_total() {
        let hits = HitSequence::split(10, 3);
        assert_eq!(hits.hits(), &[4, 3, 3]);
        assert_eq!(hits.total(), 10);
    }
}
