//! Effect implementations.
//!
//! Effects are one tagged enum instead of a hierarchy of optional interfaces.
//! What an effect supports (area targeting, timed hits) is declared through
//! [`EffectCapabilities`] and checked once when the catalog is built.

use bitflags::bitflags;

use crate::economy::{HitSequence, TimedHitResult, scale};
use crate::state::{PowerStat, ResourceKind, StatBlock};

bitflags! {
    /// What an effect implementation can do.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectCapabilities: u8 {
        /// Can resolve against every member of an audience.
        const MULTI_TARGET = 1 << 0;
        /// Consumes a timed-hit result and lands one hit per success.
        const TIMED_HIT    = 1 << 1;
        /// Reduces target HP.
        const OFFENSIVE    = 1 << 2;
        /// Restores target resources.
        const SUPPORT      = 1 << 3;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionEffect {
    /// One hit of `power + attacker stat` against the matching defense.
    Strike { power: u32, stat: PowerStat },

    /// Several beats; with a timed-hit result only successful windows land.
    MultiStrike {
        power: u32,
        stat: PowerStat,
        hits: u32,
    },

    /// Restores HP by `power + magic power / 2`.
    Heal { power: u32 },

    /// Restores a flat amount of a resource.
    Restore { resource: ResourceKind, amount: u32 },

    /// Does nothing. Always affordable when free, used as the last-resort fallback.
    Guard,
}

impl ActionEffect {
    pub fn capabilities(&self) -> EffectCapabilities {
        match self {
            ActionEffect::Strike { .. } => {
                EffectCapabilities::OFFENSIVE | EffectCapabilities::MULTI_TARGET
            }
            ActionEffect::MultiStrike { .. } => {
                EffectCapabilities::OFFENSIVE
                    | EffectCapabilities::MULTI_TARGET
                    | EffectCapabilities::TIMED_HIT
            }
            ActionEffect::Heal { .. } | ActionEffect::Restore { .. } => {
                EffectCapabilities::SUPPORT | EffectCapabilities::MULTI_TARGET
            }
            ActionEffect::Guard => EffectCapabilities::SUPPORT,
        }
    }

    pub fn is_offensive(&self) -> bool {
        self.capabilities().contains(EffectCapabilities::OFFENSIVE)
    }

    /// Nominal power, used by AI providers to rank options.
    pub fn power(&self) -> u32 {
        match self {
            ActionEffect::Strike { power, .. } | ActionEffect::Heal { power } => *power,
            ActionEffect::MultiStrike { power, hits, .. } => power.saturating_mul(*hits),
            ActionEffect::Restore { amount, .. } => *amount,
            ActionEffect::Guard => 0,
        }
    }

    /// Plans the damage hits against one defender.
    ///
    /// `multiplier` is the charge multiplier. Returns an empty sequence for
    /// non-offensive effects.
    pub fn plan_hits(
        &self,
        attacker: &StatBlock,
        defender: &StatBlock,
        multiplier: f32,
        timed: Option<&TimedHitResult>,
    ) -> HitSequence {
        match self {
            ActionEffect::Strike { power, stat } => {
                HitSequence::single(strike_damage(attacker, defender, *power, *stat, multiplier))
            }
            ActionEffect::MultiStrike { power, stat, hits } => {
                let base = strike_damage(attacker, defender, *power, *stat, multiplier);
                match timed {
                    Some(result) if !result.cancelled && result.total_hits > 0 => {
                        HitSequence::from_timed(base, result)
                    }
                    _ => HitSequence::split(base, *hits),
                }
            }
            ActionEffect::Heal { .. } | ActionEffect::Restore { .. } | ActionEffect::Guard => {
                HitSequence::default()
            }
        }
    }

    /// Healing amount for support effects, scaled by the charge multiplier.
    pub fn healing(&self, caster: &StatBlock, multiplier: f32) -> u32 {
        match self {
            ActionEffect::Heal { power } => {
                scale(power.saturating_add(caster.magic_power / 2), multiplier)
            }
            _ => 0,
        }
    }
}

/// Damage of one strike before hit splitting.
///
/// `(power + attacker stat - defense / 2)`, at least 1, scaled by `multiplier`.
pub fn strike_damage(
    attacker: &StatBlock,
    defender: &StatBlock,
    power: u32,
    stat: PowerStat,
    multiplier: f32,
) -> u32 {
    let offense = power.saturating_add(attacker.power(stat));
    let raw = offense.saturating_sub(defender.mitigation(stat) / 2).max(1);
    scale(raw, multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::TimedHitResult;

    fn stats(power: u32, defense: u32) -> StatBlock {
        StatBlock {
            physical_power: power,
            magic_power: power,
            defense,
            resistance: defense,
            speed: 10,
        }
    }

    #[test]
    fn strike_applies_mitigation_and_multiplier() {
        let damage = strike_damage(&stats(10, 0), &stats(0, 8), 20, PowerStat::Physical, 1.5);
        // (20 + 10 - 4) * 1.5 = 39
        assert_eq!(damage, 39);
    }

    #[test]
    fn strike_never_drops_below_one() {
        let damage = strike_damage(&stats(0, 0), &stats(0, 500), 1, PowerStat::Magic, 1.0);
        assert_eq!(damage, 1);
    }

    #[test]
    fn multi_strike_uses_timed_windows_when_present() {
        let effect = ActionEffect::MultiStrike {
            power: 20,
            stat: PowerStat::Physical,
            hits: 3,
        };
        let attacker = stats(10, 0);
        let defender = stats(0, 0);

        let untimed = effect.plan_hits(&attacker, &defender, 1.0, None);
        assert_eq!(untimed.len(), 3);
        assert_eq!(untimed.total(), 30);

        let timed = TimedHitResult::new(2, 4, 0, 0.5);
        let planned = effect.plan_hits(&attacker, &defender, 1.0, Some(&timed));
        assert_eq!(planned.hits(), &[15, 15]);
        assert_eq!(planned.total(), 30);
    }

    #[test]
    fn capabilities_are_declared_per_variant() {
        assert!(
            ActionEffect::Guard
                .capabilities()
                .contains(EffectCapabilities::SUPPORT)
        );
        assert!(
            !ActionEffect::Strike {
                power: 1,
                stat: PowerStat::Physical
            }
            .capabilities()
            .contains(EffectCapabilities::TIMED_HIT)
        );
    }
}
