//! Target resolution.
//!
//! Targets resolve from an action's audience and shape against *living*
//! candidates:
//! - `Single` selects exactly one candidate (the explicit pick, or the first
//!   candidate in binding order)
//! - `All` selects every living audience member
//! - `SelfOnly` always resolves to the actor

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BattleState, CombatantId};

use super::definition::{TargetAudience, TargetShape};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingError {
    #[error("actor {0} is not bound to this battle")]
    UnknownActor(CombatantId),

    #[error("no living candidates for this action")]
    NoTargets,

    #[error("combatant {0} is not a legal target")]
    InvalidTarget(CombatantId),

    #[error("single-target action received {0} targets")]
    TooManyTargets(usize),
}

impl BattleError for TargetingError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            TargetingError::UnknownActor(_) => ErrorSeverity::Internal,
            TargetingError::NoTargets | TargetingError::InvalidTarget(_) => {
                ErrorSeverity::Recoverable
            }
            TargetingError::TooManyTargets(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            TargetingError::UnknownActor(_) => "TARGET_UNKNOWN_ACTOR",
            TargetingError::NoTargets => "TARGET_NONE",
            TargetingError::InvalidTarget(_) => "TARGET_INVALID",
            TargetingError::TooManyTargets(_) => "TARGET_TOO_MANY",
        }
    }
}

/// Builds legal candidate lists against the live combatants.
pub struct TargetResolver;

impl TargetResolver {
    /// Living audience members, in binding order.
    pub fn candidates(
        state: &BattleState,
        actor: CombatantId,
        audience: TargetAudience,
    ) -> Result<Vec<CombatantId>, TargetingError> {
        let source = state
            .combatant(actor)
            .ok_or(TargetingError::UnknownActor(actor))?;

        let candidates = match audience {
            TargetAudience::SelfOnly => {
                if source.is_alive() {
                    vec![actor]
                } else {
                    Vec::new()
                }
            }
            TargetAudience::Allies => state.living(source.side).map(|c| c.id).collect(),
            TargetAudience::Enemies => state
                .living(source.side.opposing())
                .map(|c| c.id)
                .collect(),
        };
        Ok(candidates)
    }

    /// Resolves the final ordered target list.
    ///
    /// Explicit targets are honored for `Single`; `All` always takes every
    /// candidate so the target order stays canonical for replay.
    pub fn resolve(
        state: &BattleState,
        actor: CombatantId,
        audience: TargetAudience,
        shape: TargetShape,
        explicit: Option<&[CombatantId]>,
    ) -> Result<Vec<CombatantId>, TargetingError> {
        let candidates = Self::candidates(state, actor, audience)?;
        if candidates.is_empty() {
            return Err(TargetingError::NoTargets);
        }

        match shape {
            TargetShape::All => Ok(candidates),
            TargetShape::Single => match explicit {
                None | Some([]) => Ok(vec![candidates[0]]),
                Some([target]) => {
                    if candidates.contains(target) {
                        Ok(vec![*target])
                    } else {
                        Err(TargetingError::InvalidTarget(*target))
                    }
                }
                Some(many) => Err(TargetingError::TooManyTargets(many.len())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Combatant, ResourceMeter, Resources, Side, StatBlock};

    fn combatant(id: u32, side: Side, hp: u32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("c{id}"),
            side,
            StatBlock::default(),
            Resources::new(
                ResourceMeter::new(hp, 10),
                ResourceMeter::full(0),
                ResourceMeter::full(0),
            ),
        )
    }

    fn state() -> BattleState {
        BattleState::new(vec![
            combatant(1, Side::Ally, 10),
            combatant(2, Side::Ally, 0),
            combatant(3, Side::Enemy, 10),
            combatant(4, Side::Enemy, 10),
        ])
        .unwrap()
    }

    #[test]
    fn area_selects_every_living_audience_member() {
        let state = state();
        let targets = TargetResolver::resolve(
            &state,
            CombatantId(1),
            TargetAudience::Enemies,
            TargetShape::All,
            None,
        )
        .unwrap();
        assert_eq!(targets, vec![CombatantId(3), CombatantId(4)]);

        let allies = TargetResolver::candidates(&state, CombatantId(1), TargetAudience::Allies)
            .unwrap();
        assert_eq!(allies, vec![CombatantId(1)]);
    }

    #[test]
    fn single_honors_explicit_pick() {
        let state = state();
        let targets = TargetResolver::resolve(
            &state,
            CombatantId(1),
            TargetAudience::Enemies,
            TargetShape::Single,
            Some(&[CombatantId(4)]),
        )
        .unwrap();
        assert_eq!(targets, vec![CombatantId(4)]);
    }

    #[test]
    fn dead_or_wrong_side_pick_is_invalid() {
        let state = state();
        for bad in [CombatantId(2), CombatantId(1)] {
            let err = TargetResolver::resolve(
                &state,
                CombatantId(1),
                TargetAudience::Enemies,
                TargetShape::Single,
                Some(&[bad]),
            )
            .unwrap_err();
            assert_eq!(err, TargetingError::InvalidTarget(bad));
        }
    }

    #[test]
    fn no_living_enemies_means_no_targets() {
        let mut state = state();
        for c in state.combatants.iter_mut().filter(|c| c.side == Side::Enemy) {
            c.alive = false;
        }
        let err = TargetResolver::resolve(
            &state,
            CombatantId(1),
            TargetAudience::Enemies,
            TargetShape::Single,
            None,
        )
        .unwrap_err();
        assert_eq!(err, TargetingError::NoTargets);
    }
}
