//! Battle State Machine.
//!
//! [`BattleEngine`] is the only writer of phase and turn fields. It borrows the
//! state mutably for the duration of one step and reads static content through
//! [`BattleEnv`]. The async runtime drives it; nothing here suspends.

mod combat;
mod commit;
mod legal;
mod phase;
mod turns;

pub use combat::{HitOutcome, MarkPass, ReactionOutcome};
pub use commit::{CommitError, Committed};
pub use phase::{BattleOutcome, BattlePhase, PhaseError};
pub use turns::{Progress, TurnStart};

use crate::env::BattleEnv;
use crate::mark::{MarkEngine, MarkEvent};
use crate::state::{BattleState, CombatantId, Side, TurnState};

pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
    env: BattleEnv<'a>,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState, env: BattleEnv<'a>) -> Self {
        Self { state, env }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    pub fn env(&self) -> BattleEnv<'a> {
        self.env
    }

    pub fn phase(&self) -> BattlePhase {
        self.state.phase
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.state.turn.current
    }

    /// `Idle → AwaitingAction`, selecting the first actor.
    pub fn start_battle(&mut self) -> Result<TurnStart, PhaseError> {
        self.transition(BattlePhase::AwaitingAction)?;
        tracing::info!(
            target: "battle::engine",
            combatants = self.state.combatants.len(),
            seed = self.env.config.seed,
            "battle started"
        );
        self.advance_turn()
    }

    /// `Resolving → Victory | Defeat | AwaitingAction`.
    ///
    /// Victory is checked first, so an action that wipes both sides wins.
    pub fn finish_resolution(&mut self) -> Result<Progress, PhaseError> {
        if self.state.phase != BattlePhase::Resolving {
            return Err(PhaseError::InvalidTransition {
                from: self.state.phase,
                to: BattlePhase::AwaitingAction,
            });
        }

        if let Some(outcome) = self.outcome() {
            self.transition(outcome.phase())?;
            match outcome {
                BattleOutcome::TurnLimit => tracing::warn!(
                    target: "battle::engine",
                    turns = self.state.turn.turns_taken,
                    "turn limit reached, battle ends in defeat"
                ),
                _ => tracing::info!(target: "battle::engine", %outcome, "battle ended"),
            }
            return Ok(Progress::Ended(outcome));
        }

        self.transition(BattlePhase::AwaitingAction)?;
        self.advance_turn().map(Progress::NextTurn)
    }

    /// Forces `Idle`, clearing every mark, the turn order and the judgment log.
    pub fn reset_battle(&mut self) -> Vec<MarkEvent> {
        let cleared = MarkEngine::clear_all(self.state);
        for combatant in &mut self.state.combatants {
            combatant.turn_counter = 0;
        }
        self.state.turn = TurnState::default();
        self.state.judgments.clear();
        self.state.phase = BattlePhase::Idle;
        tracing::debug!(target: "battle::engine", "battle reset");
        cleared
    }

    /// Terminal outcome of the current state, if any.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if !self.state.has_living(Side::Enemy) {
            Some(BattleOutcome::Victory)
        } else if !self.state.has_living(Side::Ally) {
            Some(BattleOutcome::Defeat)
        } else if self
            .env
            .config
            .turn_limit_reached(self.state.turn.turns_taken)
        {
            Some(BattleOutcome::TurnLimit)
        } else {
            None
        }
    }

    fn transition(&mut self, next: BattlePhase) -> Result<(), PhaseError> {
        let from = self.state.phase;
        if !from.can_transition(next) {
            return Err(PhaseError::InvalidTransition { from, to: next });
        }
        tracing::trace!(target: "battle::engine", %from, to = %next, "phase transition");
        self.state.phase = next;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::action::{
        ActionCatalog, ActionCost, ActionDefinition, ActionEffect, ActionId, EffectId,
        TargetAudience, TargetShape,
    };
    use crate::config::BattleConfig;
    use crate::economy::{TimedHitProfile, TimedHitProfileId, TimedHitTier};
    use crate::env::BattleContent;
    use crate::mark::{
        ElementId, MarkDefinition, MarkId, MarkRegistry, MarkRule, ReactionDefinition,
        ReactionEntry, ReactionId, ReactionKey, ReactionTable, RuleGates,
    };
    use crate::state::{
        BattleState, Combatant, CombatantId, PowerStat, ResourceMeter, Resources, Side, StatBlock,
    };

    pub const GUARD: ActionId = ActionId(1);
    pub const SLASH: ActionId = ActionId(2);
    pub const MOONBEAM: ActionId = ActionId(3);
    pub const SUNBURST: ActionId = ActionId(4);
    pub const FLURRY: ActionId = ActionId(5);
    pub const MEND: ActionId = ActionId(6);
    pub const UNBOUND: ActionId = ActionId(9);

    pub const MOON: MarkId = MarkId(1);
    pub const SUN: MarkId = MarkId(2);

    pub fn content() -> BattleContent {
        let catalog = ActionCatalog::builder()
            .effect(EffectId(1), ActionEffect::Guard)
            .effect(
                EffectId(2),
                ActionEffect::Strike {
                    power: 10,
                    stat: PowerStat::Physical,
                },
            )
            .effect(
                EffectId(3),
                ActionEffect::Strike {
                    power: 6,
                    stat: PowerStat::Magic,
                },
            )
            .effect(
                EffectId(4),
                ActionEffect::MultiStrike {
                    power: 12,
                    stat: PowerStat::Physical,
                    hits: 3,
                },
            )
            .effect(EffectId(5), ActionEffect::Heal { power: 8 })
            .timed_hit(TimedHitProfile {
                id: TimedHitProfileId(1),
                tiers: vec![TimedHitTier {
                    windows: 3,
                    per_hit_multiplier: 1.0,
                    refund_per_success: 1,
                    max_refund: 2,
                }],
            })
            .action(ActionDefinition::new(
                GUARD,
                "guard",
                ActionCost::FREE,
                TargetAudience::SelfOnly,
                TargetShape::Single,
                EffectId(1),
            ))
            .action(ActionDefinition::new(
                SLASH,
                "slash",
                ActionCost::new(0, 2),
                TargetAudience::Enemies,
                TargetShape::Single,
                EffectId(2),
            ))
            .action(
                ActionDefinition::new(
                    MOONBEAM,
                    "moonbeam",
                    ActionCost::new(3, 0),
                    TargetAudience::Enemies,
                    TargetShape::Single,
                    EffectId(3),
                )
                .with_mark_rule(MarkRule::apply(MOON).with_gates(RuleGates::open())),
            )
            .action(
                ActionDefinition::new(
                    SUNBURST,
                    "sunburst",
                    ActionCost::new(5, 0),
                    TargetAudience::Enemies,
                    TargetShape::All,
                    EffectId(3),
                )
                .with_mark_rule(MarkRule::apply(SUN).with_chance(1.0)),
            )
            .action(
                ActionDefinition::new(
                    FLURRY,
                    "flurry",
                    ActionCost::new(0, 5),
                    TargetAudience::Enemies,
                    TargetShape::Single,
                    EffectId(4),
                )
                .with_timed_hit(TimedHitProfileId(1)),
            )
            .action(ActionDefinition::new(
                MEND,
                "mend",
                ActionCost::new(4, 0),
                TargetAudience::Allies,
                TargetShape::Single,
                EffectId(5),
            ))
            .action(ActionDefinition::new(
                UNBOUND,
                "unbound",
                ActionCost::FREE,
                TargetAudience::Enemies,
                TargetShape::Single,
                EffectId(99),
            ))
            .build()
            .unwrap();

        let marks = MarkRegistry::new([
            MarkDefinition::elemental(MOON, "moon", ElementId(1), 2),
            MarkDefinition::elemental(SUN, "sun", ElementId(2), 2),
        ]);
        let reactions = ReactionTable::new([ReactionEntry {
            key: ReactionKey::new(ElementId(1), ElementId(2), None),
            reaction: ReactionDefinition {
                id: ReactionId(1),
                name: "eclipse".into(),
                bonus_damage: 7,
            },
        }]);

        BattleContent::new(catalog, BattleConfig::new().with_seed(7))
            .with_marks(marks)
            .with_reactions(reactions)
    }

    pub fn unit(id: u32, side: Side, speed: u32, hp: u32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("unit{id}"),
            side,
            StatBlock {
                physical_power: 4,
                magic_power: 4,
                defense: 2,
                resistance: 2,
                speed,
            },
            Resources::new(
                ResourceMeter::full(hp),
                ResourceMeter::full(10),
                ResourceMeter::new(12, 20),
            ),
        )
    }

    /// Hero (#1, fastest) and a sidekick (#2) against two slimes (#3, #4).
    pub fn state() -> BattleState {
        BattleState::new(vec![
            unit(1, Side::Ally, 9, 40),
            unit(2, Side::Ally, 3, 40),
            unit(3, Side::Enemy, 5, 30),
            unit(4, Side::Enemy, 5, 30),
        ])
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::action::Selection;
    use crate::state::ResourceLedger;

    #[test]
    fn start_requires_idle() {
        let content = content();
        let mut state = state();
        let mut engine = BattleEngine::new(&mut state, content.env());
        let first = engine.start_battle().unwrap();
        assert_eq!(first.actor, CombatantId(1));
        assert_eq!(engine.phase(), BattlePhase::AwaitingAction);
        assert!(matches!(
            engine.start_battle(),
            Err(PhaseError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn wiping_enemies_is_victory() {
        let content = content();
        let mut state = state();
        let mut engine = BattleEngine::new(&mut state, content.env());
        engine.start_battle().unwrap();
        engine.commit(Selection::new(GUARD)).unwrap();

        for id in [3, 4] {
            engine.state.damage(CombatantId(id), 100).unwrap();
        }
        let progress = engine.finish_resolution().unwrap();
        assert_eq!(progress, Progress::Ended(BattleOutcome::Victory));
        assert_eq!(engine.phase(), BattlePhase::Victory);
    }

    #[test]
    fn losing_every_ally_is_defeat() {
        let content = content();
        let mut state = state();
        let mut engine = BattleEngine::new(&mut state, content.env());
        engine.start_battle().unwrap();
        engine.commit(Selection::new(GUARD)).unwrap();

        for id in [1, 2] {
            engine.state.damage(CombatantId(id), 100).unwrap();
        }
        assert_eq!(
            engine.finish_resolution().unwrap(),
            Progress::Ended(BattleOutcome::Defeat)
        );
    }

    #[test]
    fn turn_limit_ends_in_defeat() {
        let mut content = content();
        content.config.max_turns = 2;
        let mut state = state();
        let mut engine = BattleEngine::new(&mut state, content.env());
        engine.start_battle().unwrap();

        engine.commit(Selection::new(GUARD)).unwrap();
        assert!(matches!(
            engine.finish_resolution().unwrap(),
            Progress::NextTurn(_)
        ));

        engine.commit(Selection::new(GUARD)).unwrap();
        assert_eq!(
            engine.finish_resolution().unwrap(),
            Progress::Ended(BattleOutcome::TurnLimit)
        );
        assert_eq!(engine.phase(), BattlePhase::Defeat);
    }

    #[test]
    fn reset_forces_idle_and_clears_marks() {
        let content = content();
        let mut state = state();
        let mut engine = BattleEngine::new(&mut state, content.env());
        engine.start_battle().unwrap();
        let committed = engine
            .commit(Selection::new(MOONBEAM).with_target(CombatantId(3)))
            .unwrap();
        engine.apply_marks(&committed);
        assert!(!engine.state().combatant(CombatantId(3)).unwrap().mark.is_empty());

        let cleared = engine.reset_battle();
        assert_eq!(cleared.len(), 1);
        assert_eq!(engine.phase(), BattlePhase::Idle);
        assert!(engine.state().judgments.is_empty());
        assert!(engine.start_battle().is_ok());
    }
}
