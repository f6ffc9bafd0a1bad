//! Built-in pipeline stages.

use async_trait::async_trait;

use battle_core::{ActionEffect, CombatantId, HitOutcome, ReactionId};

use super::{ExecutionContext, Next, PipelineError, PipelineStage};
use crate::events::{ActionEvent, Event};
use crate::presentation::PresentationStage;

fn damage_event(hit: &HitOutcome, reaction: Option<ReactionId>) -> Event {
    Event::Action(ActionEvent::DamageApplied {
        source: hit.source,
        target: hit.target,
        amount: hit.damage.applied,
        remaining: hit.damage.remaining,
        killed: hit.damage.killed,
        reaction,
    })
}

fn is_alive(ctx: &ExecutionContext<'_, '_>, id: CombatantId) -> bool {
    ctx.engine
        .state()
        .combatant(id)
        .is_some_and(|c| c.is_alive())
}

/// Stops actions whose actor or every target went down before resolution.
pub struct ValidationStage;

#[async_trait]
impl PipelineStage for ValidationStage {
    fn name(&self) -> &'static str {
        "validation"
    }

    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError> {
        if !is_alive(ctx, ctx.actor()) {
            ctx.halt(self.name(), "actor is down");
            return Ok(());
        }
        let state = ctx.engine.state();
        let any_target = ctx
            .committed
            .target_ids()
            .filter_map(|target| state.combatant(target))
            .any(|c| c.is_alive());
        if !any_target {
            ctx.halt(self.name(), "no living target");
            return Ok(());
        }
        next.run(ctx).await
    }
}

/// Publishes `Resolving`, plays the wind-up, and reports `Resolved` afterwards.
pub struct AnnounceStage;

#[async_trait]
impl PipelineStage for AnnounceStage {
    fn name(&self) -> &'static str {
        "announce"
    }

    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError> {
        let actor = ctx.actor();
        let action = ctx.committed.definition.id;
        ctx.publish(Event::Action(ActionEvent::Resolving {
            actor,
            action,
            targets: ctx.committed.target_ids().collect(),
        }));
        ctx.gate
            .request_stage(PresentationStage::Windup, actor, None)
            .await?;

        next.run(ctx).await?;

        if ctx.report.halted.is_none() {
            ctx.publish(Event::Action(ActionEvent::Resolved {
                actor,
                action,
                total_damage: ctx.report.total_damage(),
            }));
        }
        Ok(())
    }
}

/// Applies the action's mark rules once the effect has landed.
pub struct MarkStage;

#[async_trait]
impl PipelineStage for MarkStage {
    fn name(&self) -> &'static str {
        "marks"
    }

    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError> {
        next.run(ctx).await?;
        if ctx.report.halted.is_some() || ctx.committed.definition.mark_rules.is_empty() {
            return Ok(());
        }

        let pass = ctx.engine.apply_marks(&ctx.committed);
        for event in &pass.events {
            ctx.publish(Event::Mark(*event));
        }
        for outcome in &pass.reactions {
            ctx.gate
                .request_stage(
                    PresentationStage::Reaction,
                    outcome.hit.source,
                    Some(outcome.hit.target),
                )
                .await?;
            ctx.publish(damage_event(&outcome.hit, Some(outcome.reaction.id)));
        }

        ctx.report.marks.extend(pass.events);
        ctx.report.reactions.extend(pass.reactions);
        Ok(())
    }
}

/// Runs the effect: one presentation beat per hit, then the CP refund.
pub struct EffectStage;

impl EffectStage {
    async fn strike(
        ctx: &mut ExecutionContext<'_, '_>,
        target: CombatantId,
    ) -> Result<(), PipelineError> {
        let sequence = ctx.engine.plan_hits(&ctx.committed, target)?;
        let source = ctx.actor();
        let beats = sequence.len() as u32;

        for (index, &amount) in sequence.hits().iter().enumerate() {
            let stage = PresentationStage::Hit {
                beat: index as u32 + 1,
                of: beats,
            };
            ctx.gate.request_stage(stage, source, Some(target)).await?;

            let hit = ctx.engine.apply_hit(source, target, amount)?;
            ctx.publish(damage_event(&hit, None));
            if let Some(cleared) = hit.cleared {
                ctx.publish(Event::Mark(cleared));
                ctx.report.marks.push(cleared);
            }
            ctx.report.hits.push(hit);
            if hit.damage.killed {
                break;
            }
        }
        Ok(())
    }

    async fn support(
        ctx: &mut ExecutionContext<'_, '_>,
        target: CombatantId,
    ) -> Result<(), PipelineError> {
        let source = ctx.actor();
        ctx.gate
            .request_stage(PresentationStage::Support, source, Some(target))
            .await?;
        let amount = ctx.engine.apply_support(&ctx.committed, target)?;
        ctx.publish(Event::Action(ActionEvent::Restored {
            source,
            target,
            amount,
        }));
        ctx.report.restored.push((target, amount));
        Ok(())
    }
}

#[async_trait]
impl PipelineStage for EffectStage {
    fn name(&self) -> &'static str {
        "effect"
    }

    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError> {
        let targets: Vec<CombatantId> = ctx.committed.target_ids().collect();
        let effect = ctx.committed.effect.clone();

        for target in targets {
            if !is_alive(ctx, target) {
                continue;
            }
            match effect {
                ActionEffect::Strike { .. } | ActionEffect::MultiStrike { .. } => {
                    Self::strike(ctx, target).await?
                }
                ActionEffect::Heal { .. } | ActionEffect::Restore { .. } => {
                    Self::support(ctx, target).await?
                }
                ActionEffect::Guard => {}
            }
        }

        let refunded = ctx.engine.refund_charge(&ctx.committed)?;
        if refunded > 0 {
            ctx.publish(Event::Action(ActionEvent::ChargeRefunded {
                actor: ctx.actor(),
                amount: refunded,
            }));
        }
        ctx.report.refunded = refunded;

        next.run(ctx).await
    }
}

