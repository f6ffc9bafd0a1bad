mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use battle_core::{ActionId, BattlePhase, BattleOutcome, Progress, Selection, TimedHitResult};
use battle_runtime::{
    ActionEvent, ActionPipeline, AiProvider, AnnounceStage, BattleEvent, ChannelProvider,
    EffectStage, Event, ExecutionContext, MarkStage, Next, PipelineError, PipelineStage, Runtime,
    RuntimeError, ScriptedProvider, Topic, TurnEvent, ValidationStage,
};

use common::{FLURRY, FOCUS, GUARD, KNIGHT, SEER, SLASH, WOLF, builtin};

#[tokio::test]
async fn ai_battle_runs_to_an_outcome() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .provider(AiProvider::new())
        .build()
        .expect("runtime should build");
    let mut battle = runtime.subscribe(Topic::Battle);

    let outcome = runtime.run().await.expect("battle should finish");

    let events = battle.drain();
    assert!(matches!(
        events.first(),
        Some(Event::Battle(BattleEvent::Started { combatants: 4, .. }))
    ));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Battle(BattleEvent::Ended { outcome: ended, .. }) if *ended == outcome
    )));

    let state = runtime.handle().query_state().await.unwrap();
    assert!(state.phase.is_terminal());
    assert_eq!(state.phase, outcome.phase());

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(err, RuntimeError::BattleOver(o) if o == outcome));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cancelled_prompts_fall_back_after_three_attempts() {
    let (content, roster) = builtin();
    let cancelled_flurry = Selection::new(FLURRY).with_timed_hit(TimedHitResult::cancelled());
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .enemy_provider(ScriptedProvider::with_answers([
            Some(cancelled_flurry.clone()),
            None,
            Some(cancelled_flurry),
        ]))
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();
    let mut turns = runtime.subscribe(Topic::Turn);
    let mut actions = runtime.subscribe(Topic::Action);

    let summary = runtime.step().await.unwrap();
    assert_eq!(summary.actor, WOLF);
    assert_eq!(summary.action, GUARD);
    assert!(summary.fallback);
    assert!(matches!(summary.progress, Progress::NextTurn(next) if next.actor == SEER));

    let attempts: Vec<u32> = turns
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Turn(TurnEvent::AwaitingInput { attempt, .. }) => Some(attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);

    let fallback = actions.drain().into_iter().find_map(|event| match event {
        Event::Action(ActionEvent::Fallback { requested, .. }) => Some(requested),
        _ => None,
    });
    assert_eq!(fallback, Some(Some(FLURRY)));

    // Cancelled timed input never spends the flurry cost.
    let state = runtime.handle().query_state().await.unwrap();
    let wolf = state.combatant(WOLF).unwrap();
    assert_eq!(wolf.resources.cp.current, 6);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_selection_falls_back_without_reprompting() {
    let (content, roster) = builtin();
    let unknown = ActionId(99);
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .enemy_provider(ScriptedProvider::new([Selection::new(unknown)]))
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();
    let mut turns = runtime.subscribe(Topic::Turn);
    let mut actions = runtime.subscribe(Topic::Action);

    let summary = runtime.step().await.unwrap();
    assert!(summary.fallback);
    assert_eq!(summary.action, GUARD);

    let prompts = turns
        .drain()
        .into_iter()
        .filter(|event| matches!(event, Event::Turn(TurnEvent::AwaitingInput { .. })))
        .count();
    assert_eq!(prompts, 1);

    let reason = actions.drain().into_iter().find_map(|event| match event {
        Event::Action(ActionEvent::Fallback {
            requested, reason, ..
        }) => {
            assert_eq!(requested, Some(unknown));
            Some(reason)
        }
        _ => None,
    });
    assert!(reason.is_some());

    runtime.shutdown().await.unwrap();
}

/// Faults the first action it sees, then forwards.
struct FaultOnce {
    tripped: AtomicBool,
}

#[async_trait]
impl PipelineStage for FaultOnce {
    fn name(&self) -> &'static str {
        "fault_once"
    }

    async fn handle(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        next: Next<'_>,
    ) -> Result<(), PipelineError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(PipelineError::Stage {
                stage: self.name(),
                reason: "injected".into(),
            });
        }
        next.run(ctx).await
    }
}

#[tokio::test]
async fn pipeline_fault_degrades_to_free_fallback() {
    let (content, roster) = builtin();
    let pipeline = ActionPipeline::builder()
        .stage(ValidationStage)
        .stage(FaultOnce {
            tripped: AtomicBool::new(false),
        })
        .stage(AnnounceStage)
        .stage(MarkStage)
        .stage(EffectStage)
        .build();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .pipeline(pipeline)
        .enemy_provider(ScriptedProvider::new([
            Selection::new(SLASH).with_target(KNIGHT)
        ]))
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();
    let mut actions = runtime.subscribe(Topic::Action);
    let mut turns = runtime.subscribe(Topic::Turn);

    let summary = runtime.step().await.unwrap();
    assert_eq!(summary.actor, WOLF);
    assert_eq!(summary.action, SLASH);
    assert!(summary.fallback);
    assert_eq!(summary.report.total_damage(), 0);

    let events = actions.drain();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Action(ActionEvent::Faulted { action, .. }) if *action == SLASH
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Action(ActionEvent::Fallback { requested: Some(action), .. }) if *action == SLASH
    )));

    let fallback_commits: Vec<u32> = turns
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Turn(TurnEvent::Committed {
                fallback: true,
                charge,
                ..
            }) => Some(charge),
            _ => None,
        })
        .collect();
    assert_eq!(fallback_commits, vec![0]);

    // The slash cost stays spent and the knight was never hit.
    let state = runtime.handle().query_state().await.unwrap();
    assert_eq!(state.combatant(WOLF).unwrap().resources.cp.current, 5);
    assert_eq!(state.combatant(KNIGHT).unwrap().resources.hp.current, 70);
    assert_eq!(state.phase, BattlePhase::AwaitingAction);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn channel_provider_feeds_ally_turns() {
    let (content, roster) = builtin();
    let (provider, input) = ChannelProvider::new(4);
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .ally_provider(provider)
        .enemy_provider(AiProvider::new())
        .build()
        .unwrap();

    input.select(Selection::new(FOCUS)).await.unwrap();

    let wolf_turn = runtime.step().await.unwrap();
    assert_eq!(wolf_turn.actor, WOLF);

    let seer_turn = runtime.step().await.unwrap();
    assert_eq!(seer_turn.actor, SEER);
    assert_eq!(seer_turn.action, FOCUS);
    assert!(!seer_turn.fallback);

    drop(input);
    let err = runtime.step().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderChannelClosed));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn reset_returns_to_idle_and_restarts_turn_order() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .provider(AiProvider::new())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut battle = handle.subscribe(Topic::Battle);

    for _ in 0..4 {
        handle.step().await.unwrap();
    }
    handle.reset().await.unwrap();

    let state = handle.query_state().await.unwrap();
    assert_eq!(state.phase, BattlePhase::Idle);
    assert!(state.combatants.iter().all(|c| c.mark.is_empty()));
    assert_eq!(state.turn.turns_taken, 0);
    assert!(
        battle
            .drain()
            .iter()
            .any(|event| matches!(event, Event::Battle(BattleEvent::Reset)))
    );

    let first = handle.start().await.unwrap();
    assert_eq!(first.actor, WOLF);
    assert_eq!(first.turn, 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_provider_is_reported() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderNotSet { .. }));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn builder_requires_content() {
    let (_, roster) = builtin();
    let result = Runtime::builder().combatants(roster).build();
    assert!(matches!(result, Err(RuntimeError::MissingContent)));
}

#[tokio::test]
async fn turn_limit_ends_in_defeat() {
    let (mut content, roster) = builtin();
    content.config.max_turns = 3;
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .provider(ScriptedProvider::default())
        .build()
        .unwrap();

    let outcome = runtime.run().await.unwrap();
    assert_eq!(outcome, BattleOutcome::TurnLimit);
    assert_eq!(outcome.phase(), BattlePhase::Defeat);

    runtime.shutdown().await.unwrap();
}
