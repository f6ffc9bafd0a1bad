mod common;

use std::time::Duration;

use battle_core::Selection;
use battle_runtime::{
    AiProvider, Event, PresentationEvent, PresentationStage, Runtime, ScriptedProvider, Topic,
    TurnEvent,
};

use common::{KNIGHT, SLASH, WOLF, builtin};

const SETTLE: Duration = Duration::from_millis(50);

#[tokio::test]
async fn manual_acknowledgement_paces_the_action() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .auto_acknowledge(false)
        .enemy_provider(ScriptedProvider::new([
            Selection::new(SLASH).with_target(KNIGHT)
        ]))
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut stages = handle.subscribe(Topic::Presentation);

    let step = tokio::spawn({
        let handle = handle.clone();
        async move { handle.step().await }
    });

    let mut played = Vec::new();
    while !step.is_finished() {
        let Ok(Some(event)) = tokio::time::timeout(SETTLE, stages.recv()).await else {
            continue;
        };
        if let Event::Presentation(PresentationEvent::AnimationStageRequest {
            ticket,
            stage,
            actor,
            ..
        }) = event
        {
            assert_eq!(actor, WOLF);
            tokio::time::sleep(SETTLE).await;
            assert!(!step.is_finished(), "{stage:?} must wait for its ticket");
            assert!(handle.stage_completed(ticket));
            assert!(!handle.stage_completed(ticket));
            played.push(stage);
        }
    }

    let summary = step.await.unwrap().unwrap();
    assert_eq!(summary.action, SLASH);
    assert_eq!(summary.report.hits.len(), 1);
    assert_eq!(
        played,
        vec![
            PresentationStage::Windup,
            PresentationStage::Hit { beat: 1, of: 1 }
        ]
    );
    assert!(handle.pending_stages().is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn lock_defers_the_enemy_turn() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .provider(AiProvider::new())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut turns = handle.subscribe(Topic::Turn);
    let mut presentation = handle.subscribe(Topic::Presentation);

    handle.set_lock(true);
    let step = tokio::spawn({
        let handle = handle.clone();
        async move { handle.step().await }
    });

    tokio::time::sleep(SETTLE).await;
    assert!(!step.is_finished());
    let parked = turns.drain();
    assert!(
        parked
            .iter()
            .any(|event| matches!(event, Event::Turn(TurnEvent::Started { actor, .. }) if *actor == WOLF))
    );
    assert!(
        !parked
            .iter()
            .any(|event| matches!(event, Event::Turn(TurnEvent::AwaitingInput { .. })))
    );

    handle.set_lock(false);
    let summary = step.await.unwrap().unwrap();
    assert_eq!(summary.actor, WOLF);

    let locks: Vec<bool> = presentation
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Presentation(PresentationEvent::LockChanged { locked }) => Some(locked),
            _ => None,
        })
        .collect();
    assert_eq!(locks, vec![true, false]);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn lock_holds_back_the_next_stage() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .auto_acknowledge(false)
        .enemy_provider(ScriptedProvider::new([
            Selection::new(SLASH).with_target(KNIGHT)
        ]))
        .ally_provider(AiProvider::new())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut stages = handle.subscribe(Topic::Presentation);

    let step = tokio::spawn({
        let handle = handle.clone();
        async move { handle.step().await }
    });

    let windup = loop {
        match stages.recv().await {
            Some(Event::Presentation(PresentationEvent::AnimationStageRequest {
                ticket,
                stage: PresentationStage::Windup,
                ..
            })) => break ticket,
            Some(_) => continue,
            None => panic!("bus closed before the windup"),
        }
    };
    handle.set_lock(true);
    assert!(handle.stage_completed(windup));

    tokio::time::sleep(SETTLE).await;
    assert!(!step.is_finished());
    assert!(
        !stages
            .drain()
            .iter()
            .any(|event| matches!(
                event,
                Event::Presentation(PresentationEvent::AnimationStageRequest { .. })
            )),
        "no stage may be requested while locked"
    );
    assert!(handle.pending_stages().is_empty());

    handle.set_lock(false);
    let hit = loop {
        match tokio::time::timeout(Duration::from_secs(1), stages.recv()).await {
            Ok(Some(Event::Presentation(PresentationEvent::AnimationStageRequest {
                ticket,
                stage,
                ..
            }))) => {
                assert_eq!(stage, PresentationStage::Hit { beat: 1, of: 1 });
                break ticket;
            }
            Ok(Some(_)) => continue,
            _ => panic!("hit stage never requested after unlocking"),
        }
    };
    assert!(handle.stage_completed(hit));

    let summary = step.await.unwrap().unwrap();
    assert_eq!(summary.actor, WOLF);
    assert_eq!(summary.report.hits.len(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_abandons_an_unacknowledged_stage() {
    let (content, roster) = builtin();
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .auto_acknowledge(false)
        .provider(AiProvider::new())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut stages = handle.subscribe(Topic::Presentation);

    let step = tokio::spawn({
        let handle = handle.clone();
        async move { handle.step().await }
    });
    let first = stages.recv().await;
    assert!(matches!(
        first,
        Some(Event::Presentation(PresentationEvent::AnimationStageRequest { .. }))
    ));

    runtime.shutdown().await.unwrap();

    // The parked turn ends on the closed gate instead of hanging.
    let _ = tokio::time::timeout(Duration::from_secs(1), step)
        .await
        .expect("step should not hang after shutdown");
}
