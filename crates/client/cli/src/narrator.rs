//! Turns runtime events into log lines and plays presentation stages.
use std::collections::HashMap;
use std::time::Duration;

use battle_core::{BattleState, CombatantId};
use battle_runtime::{
    ActionEvent, BattleEvent, Event, PresentationEvent, RuntimeHandle, Subscription, Topic,
    TurnEvent,
};

const TOPICS: [Topic; 5] = [
    Topic::Battle,
    Topic::Turn,
    Topic::Action,
    Topic::Mark,
    Topic::Presentation,
];

/// Consumes every topic until the bus closes.
pub struct Narrator {
    handle: RuntimeHandle,
    names: HashMap<CombatantId, String>,
    stage_delay: Option<Duration>,
    json: bool,
}

impl Narrator {
    pub fn new(
        handle: RuntimeHandle,
        state: &BattleState,
        stage_delay: Option<Duration>,
        json: bool,
    ) -> Self {
        let names = state
            .combatants
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect();
        Self {
            handle,
            names,
            stage_delay,
            json,
        }
    }

    /// Spawns one listener per topic.
    pub fn spawn(self) -> Vec<tokio::task::JoinHandle<()>> {
        let mut subscriptions = self.handle.subscribe_multiple(&TOPICS);
        TOPICS
            .iter()
            .filter_map(|topic| subscriptions.remove(topic))
            .map(|subscription| {
                let narrator = self.clone_view();
                tokio::spawn(narrator.listen(subscription))
            })
            .collect()
    }

    fn clone_view(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            names: self.names.clone(),
            stage_delay: self.stage_delay,
            json: self.json,
        }
    }

    async fn listen(self, mut subscription: Subscription) {
        while let Some(event) = subscription.recv().await {
            if self.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(error) => tracing::warn!(%error, "failed to encode event"),
                }
            }
            self.narrate(&event);

            if let Event::Presentation(PresentationEvent::AnimationStageRequest {
                ticket,
                duration_hint_ms,
                ..
            }) = event
                && let Some(delay) = self.stage_delay
            {
                tokio::time::sleep(delay.min(Duration::from_millis(duration_hint_ms))).await;
                self.handle.stage_completed(ticket);
            }
        }
    }

    fn name(&self, id: CombatantId) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or("?")
    }

    fn narrate(&self, event: &Event) {
        match event {
            Event::Battle(BattleEvent::Started { combatants, seed }) => {
                tracing::info!(combatants, seed, "battle started");
            }
            Event::Battle(BattleEvent::Ended { outcome, turns }) => {
                tracing::info!(%outcome, turns, "battle ended");
            }
            Event::Battle(BattleEvent::Reset) => tracing::info!("battle reset"),
            Event::Turn(TurnEvent::Started { actor, round, turn }) => {
                tracing::info!(round, turn, "{}'s turn", self.name(*actor));
            }
            Event::Turn(TurnEvent::Committed {
                actor,
                action,
                charge,
                fallback,
                ..
            }) => {
                tracing::info!(%action, charge, fallback, "{} commits", self.name(*actor));
            }
            Event::Turn(TurnEvent::AwaitingInput { .. }) => {}
            Event::Action(ActionEvent::DamageApplied {
                source,
                target,
                amount,
                remaining,
                killed,
                reaction,
            }) => {
                tracing::info!(
                    amount,
                    remaining,
                    reaction = ?reaction,
                    "{} hits {}{}",
                    self.name(*source),
                    self.name(*target),
                    if *killed { " and defeats them" } else { "" }
                );
            }
            Event::Action(ActionEvent::Restored {
                source,
                target,
                amount,
            }) => {
                tracing::info!(amount, "{} restores {}", self.name(*source), self.name(*target));
            }
            Event::Action(ActionEvent::Fallback { actor, reason, .. }) => {
                tracing::warn!(%reason, "{} falls back", self.name(*actor));
            }
            Event::Action(ActionEvent::Faulted { actor, error, .. }) => {
                tracing::error!(%error, "{}'s action faulted", self.name(*actor));
            }
            Event::Action(other) => tracing::debug!(event = ?other),
            Event::Mark(change) => {
                tracing::info!(
                    mark = %change.mark,
                    reason = %change.reason,
                    "{}'s mark changed",
                    self.name(change.target)
                );
            }
            Event::Presentation(other) => tracing::trace!(event = ?other),
        }
    }
}
