//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ActionEvent, BattleEvent, MarkChanged, PresentationEvent, TurnEvent};

/// Topics for event routing
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Turn starts, input prompts and commits
    Turn,
    /// Damage, restores and pipeline outcomes
    Action,
    /// Mark applied / refreshed / detonated / expired / cleared
    Mark,
    /// Animation stage requests and lock changes
    Presentation,
    /// Battle start, end and reset
    Battle,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Turn(TurnEvent),
    Action(ActionEvent),
    Mark(MarkChanged),
    Presentation(PresentationEvent),
    Battle(BattleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(_) => Topic::Turn,
            Event::Action(_) => Topic::Action,
            Event::Mark(_) => Topic::Mark,
            Event::Presentation(_) => Topic::Presentation,
            Event::Battle(_) => Topic::Battle,
        }
    }
}

struct Channels {
    turn: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
    mark: broadcast::Sender<Event>,
    presentation: broadcast::Sender<Event>,
    battle: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Mark => &self.mark,
            Topic::Presentation => &self.presentation,
            Topic::Battle => &self.battle,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is fire-and-forget: events sent to a
/// topic nobody listens to are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                turn: broadcast::channel(capacity).0,
                action: broadcast::channel(capacity).0,
                mark: broadcast::channel(capacity).0,
                presentation: broadcast::channel(capacity).0,
                battle: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            tracing::trace!(target: "runtime::events", %topic, "no subscribers for topic");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// The returned handle unsubscribes when dropped.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription {
            topic,
            rx: self.channels.sender(topic).subscribe(),
        }
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, Subscription> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to one topic.
///
/// Dropping the subscription detaches it from the bus.
pub struct Subscription {
    topic: Topic,
    rx: broadcast::Receiver<Event>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Waits for the next event. Returns `None` once the bus is gone.
    ///
    /// Events missed because the subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: "runtime::events",
                        topic = %self.topic,
                        skipped,
                        "subscriber lagged behind"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Drains every buffered event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::CombatantId;

    #[tokio::test]
    async fn events_route_by_topic() {
        let bus = EventBus::new();
        let mut turns = bus.subscribe(Topic::Turn);
        let mut battle = bus.subscribe(Topic::Battle);

        bus.publish(Event::Turn(TurnEvent::Started {
            actor: CombatantId(1),
            round: 1,
            turn: 1,
        }));

        assert!(matches!(
            turns.recv().await,
            Some(Event::Turn(TurnEvent::Started { turn: 1, .. }))
        ));
        assert!(battle.try_recv().is_none());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = EventBus::new();
        let first = bus.subscribe(Topic::Mark);
        let second = bus.subscribe(Topic::Mark);
        assert_eq!(bus.subscriber_count(Topic::Mark), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(Topic::Mark), 1);
        drop(second);
        assert_eq!(bus.subscriber_count(Topic::Mark), 0);

        bus.publish(Event::Battle(BattleEvent::Reset));
    }

    #[test]
    fn events_encode_with_topic_tag() {
        let event = Event::Battle(BattleEvent::Reset);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"Battle":"Reset"}"#);
        assert_eq!(event.topic(), Topic::Battle);
    }
}
