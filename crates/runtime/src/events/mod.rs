//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Everything here is fire-and-forget; the one signal
//! the runtime waits on (stage completion) goes through the presentation gate.

mod bus;
mod types;

pub use bus::{Event, EventBus, Subscription, Topic};
pub use types::{ActionEvent, BattleEvent, MarkChanged, PresentationEvent, TurnEvent};
