//! Action provider implementations for different combatant behaviors.

pub mod ai;
pub mod channel;
pub mod scripted;

pub use ai::AiProvider;
pub use channel::{ChannelProvider, SelectionSender};
pub use scripted::ScriptedProvider;
