//! Mark Interaction Engine.
//!
//! Every combatant carries one [`MarkSlot`]. Actions carry ordered
//! [`MarkRule`]s that, once qualified, place, refresh, or detonate marks:
//!
//! | slot           | incoming                  | result   |
//! |----------------|---------------------------|----------|
//! | empty          | applicable                | apply    |
//! | same element   | any                       | refresh  |
//! | other element  | can detonate              | blow-up  |
//! | otherwise      |                           | ignore   |
//!
//! A blow-up clears the slot and looks up a [`ReactionDefinition`].
mod definition;
mod engine;
mod interaction;
mod reaction;
mod slot;

pub use definition::{
    ElementId, MarkDefinition, MarkId, MarkRegistry, MarkRule, MarkRuleKind, ReactionSubtype,
    RuleGates,
};
pub use engine::{MarkChangeReason, MarkEngine, MarkError, MarkEvent, MarkOutcome, MarkSettings};
pub use interaction::{MarkInteraction, resolve_interaction};
pub use reaction::{ReactionDefinition, ReactionEntry, ReactionId, ReactionKey, ReactionTable};
pub use slot::{ActiveMark, MarkSlot};
