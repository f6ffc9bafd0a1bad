//! Reaction table: what happens when one element detonates another.

use std::collections::HashMap;

use super::definition::{ElementId, ReactionSubtype};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionKey {
    pub existing: ElementId,
    pub incoming: ElementId,
    pub subtype: Option<ReactionSubtype>,
}

impl ReactionKey {
    pub const fn new(
        existing: ElementId,
        incoming: ElementId,
        subtype: Option<ReactionSubtype>,
    ) -> Self {
        Self {
            existing,
            incoming,
            subtype,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionDefinition {
    pub id: ReactionId,
    pub name: String,
    /// Flat damage dealt to the detonated combatant.
    pub bonus_damage: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionEntry {
    pub key: ReactionKey,
    pub reaction: ReactionDefinition,
}

#[derive(Clone, Debug, Default)]
pub struct ReactionTable {
    reactions: HashMap<ReactionKey, ReactionDefinition>,
}

impl ReactionTable {
    pub fn new(entries: impl IntoIterator<Item = ReactionEntry>) -> Self {
        Self {
            reactions: entries
                .into_iter()
                .map(|entry| (entry.key, entry.reaction))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: ReactionKey, reaction: ReactionDefinition) {
        self.reactions.insert(key, reaction);
    }

    /// Looks up `(existing, incoming, subtype)`, then `(existing, incoming)`.
    pub fn lookup(&self, key: ReactionKey) -> Option<&ReactionDefinition> {
        self.reactions.get(&key).or_else(|| {
            key.subtype.and_then(|_| {
                self.reactions
                    .get(&ReactionKey::new(key.existing, key.incoming, None))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}
