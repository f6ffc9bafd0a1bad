//! The single mark slot every combatant carries.

use crate::state::CombatantId;

use super::definition::{ElementId, MarkDefinition, MarkId};

/// A mark currently sitting in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveMark {
    pub mark: MarkId,
    pub element: ElementId,
    pub applied_by: CombatantId,
    /// Owner's turn counter when the mark landed or was last refreshed.
    pub applied_at_owner_turn: u32,
    pub remaining_turns: u32,
}

/// Holds at most one mark. Empty is a valid state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkSlot {
    current: Option<ActiveMark>,
}

/// Attempted write over a different element without a blow-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupied {
    pub existing: ActiveMark,
}

impl MarkSlot {
    pub const fn empty() -> Self {
        Self { current: None }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn current(&self) -> Option<&ActiveMark> {
        self.current.as_ref()
    }

    pub fn element(&self) -> Option<ElementId> {
        self.current.map(|m| m.element)
    }

    /// Places a mark. A different element already in the slot is rejected.
    pub(crate) fn occupy(
        &mut self,
        definition: &MarkDefinition,
        applied_by: CombatantId,
        owner_turn: u32,
    ) -> Result<ActiveMark, Occupied> {
        if let Some(existing) = self.current
            && existing.element != definition.element
        {
            return Err(Occupied { existing });
        }
        let mark = ActiveMark {
            mark: definition.id,
            element: definition.element,
            applied_by,
            applied_at_owner_turn: owner_turn,
            remaining_turns: definition.duration(),
        };
        self.current = Some(mark);
        Ok(mark)
    }

    pub(crate) fn clear(&mut self) -> Option<ActiveMark> {
        self.current.take()
    }

    /// Counts down one owner turn. Returns the mark if it expired.
    pub(crate) fn tick(&mut self, owner_turn: u32) -> Option<ActiveMark> {
        let mark = self.current.as_mut()?;
        if owner_turn <= mark.applied_at_owner_turn {
            return None;
        }
        mark.remaining_turns = mark.remaining_turns.saturating_sub(1);
        if mark.remaining_turns == 0 {
            self.current.take()
        } else {
            None
        }
    }
}
