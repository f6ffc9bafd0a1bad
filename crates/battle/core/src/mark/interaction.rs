//! Pure interaction table between a slot's current element and an incoming mark.

use super::definition::{ElementId, MarkDefinition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkInteraction {
    /// Empty slot, the incoming mark lands.
    Apply,
    /// Same element, the existing mark's duration restarts.
    Refresh,
    /// Different element detonates the existing mark and clears the slot.
    BlowUp { existing: ElementId },
    /// Nothing happens.
    Ignore,
}

/// Decides what an incoming mark does to a slot holding `current`.
pub fn resolve_interaction(
    current: Option<ElementId>,
    incoming: &MarkDefinition,
) -> MarkInteraction {
    match current {
        None if incoming.can_be_applied_as_mark => MarkInteraction::Apply,
        None => MarkInteraction::Ignore,
        Some(existing) if existing == incoming.element => MarkInteraction::Refresh,
        Some(existing) if incoming.can_detonate_marks => MarkInteraction::BlowUp { existing },
        Some(_) => MarkInteraction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::MarkId;

    fn mark(element: u32, applicable: bool, detonates: bool) -> MarkDefinition {
        MarkDefinition {
            id: MarkId(element),
            name: format!("m{element}"),
            element: ElementId(element),
            can_be_applied_as_mark: applicable,
            can_detonate_marks: detonates,
            base_duration_turns: 2,
        }
    }

    #[test]
    fn interaction_table() {
        let fire = ElementId(1);
        let cases = [
            (None, mark(1, true, true), MarkInteraction::Apply),
            (None, mark(1, false, true), MarkInteraction::Ignore),
            (Some(fire), mark(1, true, true), MarkInteraction::Refresh),
            (Some(fire), mark(1, false, false), MarkInteraction::Refresh),
            (
                Some(fire),
                mark(2, true, true),
                MarkInteraction::BlowUp { existing: fire },
            ),
            (Some(fire), mark(2, true, false), MarkInteraction::Ignore),
        ];
        for (current, incoming, expected) in cases {
            assert_eq!(resolve_interaction(current, &incoming), expected);
        }
    }
}
