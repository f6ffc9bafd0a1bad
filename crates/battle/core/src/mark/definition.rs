//! Mark definitions and the rules actions carry for applying them.

use std::collections::HashMap;

use crate::economy::TimedGrade;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkId(pub u32);

impl core::fmt::Display for MarkId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mark:{}", self.0)
    }
}

/// Optional discriminator refining a reaction lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionSubtype(pub u32);

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkDefinition {
    pub id: MarkId,
    pub name: String,
    pub element: ElementId,
    pub can_be_applied_as_mark: bool,
    pub can_detonate_marks: bool,
    pub base_duration_turns: u32,
}

impl MarkDefinition {
    /// A mark that can both sit in a slot and detonate other elements.
    pub fn elemental(id: MarkId, name: impl Into<String>, element: ElementId, turns: u32) -> Self {
        Self {
            id,
            name: name.into(),
            element,
            can_be_applied_as_mark: true,
            can_detonate_marks: true,
            base_duration_turns: turns,
        }
    }

    /// Duration used when the mark lands; a zero duration still lasts one turn.
    pub fn duration(&self) -> u32 {
        self.base_duration_turns.max(1)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkRuleKind {
    /// Place the mark, refreshing a same-element slot or blowing up a different one.
    Apply,
    /// Detonate a different-element mark without placing a new one.
    /// A same-element mark is refreshed instead.
    Detonate,
}

/// Qualification gates checked before a rule fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleGates {
    /// Single-target only: the action must carry charge.
    pub requires_cp: bool,
    /// Single-target only: the timed-hit grade must reach `min_grade`.
    pub requires_timed_success: bool,
    pub min_grade: TimedGrade,
    /// Minimum charge, checked for every shape.
    pub cp_min: u32,
    /// Exact charge, checked for every shape.
    pub cp_exact: Option<u32>,
}

impl Default for RuleGates {
    fn default() -> Self {
        Self {
            requires_cp: true,
            requires_timed_success: true,
            min_grade: TimedGrade::Success,
            cp_min: 0,
            cp_exact: None,
        }
    }
}

impl RuleGates {
    /// Gates that let every single-target commit through.
    pub fn open() -> Self {
        Self {
            requires_cp: false,
            requires_timed_success: false,
            min_grade: TimedGrade::None,
            cp_min: 0,
            cp_exact: None,
        }
    }

    /// Charge gates shared by every shape.
    pub fn charge_allows(&self, cp_spent: u32) -> bool {
        if let Some(exact) = self.cp_exact
            && cp_spent != exact
        {
            return false;
        }
        cp_spent >= self.cp_min
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkRule {
    pub kind: MarkRuleKind,
    pub mark: MarkId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gates: RuleGates,
    /// Base chance for area actions; `None` uses the battle-wide setting.
    pub chance: Option<f32>,
    /// Detonate rules only: whether the detonated mark leaves the slot.
    pub consume_on_detonate: bool,
    pub subtype: Option<ReactionSubtype>,
}

impl MarkRule {
    pub fn apply(mark: MarkId) -> Self {
        Self {
            kind: MarkRuleKind::Apply,
            mark,
            gates: RuleGates::default(),
            chance: None,
            consume_on_detonate: true,
            subtype: None,
        }
    }

    pub fn detonate(mark: MarkId) -> Self {
        Self {
            kind: MarkRuleKind::Detonate,
            ..Self::apply(mark)
        }
    }

    pub fn with_gates(mut self, gates: RuleGates) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = Some(chance);
        self
    }

    pub fn with_subtype(mut self, subtype: ReactionSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn keep_on_detonate(mut self) -> Self {
        self.consume_on_detonate = false;
        self
    }
}

/// All mark definitions available in a battle.
#[derive(Clone, Debug, Default)]
pub struct MarkRegistry {
    marks: HashMap<MarkId, MarkDefinition>,
}

impl MarkRegistry {
    pub fn new(definitions: impl IntoIterator<Item = MarkDefinition>) -> Self {
        Self {
            marks: definitions.into_iter().map(|def| (def.id, def)).collect(),
        }
    }

    pub fn get(&self, id: MarkId) -> Option<&MarkDefinition> {
        self.marks.get(&id)
    }

    pub fn insert(&mut self, definition: MarkDefinition) {
        self.marks.insert(definition.id, definition);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
