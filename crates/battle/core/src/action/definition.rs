//! Static action definitions supplied by the catalog.

use crate::economy::TimedHitProfileId;
use crate::mark::MarkRule;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u32);

impl core::fmt::Display for ActionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// Reference to an effect implementation bound in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

/// Who an action may target, relative to the actor.
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
pub enum TargetAudience {
    Enemies,
    Allies,
    /// The actor only.
    #[strum(serialize = "self")]
    SelfOnly,
}

/// How many audience members an action hits.
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
pub enum TargetShape {
    Single,
    All,
}

/// Base resource cost paid on commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCost {
    pub sp: u32,
    pub cp: u32,
}

impl ActionCost {
    pub const FREE: Self = Self { sp: 0, cp: 0 };

    pub const fn new(sp: u32, cp: u32) -> Self {
        Self { sp, cp }
    }

    /// Ordering key used to find the cheapest fallback.
    pub const fn total(&self) -> u32 {
        self.sp.saturating_add(self.cp)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: String,
    pub cost: ActionCost,
    pub audience: TargetAudience,
    pub shape: TargetShape,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timed_hit: Option<TimedHitProfileId>,
    /// Evaluated in order against every target after the effect resolves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mark_rules: Vec<MarkRule>,
    pub effect: EffectId,
}

impl ActionDefinition {
    pub fn new(
        id: ActionId,
        name: impl Into<String>,
        cost: ActionCost,
        audience: TargetAudience,
        shape: TargetShape,
        effect: EffectId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            audience,
            shape,
            timed_hit: None,
            mark_rules: Vec::new(),
            effect,
        }
    }

    pub fn with_timed_hit(mut self, profile: TimedHitProfileId) -> Self {
        self.timed_hit = Some(profile);
        self
    }

    pub fn with_mark_rule(mut self, rule: MarkRule) -> Self {
        self.mark_rules.push(rule);
        self
    }
}
