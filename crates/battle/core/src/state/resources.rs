//! Resource counters (HP, SP, CP).
//!
//! Every counter is a [`ResourceMeter`] whose current value never leaves
//! `[0, maximum]`. The mutators saturate instead of wrapping so no call site
//! can push a meter out of range.

/// Enum representing individual resource types.
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
pub enum ResourceKind {
    /// Health points.
    Hp,
    /// Skill points, spent by magic and techniques.
    Sp,
    /// Combo points, spent to unlock and charge actions.
    Cp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    /// Creates a meter, clamping `current` into range.
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    /// A meter starting at its maximum.
    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.maximum
    }

    pub fn missing(&self) -> u32 {
        self.maximum - self.current
    }

    /// Removes up to `amount`, returning what was actually removed.
    pub(crate) fn drain(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Adds up to `amount` without exceeding the maximum, returning what was added.
    pub(crate) fn fill(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.missing());
        self.current += applied;
        applied
    }
}

/// The three counters a combatant carries into battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resources {
    pub hp: ResourceMeter,
    pub sp: ResourceMeter,
    pub cp: ResourceMeter,
}

impl Resources {
    pub fn new(hp: ResourceMeter, sp: ResourceMeter, cp: ResourceMeter) -> Self {
        Self { hp, sp, cp }
    }

    pub fn get(&self, kind: ResourceKind) -> &ResourceMeter {
        match kind {
            ResourceKind::Hp => &self.hp,
            ResourceKind::Sp => &self.sp,
            ResourceKind::Cp => &self.cp,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourceMeter {
        match kind {
            ResourceKind::Hp => &mut self.hp,
            ResourceKind::Sp => &mut self.sp,
            ResourceKind::Cp => &mut self.cp,
        }
    }
}
