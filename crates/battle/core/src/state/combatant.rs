//! Combatant identity, stat block, and per-battle bookkeeping.

use crate::mark::MarkSlot;

use super::resources::Resources;

/// Unique identifier for a combatant bound to a battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Value mixed into per-target seeds.
    #[inline]
    pub const fn seed_bits(self) -> u64 {
        self.0 as u64
    }
}

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which team a combatant fights for.
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
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub const fn opposing(self) -> Self {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

/// Which offensive stat an effect scales from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerStat {
    Physical,
    Magic,
}

/// Resolved attributes supplied by the stat-resolution collaborator.
///
/// The battle core only reads these values; growth and archetypes live elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    pub physical_power: u32,
    pub magic_power: u32,
    pub defense: u32,
    pub resistance: u32,
    pub speed: u32,
}

impl StatBlock {
    /// Offensive value for the given stat.
    pub const fn power(&self, stat: PowerStat) -> u32 {
        match stat {
            PowerStat::Physical => self.physical_power,
            PowerStat::Magic => self.magic_power,
        }
    }

    /// Defensive value that mitigates the given stat.
    pub const fn mitigation(&self, stat: PowerStat) -> u32 {
        match stat {
            PowerStat::Physical => self.defense,
            PowerStat::Magic => self.resistance,
        }
    }
}

/// A participant in a battle.
///
/// Resources are mutated only through [`crate::state::ResourceLedger`] and the
/// mark slot only through [`crate::mark::MarkEngine`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub stats: StatBlock,
    pub resources: Resources,
    pub alive: bool,
    pub mark: MarkSlot,
    /// Number of turns this combatant has started in the current battle.
    pub turn_counter: u32,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        side: Side,
        stats: StatBlock,
        resources: Resources,
    ) -> Self {
        let alive = resources.hp.current > 0;
        Self {
            id,
            name: name.into(),
            side,
            stats,
            resources,
            alive,
            mark: MarkSlot::empty(),
            turn_counter: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}
