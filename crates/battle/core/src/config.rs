use crate::economy::{ChargeProfile, ComboScalingProfile};
use crate::mark::MarkSettings;

/// Tunable rules for one battle.
///
/// Passed explicitly into the engine and runtime at construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Root of every judgment seed.
    pub seed: u64,
    /// Safety limit on total turns for automated battles. 0 = unlimited.
    pub max_turns: u32,
    pub charge: ChargeProfile,
    pub scaling: ComboScalingProfile,
    pub marks: MarkSettings,
}

impl BattleConfig {
    pub const DEFAULT_SEED: u64 = 0x5eed_ba77_1e00_0001;
    pub const DEFAULT_MAX_TURNS: u32 = 200;

    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            max_turns: Self::DEFAULT_MAX_TURNS,
            charge: ChargeProfile::default(),
            scaling: ComboScalingProfile::default(),
            marks: MarkSettings::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_charge(mut self, charge: ChargeProfile) -> Self {
        self.charge = charge;
        self
    }

    /// Whether `turns_taken` has hit the configured limit.
    pub fn turn_limit_reached(&self, turns_taken: u32) -> bool {
        self.max_turns != 0 && turns_taken >= self.max_turns
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
