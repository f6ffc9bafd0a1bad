//! Battle state: combatants, resource counters, and turn bookkeeping.
//!
//! State is plain data. Mutation rules live with the components that own them:
//! resources change through [`ResourceLedger`], mark slots through
//! [`crate::mark::MarkEngine`], and phase/turn fields through
//! [`crate::engine::BattleEngine`].
mod battle;
mod combatant;
mod ledger;
mod resources;

pub use battle::{BattleState, InitializationError, TurnState};
pub use combatant::{Combatant, CombatantId, PowerStat, Side, StatBlock};
pub use ledger::{DamageOutcome, LedgerError, ResourceLedger};
pub use resources::{ResourceKind, ResourceMeter, Resources};
