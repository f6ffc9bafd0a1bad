//! Worker tasks that back the runtime orchestration.
//!
//! The battle worker owns the orchestrator and executes commands one at a
//! time, which is what keeps a single action in flight.

mod battle;

pub use battle::{BattleWorker, Command};
