//! Deterministic combat rules for turn-based battles.
//!
//! `battle-core` defines the canonical battle model (combatants, resources,
//! actions, marks) and the synchronous rules over it. All phase and turn
//! changes flow through [`engine::BattleEngine`]; resource counters change only
//! through [`state::ResourceLedger`]. Nothing here performs I/O or suspends,
//! so the async runtime and offline tools share the same rules.
pub mod action;
pub mod config;
pub mod economy;
pub mod engine;
pub mod env;
pub mod error;
pub mod judgment;
pub mod mark;
pub mod rng;
pub mod state;

pub use action::{
    ActionCatalog, ActionCost, ActionDefinition, ActionEffect, ActionId, CatalogBuilder,
    CatalogError, EffectCapabilities, EffectId, LegalAction, Selection, TargetAudience,
    TargetResolver, TargetShape, TargetingError,
};
pub use config::BattleConfig;
pub use economy::{
    ChargeError, ChargeProfile, ComboScalingProfile, HitSequence, SoftCap, TimedGrade,
    TimedHitProfile, TimedHitProfileId, TimedHitResult, TimedHitTier,
};
pub use engine::{
    BattleEngine, BattleOutcome, BattlePhase, CommitError, Committed, HitOutcome, MarkPass,
    PhaseError, Progress, ReactionOutcome, TurnStart,
};
pub use env::{BattleContent, BattleEnv};
pub use error::{BattleError, ErrorSeverity};
pub use judgment::{ActionJudgment, JudgmentRecorder, TargetJudgment};
pub use mark::{
    ElementId, MarkChangeReason, MarkDefinition, MarkEngine, MarkError, MarkEvent, MarkId,
    MarkRegistry, MarkRule, MarkSettings, ReactionDefinition, ReactionId, ReactionTable,
};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use state::{
    BattleState, Combatant, CombatantId, DamageOutcome, InitializationError, LedgerError,
    PowerStat, ResourceKind, ResourceLedger, ResourceMeter, Resources, Side, StatBlock,
};
