//! Data-driven battle content and loaders.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Battle configuration (TOML)
//! - Action catalogs: effects, timed-hit profiles, action definitions (RON)
//! - Mark definitions and reaction tables (RON)
//! - Combatant rosters (RON)
//!
//! Content is consumed by the engine through `BattleContent` and never appears
//! in battle state. A built-in content set is embedded for demos and tests.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, CatalogSpec, CombatantSpec, ConfigLoader, ContentFactory, EffectSpec,
    LoadResult, MarkLoader, ReactionLoader, RosterLoader,
};
