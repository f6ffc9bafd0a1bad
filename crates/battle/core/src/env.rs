//! Read-only battle content.
//!
//! [`BattleEnv`] bundles everything the engine reads but never mutates, so the
//! engine stays decoupled from where the content came from.

use crate::action::ActionCatalog;
use crate::config::BattleConfig;
use crate::mark::{MarkEngine, MarkRegistry, ReactionTable};
use crate::rng::{PcgRng, RngOracle};

/// Borrowed view of the static content of a battle.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub catalog: &'a ActionCatalog,
    pub marks: &'a MarkRegistry,
    pub reactions: &'a ReactionTable,
    pub config: &'a BattleConfig,
    pub rng: &'a dyn RngOracle,
}

impl<'a> BattleEnv<'a> {
    pub fn mark_engine(&self) -> MarkEngine<'a> {
        MarkEngine::new(self.marks, self.reactions, &self.config.marks, self.rng)
    }
}

/// Owned battle content, shared by reference across a session.
#[derive(Clone, Debug, Default)]
pub struct BattleContent {
    pub catalog: ActionCatalog,
    pub marks: MarkRegistry,
    pub reactions: ReactionTable,
    pub config: BattleConfig,
}

impl BattleContent {
    pub fn new(catalog: ActionCatalog, config: BattleConfig) -> Self {
        Self {
            catalog,
            marks: MarkRegistry::default(),
            reactions: ReactionTable::default(),
            config,
        }
    }

    pub fn with_marks(mut self, marks: MarkRegistry) -> Self {
        self.marks = marks;
        self
    }

    pub fn with_reactions(mut self, reactions: ReactionTable) -> Self {
        self.reactions = reactions;
        self
    }

    /// Borrows the content with the default PCG oracle.
    pub fn env(&self) -> BattleEnv<'_> {
        self.env_with(&PcgRng)
    }

    pub fn env_with<'a>(&'a self, rng: &'a dyn RngOracle) -> BattleEnv<'a> {
        BattleEnv {
            catalog: &self.catalog,
            marks: &self.marks,
            reactions: &self.reactions,
            config: &self.config,
            rng,
        }
    }
}
