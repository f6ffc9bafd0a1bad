//! Content factory for building battle content from data files.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, BattleContent, Combatant};

use crate::loaders::{
    CatalogLoader, ConfigLoader, LoadResult, MarkLoader, ReactionLoader, RosterLoader,
};

const BUILTIN_CONFIG: &str = include_str!("../../data/config.toml");
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.ron");
const BUILTIN_MARKS: &str = include_str!("../../data/marks.ron");
const BUILTIN_REACTIONS: &str = include_str!("../../data/reactions.ron");
const BUILTIN_ROSTER: &str = include_str!("../../data/roster.ron");

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── catalog.ron
/// ├── marks.ron
/// ├── reactions.ron
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load every content file except the roster.
    pub fn load_content(&self, config: BattleConfig) -> LoadResult<BattleContent> {
        let catalog = CatalogLoader::load(&self.data_dir.join("catalog.ron"))?;
        let marks = MarkLoader::load(&self.data_dir.join("marks.ron"))?;
        let reactions = ReactionLoader::load(&self.data_dir.join("reactions.ron"))?;
        Ok(BattleContent::new(catalog, config)
            .with_marks(marks)
            .with_reactions(reactions))
    }

    /// Load combatants from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Vec<Combatant>> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Configuration embedded in the crate.
    pub fn builtin_config() -> LoadResult<BattleConfig> {
        ConfigLoader::parse(BUILTIN_CONFIG)
    }

    /// Content embedded in the crate, for demos and tests.
    pub fn builtin(config: BattleConfig) -> LoadResult<BattleContent> {
        Ok(BattleContent::new(CatalogLoader::parse(BUILTIN_CATALOG)?, config)
            .with_marks(MarkLoader::parse(BUILTIN_MARKS)?)
            .with_reactions(ReactionLoader::parse(BUILTIN_REACTIONS)?))
    }

    pub fn builtin_roster() -> LoadResult<Vec<Combatant>> {
        RosterLoader::parse(BUILTIN_ROSTER)
    }
}
