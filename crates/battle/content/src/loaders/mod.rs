//! Content loaders for reading battle data from files.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod marks;
pub mod roster;

pub use catalog::{CatalogLoader, CatalogSpec, EffectSpec};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use marks::{MarkLoader, ReactionLoader};
pub use roster::{CombatantSpec, RosterLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
