//! Mark definition and reaction table loaders.

use std::path::Path;

use battle_core::mark::ReactionEntry;
use battle_core::{MarkDefinition, MarkRegistry, ReactionTable};

use crate::loaders::{LoadResult, read_file};

/// Loader for mark definitions from RON files.
///
/// RON format: `Vec<MarkDefinition>`
pub struct MarkLoader;

impl MarkLoader {
    pub fn load(path: &Path) -> LoadResult<MarkRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<MarkRegistry> {
        let definitions: Vec<MarkDefinition> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse marks RON: {}", e))?;
        Ok(MarkRegistry::new(definitions))
    }
}

/// Loader for reaction tables from RON files.
///
/// RON format: `Vec<ReactionEntry>`. Entries sharing a key are rejected so a
/// table never silently shadows a reaction.
pub struct ReactionLoader;

impl ReactionLoader {
    pub fn load(path: &Path) -> LoadResult<ReactionTable> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<ReactionTable> {
        let entries: Vec<ReactionEntry> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse reactions RON: {}", e))?;

        for (index, entry) in entries.iter().enumerate() {
            if entries[..index].iter().any(|other| other.key == entry.key) {
                anyhow::bail!(
                    "Duplicate reaction for {:?} + {:?} (subtype {:?})",
                    entry.key.existing,
                    entry.key.incoming,
                    entry.key.subtype
                );
            }
        }
        Ok(ReactionTable::new(entries))
    }
}
