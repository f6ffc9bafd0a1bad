//! Action catalog loader.
//!
//! Loads effects, timed-hit profiles and action definitions from one RON file
//! and builds an [`ActionCatalog`], so capability checks run at load time.

use std::path::Path;

use battle_core::{ActionCatalog, ActionDefinition, ActionEffect, EffectId, TimedHitProfile};

use crate::loaders::{LoadResult, read_file};

/// An effect implementation bound to an id.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct EffectSpec {
    pub id: EffectId,
    pub effect: ActionEffect,
}

/// On-disk catalog layout.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
    #[serde(default)]
    pub timed_hits: Vec<TimedHitProfile>,
    pub actions: Vec<ActionDefinition>,
}

impl CatalogSpec {
    pub fn build(self) -> LoadResult<ActionCatalog> {
        let mut builder = ActionCatalog::builder();
        for spec in self.effects {
            builder = builder.effect(spec.id, spec.effect);
        }
        for profile in self.timed_hits {
            builder = builder.timed_hit(profile);
        }
        for action in self.actions {
            builder = builder.action(action);
        }
        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid action catalog: {}", e))
    }
}

/// Loader for action catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ActionCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<ActionCatalog> {
        let spec: CatalogSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse action catalog RON: {}", e))?;
        let actions = spec.actions.len();
        let catalog = spec.build()?;
        tracing::debug!(target: "content::catalog", actions, "action catalog loaded");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::ActionId;

    #[test]
    fn parses_effects_and_actions() {
        let catalog = CatalogLoader::parse(
            r#"(
                effects: [
                    (id: EffectId(1), effect: Guard),
                    (id: EffectId(2), effect: Strike(power: 8, stat: Physical)),
                ],
                actions: [
                    (
                        id: ActionId(1),
                        name: "guard",
                        cost: (sp: 0, cp: 0),
                        audience: SelfOnly,
                        shape: Single,
                        effect: EffectId(1),
                    ),
                    (
                        id: ActionId(2),
                        name: "cleave",
                        cost: (sp: 2, cp: 0),
                        audience: Enemies,
                        shape: All,
                        effect: EffectId(2),
                    ),
                ],
            )"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        let cleave = catalog.get(ActionId(2)).unwrap();
        assert!(catalog.effect_for(cleave).unwrap().is_offensive());
        assert!(cleave.mark_rules.is_empty());
    }

    #[test]
    fn capability_mismatch_fails_the_load() {
        let err = CatalogLoader::parse(
            r#"(
                effects: [(id: EffectId(1), effect: Guard)],
                actions: [
                    (
                        id: ActionId(1),
                        name: "mass guard",
                        cost: (sp: 0, cp: 0),
                        audience: Allies,
                        shape: All,
                        effect: EffectId(1),
                    ),
                ],
            )"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid action catalog"));
    }
}
