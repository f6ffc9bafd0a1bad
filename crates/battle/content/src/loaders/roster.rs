//! Combatant roster loader.

use std::path::Path;

use battle_core::{Combatant, CombatantId, ResourceMeter, Resources, Side, StatBlock};

use crate::loaders::{LoadResult, read_file};

/// One combatant as written in a roster file.
///
/// Stats are already resolved; growth and archetypes are not modeled here.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    pub side: Side,
    pub stats: StatBlock,
    pub hp: u32,
    #[serde(default)]
    pub sp: u32,
    /// CP at battle start.
    #[serde(default)]
    pub cp: u32,
    /// CP ceiling; defaults to the starting CP.
    #[serde(default)]
    pub cp_max: Option<u32>,
}

impl CombatantSpec {
    pub fn into_combatant(self) -> Combatant {
        let cp_max = self.cp_max.unwrap_or(self.cp).max(self.cp);
        Combatant::new(
            CombatantId(self.id),
            self.name,
            self.side,
            self.stats,
            Resources::new(
                ResourceMeter::full(self.hp),
                ResourceMeter::full(self.sp),
                ResourceMeter::new(self.cp, cp_max),
            ),
        )
    }
}

/// Loader for combatant rosters from RON files.
///
/// RON format: `Vec<CombatantSpec>`
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Combatant>> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<Combatant>> {
        let specs: Vec<CombatantSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        Ok(specs.into_iter().map(CombatantSpec::into_combatant).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp_max_defaults_to_starting_cp() {
        let roster = RosterLoader::parse(
            r#"[
                (
                    id: 1,
                    name: "Hero",
                    side: Ally,
                    stats: (physical_power: 8, magic_power: 3, defense: 4, resistance: 2, speed: 7),
                    hp: 50,
                    sp: 12,
                    cp: 6,
                ),
                (
                    id: 2,
                    name: "Slime",
                    side: Enemy,
                    stats: (physical_power: 3, magic_power: 1, defense: 1, resistance: 1, speed: 2),
                    hp: 20,
                ),
            ]"#,
        )
        .unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].resources.cp, ResourceMeter::new(6, 6));
        assert_eq!(roster[1].resources.sp.maximum, 0);
        assert!(roster[1].is_alive());
    }
}
