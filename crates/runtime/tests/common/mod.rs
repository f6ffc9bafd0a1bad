#![allow(dead_code)]

use battle_content::ContentFactory;
use battle_core::{ActionId, BattleContent, Combatant, CombatantId};

pub const GUARD: ActionId = ActionId(1);
pub const SLASH: ActionId = ActionId(2);
pub const FLURRY: ActionId = ActionId(5);
pub const FOCUS: ActionId = ActionId(7);

pub const KNIGHT: CombatantId = CombatantId(1);
pub const SEER: CombatantId = CombatantId(2);
pub const WOLF: CombatantId = CombatantId(3);

/// Built-in content and roster. Turn order is Wolf, Seer, Knight, Golem.
pub fn builtin() -> (BattleContent, Vec<Combatant>) {
    let config = ContentFactory::builtin_config().expect("builtin config");
    let content = ContentFactory::builtin(config).expect("builtin content");
    let roster = ContentFactory::builtin_roster().expect("builtin roster");
    (content, roster)
}

