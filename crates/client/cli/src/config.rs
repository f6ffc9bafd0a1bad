//! CLI configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one headless battle.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    /// Directory holding `config.toml`, `catalog.ron`, `marks.ron`,
    /// `reactions.ron` and `roster.ron`. Built-in content when unset.
    pub data_dir: Option<PathBuf>,
    /// Battle config TOML; replaces the content directory's `config.toml`.
    pub config_path: Option<PathBuf>,
    /// Overrides the seed from the battle config.
    pub seed: Option<u64>,
    /// Overrides the turn limit from the battle config.
    pub max_turns: Option<u32>,
    /// Extra CP the AI commits per action.
    pub ai_charge: u32,
    /// Acknowledge stages from the narrator after a delay instead of
    /// letting the runtime resolve them immediately.
    pub stage_delay: Option<Duration>,
    /// Print every event as a JSON line on stdout.
    pub json_events: bool,
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONFIG` - Battle config TOML (default: the content's own)
    /// - `BATTLE_DATA_DIR` - Content directory (default: built-in content)
    /// - `BATTLE_SEED` - Battle seed override
    /// - `BATTLE_MAX_TURNS` - Turn limit override
    /// - `BATTLE_AI_CHARGE` - CP the AI commits above base cost (default: 0)
    /// - `BATTLE_STAGE_DELAY_MS` - Simulated animation length per stage
    /// - `BATTLE_JSON_EVENTS` - Emit events as JSON lines (default: false)
    pub fn from_env() -> Self {
        let mut config = Self {
            data_dir: env::var("BATTLE_DATA_DIR").ok().map(PathBuf::from),
            config_path: env::var("BATTLE_CONFIG").ok().map(PathBuf::from),
            seed: read_env("BATTLE_SEED"),
            max_turns: read_env("BATTLE_MAX_TURNS"),
            ..Self::default()
        };

        if let Some(charge) = read_env::<u32>("BATTLE_AI_CHARGE") {
            config.ai_charge = charge;
        }
        config.stage_delay = read_env::<u64>("BATTLE_STAGE_DELAY_MS").map(Duration::from_millis);

        if let Some(enable) = read_env::<bool>("BATTLE_JSON_EVENTS") {
            config.json_events = enable;
        } else if env::var("BATTLE_JSON_EVENTS").is_ok() {
            config.json_events = true;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
