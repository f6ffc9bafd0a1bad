//! Headless battle client entry point.
//!
//! Loads content, pits the AI against itself, and narrates the battle.
mod config;
mod narrator;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, ContentFactory};
use battle_runtime::{AiProvider, Runtime};
use config::CliConfig;
use narrator::Narrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();
    let config = CliConfig::from_env();

    let factory = config.data_dir.as_ref().map(ContentFactory::new);
    let battle = match (&config.config_path, &factory) {
        (Some(path), _) => ConfigLoader::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, Some(factory)) => factory.load_config()?,
        (None, None) => ContentFactory::builtin_config()?,
    };
    let (mut content, roster) = match &factory {
        Some(factory) => (factory.load_content(battle)?, factory.load_roster()?),
        None => (
            ContentFactory::builtin(battle)?,
            ContentFactory::builtin_roster()?,
        ),
    };
    if let Some(seed) = config.seed {
        content.config.seed = seed;
    }
    if let Some(max_turns) = config.max_turns {
        content.config.max_turns = max_turns;
    }

    let ai = AiProvider::new().with_charge(config.ai_charge);
    let runtime = Runtime::builder()
        .content(content)
        .combatants(roster)
        .provider(ai)
        .auto_acknowledge(config.stage_delay.is_none())
        .build()
        .context("failed to start battle runtime")?;

    let handle = runtime.handle();
    let state = handle.query_state().await?;
    let listeners = Narrator::new(handle, &state, config.stage_delay, config.json_events).spawn();

    let outcome = runtime.run().await?;
    tracing::info!(%outcome, "done");

    runtime.shutdown().await?;
    for listener in listeners {
        listener.abort();
    }
    Ok(())
}

fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
