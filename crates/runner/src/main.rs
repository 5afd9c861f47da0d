mod behaviour;
mod mission;
mod remote;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tracebot_core::agent::AgentRegistry;
use tracebot_core::config::ConfigLoader;
use tracebot_core::trace::TraceLogger;

use crate::mission::MissionConfig;

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Drives one mission to completion and exports its trace. Returns the trace path.
fn run(mission: &MissionConfig, replay_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let mut registry = AgentRegistry::new();
    let mut logger = TraceLogger::new();

    for cfg in &mission.agents {
        let env = cfg.environment(replay_dir)?;
        let agent = registry.spawn(&cfg.id, cfg.kind, env, mission.actions)?;
        for start in &cfg.inventory {
            agent
                .inventory_mut()
                .seed(start.slot, start.item, start.quantity)?;
        }
        logger.track(&cfg.id, cfg.tracking_flags()?);
    }

    let pace = (!mission.is_offline(replay_dir)).then(|| Duration::from_millis(mission.tick_ms));
    logger.start(&mut registry)?;

    let mut ticks = 0u64;
    while registry.is_mission_active()? {
        registry.tick_all();
        for cfg in &mission.agents {
            behaviour::step(&mut registry, &cfg.id, &cfg.behaviour)?;
        }
        logger.update(&mut registry)?;
        ticks += 1;
        if let Some(pace) = pace {
            std::thread::sleep(pace);
        }
    }

    logger.finish(&mut registry)?;
    let path = logger.export(&mission.trace_dir)?;
    info!(ticks, lines = logger.lines().len(), path = %path.display(), "mission finished");
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = env_nonempty("TRACEBOT_CONFIG").unwrap_or_else(|| "mission.toml".to_string());
    let replay_dir = env_nonempty("TRACEBOT_REPLAY").map(PathBuf::from);

    let mission: MissionConfig = ConfigLoader::parse_from_file(&config_path)?;
    mission.validate()?;
    info!(
        config = %config_path,
        agents = mission.agents.len(),
        replay = replay_dir.is_some(),
        "mission loaded"
    );

    run(&mission, replay_dir.as_deref())?;
    Ok(())
}
