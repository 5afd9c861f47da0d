use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use tracebot_core::ConfigError;
use tracebot_core::agent::{Environment, ScriptedEnvironment};
use tracebot_core::config::ActionSettings;
use tracebot_core::trace::TrackingFlags;
use tracebot_core::world::{AgentKind, INVENTORY_SLOTS, ItemType, MAX_STACK};

use crate::behaviour::Behaviour;
use crate::remote::RemoteEnvironment;

fn default_trace_dir() -> PathBuf {
    PathBuf::from("traces")
}

fn default_tick_ms() -> u64 {
    50
}

fn default_quantity() -> usize {
    1
}

/// Mission file (TOML).
#[derive(Debug, Clone, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "default_trace_dir")]
    pub trace_dir: PathBuf,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub actions: ActionSettings,
    pub agents: Vec<AgentConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    #[serde(default)]
    pub kind: AgentKind,
    /// Control socket of the agent's simulator client.
    #[serde(default)]
    pub address: Option<String>,
    /// Recorded observations (JSON lines) to replay instead of connecting.
    #[serde(default)]
    pub replay: Option<PathBuf>,
    #[serde(default)]
    pub tracking: Vec<String>,
    #[serde(default)]
    pub inventory: Vec<StartingItem>,
    #[serde(default)]
    pub behaviour: Behaviour,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartingItem {
    pub item: ItemType,
    pub slot: usize,
    #[serde(default = "default_quantity")]
    pub quantity: usize,
}

impl StartingItem {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot >= INVENTORY_SLOTS {
            return Err(ConfigError::SlotOutOfRange {
                slot: self.slot,
                capacity: INVENTORY_SLOTS,
            });
        }
        if !(1..=MAX_STACK).contains(&self.quantity) {
            return Err(ConfigError::QuantityOutOfRange {
                quantity: self.quantity,
                max: MAX_STACK,
            });
        }
        Ok(())
    }
}

impl AgentConfig {
    pub fn tracking_flags(&self) -> Result<TrackingFlags, ConfigError> {
        TrackingFlags::from_names(&self.tracking)
    }

    /// Replay file under `replay_dir` when given, else the configured replay, else the socket.
    pub fn environment(&self, replay_dir: Option<&Path>) -> anyhow::Result<Box<dyn Environment>> {
        let replay = replay_dir
            .map(|dir| dir.join(format!("{}.jsonl", self.id)))
            .or_else(|| self.replay.clone());
        if let Some(path) = replay {
            let file = File::open(&path)
                .with_context(|| format!("open replay {} for {}", path.display(), self.id))?;
            let env = ScriptedEnvironment::from_json_lines(BufReader::new(file))
                .with_context(|| format!("load replay {}", path.display()))?;
            return Ok(Box::new(env));
        }
        let Some(addr) = self.address.as_deref() else {
            anyhow::bail!("agent {} needs either an address or a replay file", self.id);
        };
        Ok(Box::new(RemoteEnvironment::connect(addr)?))
    }
}

impl MissionConfig {
    /// Checks everything that can be checked before connecting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = Vec::new();
        for agent in &self.agents {
            tracebot_core::agent::validate_agent_id(&agent.id)?;
            if seen.contains(&agent.id.as_str()) {
                return Err(ConfigError::DuplicateAgent(agent.id.clone()));
            }
            seen.push(agent.id.as_str());
            agent.tracking_flags()?;
            for start in &agent.inventory {
                start.validate()?;
            }
        }
        for agent in &self.agents {
            if let Some(other) = agent.behaviour.partner()
                && !seen.contains(&other)
            {
                return Err(ConfigError::UnknownAgent(other.to_string()));
            }
        }
        Ok(())
    }

    /// True when every agent replays recorded frames, so ticks need no pacing.
    pub fn is_offline(&self, replay_dir: Option<&Path>) -> bool {
        replay_dir.is_some() || self.agents.iter().all(|a| a.replay.is_some())
    }
}
