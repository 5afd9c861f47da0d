use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::agent::movement::MoveBand;

pub const CONFIG_DIR_ENV: &str = "TRACEBOT_CONFIG_DIR";

/// TOML config loader.
///
/// Search order:
/// 1) `TRACEBOT_CONFIG_DIR/<relative_path>`
/// 2) `./<relative_path>`
/// 3) `<repo_root>/config/<relative_path>`
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn parse_from_file<T: DeserializeOwned>(relative_path: &str) -> anyhow::Result<T> {
        let path = Self::resolve_path(relative_path)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::parse_from_string(&text)
            .with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub fn parse_from_string<T: DeserializeOwned>(text: &str) -> anyhow::Result<T> {
        toml::from_str(text).context("Failed to parse TOML")
    }

    pub fn resolve_path(relative_path: &str) -> anyhow::Result<PathBuf> {
        let rel = Path::new(relative_path);
        if rel.is_absolute() && rel.is_file() {
            return Ok(rel.to_path_buf());
        }

        if let Some(root) = env::var_os(CONFIG_DIR_ENV) {
            let candidate = PathBuf::from(root).join(rel);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        if let Ok(cwd) = env::current_dir() {
            let candidate = cwd.join(rel);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        // This crate lives at <repo_root>/crates/bot-core.
        let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .nth(2)
            .ok_or_else(|| anyhow::anyhow!("CARGO_MANIFEST_DIR has insufficient ancestors"))?
            .join("config")
            .join(rel);
        if candidate.is_file() {
            return Ok(candidate);
        }

        anyhow::bail!("Config file not found for {:?}", rel);
    }
}

/// Distance thresholds used by action preconditions and movement.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Tolerances {
    /// Maximum horizontal distance for melee.
    pub striking_distance: f64,
    pub giving: MoveBand,
    pub follow: MoveBand,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            striking_distance: 3.0,
            giving: MoveBand::new(2.0, 4.0),
            follow: MoveBand::new(2.0, 6.0),
        }
    }
}

impl Tolerances {
    pub fn striking(&self) -> MoveBand {
        MoveBand::new(0.0, self.striking_distance)
    }
}

/// Blocking pauses, in milliseconds, that let the simulator register an action.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActionTimings {
    pub attack_ms: u64,
    pub pickup_ms: u64,
    pub craft_ms: u64,
    pub give_ms: u64,
}

impl Default for ActionTimings {
    fn default() -> Self {
        Self {
            attack_ms: 500,
            pickup_ms: 500,
            craft_ms: 500,
            give_ms: 2_800,
        }
    }
}

impl ActionTimings {
    pub fn attack(&self) -> Duration {
        Duration::from_millis(self.attack_ms)
    }

    pub fn pickup(&self) -> Duration {
        Duration::from_millis(self.pickup_ms)
    }

    pub fn craft(&self) -> Duration {
        Duration::from_millis(self.craft_ms)
    }

    pub fn give(&self) -> Duration {
        Duration::from_millis(self.give_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ActionSettings {
    /// Height of the eyes above the reported feet position.
    pub eye_height: f64,
    pub tolerances: Tolerances,
    pub timings: ActionTimings,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            eye_height: 1.0,
            tolerances: Tolerances::default(),
            timings: ActionTimings::default(),
        }
    }
}
