use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use super::command::Command;
use super::environment::Environment;
use super::overrides::ActionOverride;
use super::report::{ItemHandoff, LogReport};
use crate::config::ActionSettings;
use crate::error::ConfigError;
use crate::geometry::{Orientation, Vec3};
use crate::world::{AgentKind, Entity, EntityKind, Inventory, InventoryItem, Observation, Positioned};

/// One controlled agent: its environment handle, inventory, latest snapshot and the per-tick
/// queues the trace logger reads.
pub struct Agent {
    id: String,
    kind: AgentKind,
    env: Box<dyn Environment>,
    pub(crate) settings: ActionSettings,
    inventory: Inventory,
    snapshot: Option<Observation>,
    reports: Vec<LogReport>,
    handoffs: Vec<ItemHandoff>,
    pub(crate) action_override: Option<ActionOverride>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("inventory", &self.inventory)
            .field("action_override", &self.action_override)
            .field("pending_reports", &self.reports.len())
            .finish_non_exhaustive()
    }
}

/// Agent ids become atom subjects, so they can not contain the atom separator.
pub fn validate_agent_id(id: &str) -> Result<(), ConfigError> {
    if id.is_empty() || id.contains('-') || id.chars().any(char::is_whitespace) || id == "None" {
        return Err(ConfigError::InvalidAgentId(id.to_string()));
    }
    Ok(())
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        kind: AgentKind,
        env: impl Environment + 'static,
        settings: ActionSettings,
    ) -> Result<Self, ConfigError> {
        let id = id.into();
        validate_agent_id(&id)?;
        Ok(Self {
            inventory: Inventory::new(id.clone()),
            id,
            kind,
            env: Box::new(env),
            settings,
            snapshot: None,
            reports: Vec::new(),
            handoffs: Vec::new(),
            action_override: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Pulls the latest snapshot. Keeps the previous one when nothing new arrived.
    pub fn refresh(&mut self) -> anyhow::Result<bool> {
        if let Some(obs) = self.env.observe()? {
            self.snapshot = Some(obs);
        }
        if self.snapshot.is_none() {
            warn!(agent = %self.id, "no snapshot received yet");
        }
        Ok(self.snapshot.is_some())
    }

    pub fn snapshot(&self) -> Option<&Observation> {
        self.snapshot.as_ref()
    }

    pub fn eye_position(&self) -> Option<Vec3> {
        let obs = self.snapshot.as_ref()?;
        let feet = obs.feet();
        Some(Vec3::new(feet.x, feet.y + self.settings.eye_height, feet.z))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.snapshot.as_ref().map(Observation::orientation)
    }

    /// Alive until a snapshot says otherwise.
    pub fn is_alive(&self) -> bool {
        self.snapshot.as_ref().is_none_or(|obs| obs.is_alive)
    }

    pub fn mobs_killed(&self) -> u32 {
        self.snapshot.as_ref().map_or(0, |obs| obs.mobs_killed)
    }

    pub fn nearby_entities(&self) -> Vec<Entity> {
        self.snapshot
            .as_ref()
            .map(Observation::entities)
            .unwrap_or_default()
    }

    /// Reconciles the inventory with the snapshot's listing, if it carries one.
    pub fn sync_inventory(&mut self) -> Vec<InventoryItem> {
        match self.snapshot.as_ref().and_then(|obs| obs.inventory.as_deref()) {
            Some(listing) => self.inventory.sync(listing),
            None => Vec::new(),
        }
    }

    pub fn send(&mut self, command: &Command) -> anyhow::Result<()> {
        debug!(agent = %self.id, %command, "send");
        self.env.send(command)
    }

    pub(crate) fn stop_turning(&mut self) -> anyhow::Result<()> {
        self.send(&Command::Pitch(0.0))?;
        self.send(&Command::Turn(0.0))
    }

    /// Stops walking, turning and attacking. Not subject to overrides.
    pub(crate) fn halt(&mut self) -> anyhow::Result<()> {
        for command in Command::stop_all() {
            self.send(&command)?;
        }
        Ok(())
    }

    pub(crate) fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.env.wait(duration);
        }
    }

    pub fn tick(&mut self) {
        self.env.tick();
    }

    pub fn is_mission_active(&mut self) -> anyhow::Result<bool> {
        self.env.is_mission_active()
    }

    pub fn set_override(&mut self, action: ActionOverride) {
        debug!(agent = %self.id, kind = ?action.kind(), "action override installed");
        self.action_override = Some(action);
    }

    pub fn clear_override(&mut self) -> Option<ActionOverride> {
        self.action_override.take()
    }

    pub fn action_override(&self) -> Option<&ActionOverride> {
        self.action_override.as_ref()
    }

    pub(crate) fn enqueue(&mut self, report: LogReport) {
        self.reports.push(report);
    }

    pub fn pending_reports(&self) -> &[LogReport] {
        &self.reports
    }

    /// Hands the queued reports to the caller and clears the queue.
    pub fn drain_reports(&mut self) -> Vec<LogReport> {
        std::mem::take(&mut self.reports)
    }

    pub(crate) fn queue_handoff(&mut self, handoff: ItemHandoff) {
        self.handoffs.push(handoff);
    }

    pub fn take_handoffs(&mut self) -> Vec<ItemHandoff> {
        std::mem::take(&mut self.handoffs)
    }
}

impl Positioned for Agent {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn as_entity(&self) -> Option<Entity> {
        Some(Entity {
            id: self.id.clone(),
            kind: EntityKind::Agent(self.kind),
            position: self.eye_position()?,
            quantity: None,
        })
    }
}
