use serde::Deserialize;
use tracing::debug;

use tracebot_core::ConfigError;
use tracebot_core::agent::{Agent, AgentRegistry};
use tracebot_core::world::{ItemType, MobFilter};

/// What a hardcoded agent does every tick.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behaviour {
    /// Does nothing; the agent is only observed.
    #[default]
    Idle,
    /// Fights whatever hostile mob is closest to `protect`, otherwise walks back to them.
    Defend {
        protect: String,
        #[serde(default)]
        weapon: Option<ItemType>,
    },
    /// Walks up to `to`, crawling once in giving range, and hands over every unit of `item`.
    Deliver { item: ItemType, to: String },
}

impl Behaviour {
    /// The other agent this behaviour acts on, if any.
    pub fn partner(&self) -> Option<&str> {
        match self {
            Behaviour::Idle => None,
            Behaviour::Defend { protect, .. } => Some(protect),
            Behaviour::Deliver { to, .. } => Some(to),
        }
    }
}

fn pair<'a>(
    registry: &'a mut AgentRegistry,
    id: &str,
    other: &str,
) -> Result<(&'a mut Agent, &'a mut Agent), ConfigError> {
    if registry.get(id).is_none() {
        return Err(ConfigError::UnknownAgent(id.to_string()));
    }
    registry
        .pair_mut(id, other)
        .ok_or_else(|| ConfigError::UnknownAgent(other.to_string()))
}

/// Advances `id`'s behaviour by one tick.
pub fn step(registry: &mut AgentRegistry, id: &str, behaviour: &Behaviour) -> anyhow::Result<()> {
    match behaviour {
        Behaviour::Idle => Ok(()),
        Behaviour::Defend { protect, weapon } => defend(registry, id, protect, *weapon),
        Behaviour::Deliver { item, to } => deliver(registry, id, *item, to),
    }
}

fn defend(
    registry: &mut AgentRegistry,
    id: &str,
    protect: &str,
    weapon: Option<ItemType>,
) -> anyhow::Result<()> {
    let (agent, ward) = pair(registry, id, protect)?;
    if let Some(weapon) = weapon
        && agent.inventory().amount_of(weapon) > 0
        && !agent.equip(weapon)?
    {
        return Ok(());
    }

    match ward.closest_mob(MobFilter::Hostile)? {
        Some(threat) => {
            debug!(agent = id, %threat, "defending");
            if agent.look_at(&threat)? && agent.move_to(&threat)? {
                agent.attack_mob(&threat)?;
            }
        }
        None => {
            if agent.look_at(&*ward)? && agent.move_to(&*ward)? {
                agent.stop_moving()?;
            }
        }
    }
    Ok(())
}

fn deliver(registry: &mut AgentRegistry, id: &str, item: ItemType, to: &str) -> anyhow::Result<()> {
    let ready = {
        let (agent, receiver) = pair(registry, id, to)?;
        if agent.inventory().amount_of(item) == 0 {
            return Ok(());
        }
        receiver.refresh()?;
        let band = agent.settings().tolerances.giving;
        agent.equip(item)?
            && agent.look_at(&*receiver)?
            && agent.move_to_within(&*receiver, band, false)?
    };
    if ready {
        registry.give_item(id, to, item)?;
    }
    Ok(())
}
