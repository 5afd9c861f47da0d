use tracing::{debug, info, warn};

use super::controller::Agent;
use super::environment::Environment;
use super::report::ItemHandoff;
use crate::config::ActionSettings;
use crate::error::ConfigError;
use crate::world::{AgentKind, Entity, ItemType, Positioned};

/// All agents of one mission, in registration order. Created at mission start and dropped at
/// teardown; agents are never removed mid-mission.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    /// Handoffs that found no room and went back to their givers.
    returned: Vec<ItemHandoff>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, agent: Agent) -> Result<&mut Agent, ConfigError> {
        if self.get(agent.id()).is_some() {
            return Err(ConfigError::DuplicateAgent(agent.id().to_string()));
        }
        info!(agent = agent.id(), kind = agent.kind().as_str(), "agent registered");
        self.agents.push(agent);
        let last = self.agents.len() - 1;
        Ok(&mut self.agents[last])
    }

    pub fn spawn(
        &mut self,
        id: &str,
        kind: AgentKind,
        env: impl Environment + 'static,
        settings: ActionSettings,
    ) -> Result<&mut Agent, ConfigError> {
        if self.get(id).is_some() {
            return Err(ConfigError::DuplicateAgent(id.to_string()));
        }
        self.register(Agent::new(id, kind, env, settings)?)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Agent, ConfigError> {
        self.get_mut(id)
            .ok_or_else(|| ConfigError::UnknownAgent(id.to_string()))
    }

    /// Agent as a targetable entity; `None` until it has a snapshot.
    pub fn entity_of(&self, id: &str) -> Option<Entity> {
        self.get(id)?.as_entity()
    }

    /// Two distinct agents borrowed mutably at once, so one can act on the other.
    pub fn pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut Agent, &mut Agent)> {
        let i = self.agents.iter().position(|x| x.id() == a)?;
        let j = self.agents.iter().position(|x| x.id() == b)?;
        if i == j {
            return None;
        }
        if i < j {
            let (left, right) = self.agents.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.agents.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    /// Runs one `give_item` attempt between two registered agents and delivers the unit at once
    /// when it succeeds.
    pub fn give_item(&mut self, giver: &str, receiver: &str, item: ItemType) -> anyhow::Result<bool> {
        if self.get(giver).is_none() {
            return Err(ConfigError::UnknownAgent(giver.to_string()).into());
        }
        let Some((from, to)) = self.pair_mut(giver, receiver) else {
            return Err(ConfigError::UnknownAgent(receiver.to_string()).into());
        };
        to.refresh()?;
        if !to.inventory().has_room_for(item) {
            debug!(giver, receiver, %item, "give: receiver inventory full");
            from.halt()?;
            return Ok(false);
        }
        let given = from.give_item(item, &*to)?;
        if given {
            self.deliver_handoffs();
        }
        Ok(given)
    }

    /// Moves every pending handoff into its receiver's inventory. Returns how many landed.
    pub fn deliver_handoffs(&mut self) -> usize {
        let pending: Vec<_> = self
            .agents
            .iter_mut()
            .flat_map(|a| a.take_handoffs())
            .collect();

        let mut delivered = 0;
        for handoff in pending {
            let Some(receiver) = self.get_mut(&handoff.receiver) else {
                warn!(receiver = %handoff.receiver, unit = %handoff.item.id, "handoff to unknown agent dropped");
                continue;
            };
            if receiver.inventory_mut().insert(handoff.item.clone()) {
                delivered += 1;
                continue;
            }
            warn!(receiver = %handoff.receiver, unit = %handoff.item.id, "receiver inventory full, returning unit");
            let returned = self
                .get_mut(&handoff.giver)
                .is_some_and(|giver| giver.inventory_mut().insert(handoff.item.clone()));
            if returned {
                self.returned.push(handoff);
            } else {
                warn!(giver = %handoff.giver, unit = %handoff.item.id, "unit lost: giver inventory full");
            }
        }
        delivered
    }

    /// Handoffs bounced back to their givers since the last call.
    pub fn take_returned(&mut self) -> Vec<ItemHandoff> {
        std::mem::take(&mut self.returned)
    }

    pub fn tick_all(&mut self) {
        for agent in &mut self.agents {
            agent.tick();
        }
    }

    /// Active while any agent's mission is still running.
    pub fn is_mission_active(&mut self) -> anyhow::Result<bool> {
        for agent in &mut self.agents {
            if agent.is_mission_active()? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Command, ScriptedEnvironment};
    use crate::geometry::Vec3;
    use crate::world::{INVENTORY_SLOTS, MAX_STACK, Observation};

    fn spawn(reg: &mut AgentRegistry, id: &str, obs: Observation) -> ScriptedEnvironment {
        let env = ScriptedEnvironment::new(obs);
        reg.spawn(id, AgentKind::Hardcoded, env.clone(), ActionSettings::default())
            .unwrap();
        env
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut reg = AgentRegistry::new();
        spawn(&mut reg, "A", Observation::default());
        let err = reg
            .spawn("A", AgentKind::Trained, ScriptedEnvironment::default(), ActionSettings::default())
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateAgent("A".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn pair_mut_borrows_both_orders() {
        let mut reg = AgentRegistry::new();
        spawn(&mut reg, "A", Observation::default());
        spawn(&mut reg, "B", Observation::default());
        let (b, a) = reg.pair_mut("B", "A").unwrap();
        assert_eq!((a.id(), b.id()), ("A", "B"));
        assert!(reg.pair_mut("A", "A").is_none());
        assert!(reg.pair_mut("A", "C").is_none());
    }

    #[test]
    fn entity_of_needs_a_snapshot() {
        let mut reg = AgentRegistry::new();
        spawn(&mut reg, "A", Observation::at(Vec3::new(1.0, 0.0, 1.0), 0.0, 0.0));
        assert!(reg.entity_of("A").is_none());
        reg.require_mut("A").unwrap().refresh().unwrap();
        assert_eq!(reg.entity_of("A").unwrap().position, Vec3::new(1.0, 1.0, 1.0));
        assert!(matches!(reg.require_mut("Z"), Err(ConfigError::UnknownAgent(_))));
    }

    #[test]
    fn give_between_unknown_agents_is_an_error() {
        let mut reg = AgentRegistry::new();
        spawn(&mut reg, "A", Observation::default());
        let err = reg.give_item("A", "Nobody", ItemType::Beef).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownAgent("Nobody".into()))
        );
    }

    #[test]
    fn give_to_full_receiver_is_refused() {
        let mut reg = AgentRegistry::new();
        let giver = spawn(&mut reg, "A", Observation::at(Vec3::ZERO, 0.0, 0.0));
        spawn(&mut reg, "B", Observation::at(Vec3::new(0.0, 0.0, 3.0), 0.0, 180.0));
        reg.require_mut("A")
            .unwrap()
            .inventory_mut()
            .seed(0, ItemType::Bread, 1)
            .unwrap();
        let receiver = reg.require_mut("B").unwrap();
        for slot in 0..INVENTORY_SLOTS {
            receiver
                .inventory_mut()
                .seed(slot, ItemType::Stick, MAX_STACK)
                .unwrap();
        }

        assert!(!reg.give_item("A", "B", ItemType::Bread).unwrap());
        assert_eq!(reg.get("A").unwrap().inventory().amount_of(ItemType::Bread), 1);
        assert_eq!(reg.get("B").unwrap().inventory().amount_of(ItemType::Bread), 0);
        assert!(reg.require_mut("A").unwrap().drain_reports().is_empty());
        assert_eq!(giver.sent(), Command::stop_all().to_vec());
        assert!(reg.take_returned().is_empty());
    }
}
