use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use super::atom::{NONE, StateTable};
use super::flags::TrackingFlags;
use crate::agent::{Agent, AgentRegistry, LogReport};
use crate::error::ConfigError;
use crate::world::{Category, Entity, InventoryItem};

const PLACEHOLDER: (&str, &str, &str) = ("none", NONE, "NoneType");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Finished,
}

/// Builds the predicate trace of one mission.
///
/// The log is append-only; the [`StateTable`] beside it holds the latest value per
/// (predicate, subject). State atoms are only written when they change the table, so repeated
/// identical reports add nothing.
#[derive(Debug)]
pub struct TraceLogger {
    lines: Vec<String>,
    table: StateTable,
    defined: HashSet<String>,
    tracking: HashMap<String, TrackingFlags>,
    /// Target of the agent's last logged block when that block was a non-killing attack.
    last_attack: HashMap<String, String>,
    phase: Phase,
}

impl Default for TraceLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceLogger {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            table: StateTable::new(),
            defined: HashSet::new(),
            tracking: HashMap::new(),
            last_attack: HashMap::new(),
            phase: Phase::Idle,
        }
    }

    /// Extra state to keep current for an agent. Replaces earlier flags for it.
    pub fn track(&mut self, agent: &str, flags: TrackingFlags) {
        self.tracking.insert(agent.to_string(), flags);
    }

    pub fn tracking(&self, agent: &str) -> TrackingFlags {
        self.tracking.get(agent).copied().unwrap_or_default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn current_state(&self) -> &StateTable {
        &self.table
    }

    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Logs definitions and the initial state of every registered agent, then `START`.
    pub fn start(&mut self, registry: &mut AgentRegistry) -> anyhow::Result<()> {
        if self.phase != Phase::Idle {
            return Err(ConfigError::LoggerAlreadyStarted.into());
        }

        let (p, s, o) = PLACEHOLDER;
        self.push(format!("{p}-{s}-{o}"));
        self.table.set(p, s, o);

        for agent in registry.iter_mut() {
            agent.refresh()?;
            agent.sync_inventory();
            let id = agent.id().to_string();
            let flags = self.tracking(&id);

            self.define_agent(agent);
            for entity in agent.nearby_entities() {
                self.define(&entity);
            }

            if flags.contains(TrackingFlags::INVENTORY) {
                for unit in agent.inventory().items() {
                    self.define_item(&unit);
                    self.write_atom("at", &unit.id, &id);
                }
                let equipped = agent.inventory().equipped();
                let equipped = equipped.as_ref().map_or(NONE, |u| u.id.as_str());
                self.write_atom("equipped_item", &id, equipped);
            }

            self.write_atom("looking_at", &id, NONE);
            self.write_atom("at", &id, NONE);
            self.refresh_tracked(agent, flags)?;
            for report in agent.drain_reports() {
                self.record(&id, report);
            }
        }
        self.settle_handoffs(registry);

        self.push("START");
        self.newline();
        self.phase = Phase::Running;
        info!(agents = registry.len(), "trace started");
        Ok(())
    }

    /// Processes one tick: late agents, aliveness, tracked queries, every queued report, then
    /// pending handoffs.
    pub fn update(&mut self, registry: &mut AgentRegistry) -> anyhow::Result<()> {
        self.ensure_running()?;

        for agent in registry.iter_mut() {
            agent.refresh()?;
            let id = agent.id().to_string();
            self.define_agent(agent);
            self.set_status(&id, agent.is_alive());

            let flags = self.tracking(&id);
            self.refresh_tracked(agent, flags)?;
            for report in agent.drain_reports() {
                self.record(&id, report);
            }
        }
        self.settle_handoffs(registry);
        Ok(())
    }

    /// Delivers pending handoffs. A unit the receiver had no room for is back with its giver.
    fn settle_handoffs(&mut self, registry: &mut AgentRegistry) {
        registry.deliver_handoffs();
        for handoff in registry.take_returned() {
            self.define_item(&handoff.item);
            self.newline();
            self.write_atom("at", &handoff.item.id, &handoff.giver);
            self.newline();
        }
    }

    /// Drains the last reports, then logs `END` and the final state table.
    pub fn finish(&mut self, registry: &mut AgentRegistry) -> anyhow::Result<()> {
        self.update(registry)?;
        self.newline();
        self.push("END");
        let atoms: Vec<String> = self.table.iter().map(ToString::to_string).collect();
        self.lines.extend(atoms);
        self.phase = Phase::Finished;
        info!(lines = self.lines.len(), "trace finished");
        Ok(())
    }

    /// Writes the log to `<dir>/trace_<YYYY-MM-DD_HH-MM-SS>.txt`.
    pub fn export(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create trace dir {}", dir.display()))?;
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = dir.join(format!("trace_{stamp}.txt"));
        self.export_to(&path)?;
        Ok(path)
    }

    pub fn export_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.contents())
            .with_context(|| format!("write trace {}", path.display()))?;
        info!(path = %path.display(), "trace exported");
        Ok(())
    }

    fn ensure_running(&self) -> anyhow::Result<()> {
        match self.phase {
            Phase::Running => Ok(()),
            Phase::Idle => Err(ConfigError::LoggerNotStarted.into()),
            Phase::Finished => anyhow::bail!("trace logger already finished"),
        }
    }

    fn refresh_tracked(&mut self, agent: &mut Agent, flags: TrackingFlags) -> anyhow::Result<()> {
        for filter in flags.mob_filters() {
            agent.closest_mob(filter)?;
        }
        for filter in flags.item_filters() {
            agent.closest_item(filter)?;
        }
        Ok(())
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Section separator; never doubled and never first.
    fn newline(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Logs a state atom only when it changes the current state.
    fn write_atom(&mut self, predicate: &str, subject: &str, object: &str) -> bool {
        let changed = self.table.set(predicate, subject, object);
        if changed {
            self.push(format!("{predicate}-{subject}-{object}"));
        }
        changed
    }

    /// Logs a condition atom unconditionally and records it as current.
    fn state(&mut self, predicate: &str, subject: &str, object: &str) {
        self.table.set(predicate, subject, object);
        self.push(format!("{predicate}-{subject}-{object}"));
    }

    fn set_status(&mut self, id: &str, alive: bool) {
        self.write_atom("status", id, if alive { "alive" } else { "dead" });
    }

    fn define_agent(&mut self, agent: &Agent) {
        if self.defined.insert(agent.id().to_string()) {
            self.push(format!("agents-{}-{}", agent.id(), agent.kind().as_str()));
            self.set_status(agent.id(), agent.is_alive());
        }
    }

    /// Defines an entity the first time its id is seen. Agents and mobs also get a status.
    fn define(&mut self, entity: &Entity) -> bool {
        if !self.defined.insert(entity.id.clone()) {
            return false;
        }
        let section = match entity.category() {
            Category::Agent => "agents",
            Category::Mob => "mobs",
            Category::Item => "items",
        };
        self.push(format!("{section}-{}-{}", entity.id, entity.kind.type_name()));
        if entity.category() != Category::Item {
            self.set_status(&entity.id, true);
        }
        true
    }

    fn define_item(&mut self, unit: &InventoryItem) -> bool {
        if !self.defined.insert(unit.id.clone()) {
            return false;
        }
        self.push(format!("items-{}-{}", unit.id, unit.item));
        true
    }

    fn record(&mut self, agent: &str, report: LogReport) {
        debug!(agent, ?report, "trace report");
        match report {
            LogReport::ClosestMob { filter, mob } => {
                self.record_closest(agent, filter.predicate(), mob.as_ref())
            }
            LogReport::ClosestItem { filter, item } => {
                self.record_closest(agent, filter.predicate(), item.as_ref())
            }
            LogReport::LookAt { target } => {
                if self.table.holds("looking_at", agent, &target.id) {
                    return;
                }
                self.last_attack.remove(agent);
                self.define(&target);
                self.newline();
                self.push(format!("!LOOKAT-{agent}-{}", target.id));
                self.state("looking_at", agent, &target.id);
                self.newline();
            }
            LogReport::MoveTo { target } => {
                if self.table.holds("at", agent, &target.id) {
                    return;
                }
                self.last_attack.remove(agent);
                self.define(&target);
                self.newline();
                self.state("looking_at", agent, &target.id);
                self.push(format!("!MOVETO-{agent}-{}", target.id));
                self.state("at", agent, &target.id);
                self.newline();
            }
            LogReport::Attack {
                target,
                killed,
                obtained,
                dropped,
            } => self.record_attack(agent, &target, killed, &obtained, &dropped),
            LogReport::Craft { crafted, consumed } => {
                self.last_attack.remove(agent);
                self.define_item(&crafted);
                self.newline();
                for unit in &consumed {
                    self.state("at", &unit.id, agent);
                }
                self.push(format!("!CRAFT-{agent}-{}", crafted.id));
                for unit in &consumed {
                    self.state("at", &unit.id, NONE);
                }
                self.state("at", &crafted.id, agent);
                self.newline();
            }
            LogReport::Equip { item } => {
                if self.table.holds("equipped_item", agent, &item.id) {
                    return;
                }
                self.last_attack.remove(agent);
                self.define_item(&item);
                self.newline();
                self.state("at", &item.id, agent);
                self.push(format!("!EQUIP-{agent}-{}", item.id));
                self.state("equipped_item", agent, &item.id);
                self.newline();
            }
            LogReport::GiveItem {
                item,
                receiver,
                equipped_after,
            } => {
                self.last_attack.remove(agent);
                self.define_item(&item);
                self.define(&receiver);
                self.newline();
                self.state("equipped_item", agent, &item.id);
                self.state("looking_at", agent, &receiver.id);
                self.state("at", agent, &receiver.id);
                self.push(format!("!GIVEITEM-{agent}-{}-{}", item.id, receiver.id));
                self.state("at", &item.id, &receiver.id);
                let after = equipped_after.as_ref().map_or(NONE, |u| u.id.as_str());
                self.state("equipped_item", agent, after);
                self.newline();
            }
        }
    }

    fn record_closest(&mut self, agent: &str, predicate: &str, found: Option<&Entity>) {
        let object = match found {
            Some(entity) => {
                self.define(entity);
                entity.id.as_str()
            }
            None => NONE,
        };
        self.write_atom(predicate, agent, object);
    }

    fn record_attack(
        &mut self,
        agent: &str,
        target: &Entity,
        killed: bool,
        obtained: &[InventoryItem],
        dropped: &[Entity],
    ) {
        if !killed && self.last_attack.get(agent) == Some(&target.id) {
            return;
        }
        self.define(target);
        self.newline();
        self.state("looking_at", agent, &target.id);
        self.state("at", agent, &target.id);
        self.push(format!("!ATTACK-{agent}-{}", target.id));

        if !killed {
            self.last_attack.insert(agent.to_string(), target.id.clone());
            self.newline();
            return;
        }
        self.last_attack.remove(agent);
        self.set_status(&target.id, false);
        for unit in obtained {
            self.define_item(unit);
            self.state("at", &unit.id, NONE);
        }
        for item in dropped {
            if self.define(item) {
                self.state("at", &item.id, NONE);
            }
        }
        for unit in obtained {
            self.newline();
            self.push(format!("!PICKUPITEM-{agent}-{}", unit.id));
            self.state("at", &unit.id, agent);
        }
        self.newline();
    }
}
