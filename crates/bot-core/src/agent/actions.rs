//! High-level actions. Each call is level triggered: it returns `Ok(true)` only when the goal
//! already holds, and the caller keeps calling it every tick until then.
//!
//! Every action first yields to an installed override of a different kind. While any override
//! is installed, preconditions read as satisfied.

use tracing::{debug, warn};

use super::command::Command;
use super::controller::Agent;
use super::movement::{MoveBand, Walk};
use super::overrides::{ActionKind, ActionOverride, RecipeItem};
use super::report::{ItemHandoff, LogReport};
use crate::geometry::{Vec3, is_facing, turn_rates};
use crate::world::{Category, Entity, ItemFilter, ItemType, MobFilter, Positioned, closest};

impl Agent {
    fn override_for(&self, kind: ActionKind) -> Option<ActionOverride> {
        self.action_override
            .as_ref()
            .filter(|pending| pending.kind() != kind)
            .cloned()
    }

    fn run_override(&mut self, action: ActionOverride) -> anyhow::Result<bool> {
        debug!(agent = %self.id(), kind = ?action.kind(), "deferring to override");
        match action {
            ActionOverride::StopMoving => self.stop_moving(),
            ActionOverride::LookAt(target) => self.look_at(&target),
            ActionOverride::MoveTo(target) => self.move_to(&target),
            ActionOverride::AttackMob(target) => self.attack_mob(&target),
            ActionOverride::Equip(item) => self.equip(item),
            ActionOverride::Craft { item, recipe } => self.craft(item, &recipe),
            ActionOverride::GiveItem { item, receiver } => self.give_item(item, &receiver),
        }
    }

    fn preconditions_hold(&self, checks: &[bool]) -> bool {
        self.action_override.is_some() || checks.iter().all(|ok| *ok)
    }

    /// Refreshes the snapshot and resolves the target; `None` when either side has no position.
    fn locate<T: Positioned + ?Sized>(&mut self, target: &T) -> anyhow::Result<Option<(Vec3, Entity)>> {
        self.refresh()?;
        let Some(eye) = self.eye_position() else {
            return Ok(None);
        };
        let Some(entity) = target.as_entity() else {
            debug!(agent = %self.id(), target = target.entity_id(), "target has no position");
            return Ok(None);
        };
        Ok(Some((eye, entity)))
    }

    fn facing(&self, eye: Vec3, target: Vec3) -> bool {
        self.orientation().is_some_and(|orientation| {
            is_facing(eye.distance(target), turn_rates(eye, orientation, target))
        })
    }

    pub fn stop_moving(&mut self) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::StopMoving) {
            return self.run_override(action);
        }
        self.halt()?;
        Ok(true)
    }

    /// Turns toward the target. True once facing it.
    pub fn look_at<T: Positioned + ?Sized>(&mut self, target: &T) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::LookAt) {
            return self.run_override(action);
        }
        let Some((eye, entity)) = self.locate(target)? else {
            return Ok(false);
        };
        let Some(orientation) = self.orientation() else {
            return Ok(false);
        };

        let rates = turn_rates(eye, orientation, entity.position);
        if is_facing(eye.distance(entity.position), rates) {
            self.stop_turning()?;
            self.enqueue(LogReport::LookAt { target: entity });
            return Ok(true);
        }
        debug!(agent = %self.id(), target = %entity, pitch = rates.pitch, yaw = rates.yaw, "turning");
        self.send(&Command::Pitch(rates.pitch))?;
        self.send(&Command::Turn(rates.yaw))?;
        Ok(false)
    }

    /// Walks into striking distance of the target and stops.
    pub fn move_to<T: Positioned + ?Sized>(&mut self, target: &T) -> anyhow::Result<bool> {
        let band = self.settings.tolerances.striking();
        self.move_to_within(target, band, true)
    }

    /// Keeps within the follow band of the target, crawling forward once there.
    pub fn follow<T: Positioned + ?Sized>(&mut self, target: &T) -> anyhow::Result<bool> {
        let band = self.settings.tolerances.follow;
        self.move_to_within(target, band, false)
    }

    /// Walks until the horizontal distance to the target lies in `band`.
    ///
    /// Requires facing the target. In band, `hard_stop` halts all motion; otherwise the agent
    /// keeps crawling forward.
    pub fn move_to_within<T: Positioned + ?Sized>(
        &mut self,
        target: &T,
        band: MoveBand,
        hard_stop: bool,
    ) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::MoveTo) {
            return self.run_override(action);
        }
        let Some((eye, entity)) = self.locate(target)? else {
            self.halt()?;
            return Ok(false);
        };

        let facing = self.facing(eye, entity.position);
        if !self.preconditions_hold(&[facing]) {
            debug!(agent = %self.id(), target = %entity, "move_to: not facing target");
            self.halt()?;
            return Ok(false);
        }

        let distance = eye.distance_xz(entity.position);
        match band.classify(distance) {
            Walk::InBand => {
                if hard_stop {
                    self.halt()?;
                } else {
                    self.send(&Walk::InBand.command(false))?;
                }
                self.enqueue(LogReport::MoveTo { target: entity });
                Ok(true)
            }
            walk => {
                debug!(agent = %self.id(), target = %entity, distance, ?walk, "walking");
                self.send(&walk.command(hard_stop))?;
                Ok(false)
            }
        }
    }

    /// Swings once at a mob. True when the swing happened, whether or not it killed.
    pub fn attack_mob(&mut self, target: &Entity) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::AttackMob) {
            return self.run_override(action);
        }
        let Some((eye, mob)) = self.locate(target)? else {
            self.halt()?;
            return Ok(false);
        };

        let striking = self.settings.tolerances.striking();
        let checks = [
            mob.is_mob(),
            self.facing(eye, mob.position),
            striking.contains(eye.distance_xz(mob.position)),
        ];
        if !self.preconditions_hold(&checks) {
            debug!(agent = %self.id(), target = %mob, ?checks, "attack: preconditions unmet");
            self.halt()?;
            return Ok(false);
        }

        let before = self.mobs_killed();
        self.send(&Command::Attack(true))?;
        self.halt()?;
        self.pause(self.settings.timings.attack());
        self.refresh()?;
        let killed = self.mobs_killed() > before;

        let mut obtained = Vec::new();
        let mut dropped = Vec::new();
        if killed {
            self.pause(self.settings.timings.pickup());
            self.refresh()?;
            obtained = self.sync_inventory();
            if obtained.is_empty() {
                dropped = self
                    .nearby_entities()
                    .into_iter()
                    .filter(|e| e.category() == Category::Item)
                    .collect();
            }
        }
        debug!(agent = %self.id(), target = %mob, killed, obtained = obtained.len(), "attacked");
        self.enqueue(LogReport::Attack {
            target: mob,
            killed,
            obtained,
            dropped,
        });
        Ok(true)
    }

    /// Wields an item from the inventory.
    ///
    /// Search order: already wielded; already in the hotbar; into a free hotbar slot; swapped
    /// with the wielded slot.
    pub fn equip(&mut self, item: ItemType) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::Equip) {
            return self.run_override(action);
        }
        let owned = self.inventory().amount_of(item) >= 1;
        if !self.preconditions_hold(&[owned]) {
            debug!(agent = %self.id(), %item, "equip: item not in inventory");
            self.halt()?;
            return Ok(false);
        }
        if self.inventory().equipped().is_some_and(|unit| unit.item == item) {
            return Ok(true);
        }
        let Some(from) = self.inventory().slot_of(item) else {
            return Ok(false);
        };

        let slot = if from < crate::world::HOTBAR_SLOTS {
            from
        } else {
            let to = self
                .inventory()
                .next_unused_hotbar()
                .unwrap_or(self.inventory().equipped_index());
            self.send(&Command::SwapInventoryItems(to, from))?;
            self.inventory_mut().swap(to, from);
            to
        };
        self.send(&Command::Hotbar { slot, pressed: true })?;
        self.send(&Command::Hotbar { slot, pressed: false })?;
        self.inventory_mut().select(slot);

        let Some(unit) = self.inventory().equipped() else {
            return Ok(false);
        };
        debug!(agent = %self.id(), unit = %unit.id, slot, "equipped");
        self.enqueue(LogReport::Equip { item: unit });
        Ok(true)
    }

    /// Crafts one `item` from the recipe, consuming the ingredients.
    pub fn craft(&mut self, item: ItemType, recipe: &[RecipeItem]) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::Craft) {
            return self.run_override(action);
        }
        let has_all = recipe
            .iter()
            .all(|r| self.inventory().amount_of(r.item) >= r.quantity);
        if !self.preconditions_hold(&[has_all]) {
            debug!(agent = %self.id(), %item, "craft: missing ingredients");
            self.halt()?;
            return Ok(false);
        }

        let mut consumed = Vec::new();
        for ingredient in recipe {
            for _ in 0..ingredient.quantity {
                if let Some(unit) = self.inventory_mut().remove(ingredient.item) {
                    consumed.push(unit);
                }
            }
        }
        let Some(crafted) = self.inventory_mut().add(item) else {
            for unit in consumed {
                self.inventory_mut().insert(unit);
            }
            warn!(agent = %self.id(), %item, "craft: inventory full");
            return Ok(false);
        };

        self.send(&Command::Craft(item))?;
        self.pause(self.settings.timings.craft());
        self.enqueue(LogReport::Craft { crafted, consumed });
        Ok(true)
    }

    /// Throws the wielded `item` to another agent.
    ///
    /// The unit leaves this inventory at once and waits as a handoff until the registry places
    /// it in the receiver's inventory.
    pub fn give_item<T: Positioned + ?Sized>(
        &mut self,
        item: ItemType,
        receiver: &T,
    ) -> anyhow::Result<bool> {
        if let Some(action) = self.override_for(ActionKind::GiveItem) {
            return self.run_override(action);
        }
        self.halt()?;
        let Some((eye, target)) = self.locate(receiver)? else {
            return Ok(false);
        };

        let holding = self
            .inventory()
            .equipped()
            .is_some_and(|unit| unit.item == item);
        let checks = [
            holding,
            self.facing(eye, target.position),
            self.settings.tolerances.giving.contains(eye.distance_xz(target.position)),
        ];
        if !self.preconditions_hold(&checks) {
            debug!(agent = %self.id(), receiver = %target, ?checks, "give: preconditions unmet");
            return Ok(false);
        }

        let unit = if holding {
            self.inventory_mut().remove_equipped()
        } else {
            self.inventory_mut().remove(item)
        };
        let Some(unit) = unit else {
            warn!(agent = %self.id(), %item, "give: nothing to hand over");
            return Ok(false);
        };

        self.send(&Command::DiscardCurrentItem)?;
        self.pause(self.settings.timings.give());
        let giver = self.id().to_string();
        self.queue_handoff(ItemHandoff {
            giver,
            receiver: target.id.clone(),
            item: unit.clone(),
        });
        let equipped_after = self.inventory().equipped();
        self.enqueue(LogReport::GiveItem {
            item: unit,
            receiver: target,
            equipped_after,
        });
        Ok(true)
    }

    /// Nearest mob matching `filter`. Always queues a report, even for `None`.
    pub fn closest_mob(&mut self, filter: MobFilter) -> anyhow::Result<Option<Entity>> {
        self.refresh()?;
        let found = self.eye_position().and_then(|eye| {
            let entities = self.nearby_entities();
            closest(eye, &entities, |e| e.mob_type().is_some_and(|m| filter.matches(m))).cloned()
        });
        self.enqueue(LogReport::ClosestMob {
            filter,
            mob: found.clone(),
        });
        Ok(found)
    }

    /// Nearest item on the ground matching `filter`. Always queues a report, even for `None`.
    pub fn closest_item(&mut self, filter: ItemFilter) -> anyhow::Result<Option<Entity>> {
        self.refresh()?;
        let found = self.eye_position().and_then(|eye| {
            let entities = self.nearby_entities();
            closest(eye, &entities, |e| e.item_type().is_some_and(|i| filter.matches(i))).cloned()
        });
        self.enqueue(LogReport::ClosestItem {
            filter,
            item: found.clone(),
        });
        Ok(found)
    }

    /// [`Agent::closest_mob`] with the filter given by name (`all`, `peaceful`, `hostile`, `food`).
    pub fn closest_mob_named(&mut self, filter: &str) -> anyhow::Result<Option<Entity>> {
        let filter: MobFilter = filter.parse()?;
        self.closest_mob(filter)
    }

    /// [`Agent::closest_item`] with the filter given by name (`all`, `food`).
    pub fn closest_item_named(&mut self, filter: &str) -> anyhow::Result<Option<Entity>> {
        let filter: ItemFilter = filter.parse()?;
        self.closest_item(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ScriptedEnvironment;
    use crate::config::ActionSettings;
    use crate::world::{AgentKind, EntityObservation, MobType, Observation};

    fn agent_at(obs: Observation) -> (Agent, ScriptedEnvironment) {
        let env = ScriptedEnvironment::new(obs);
        let agent = Agent::new("A", AgentKind::Hardcoded, env.clone(), ActionSettings::default())
            .unwrap();
        (agent, env)
    }

    fn zombie_at(x: f64, y: f64, z: f64) -> EntityObservation {
        EntityObservation {
            name: "Zombie".into(),
            id: "1".into(),
            x,
            y,
            z,
            quantity: None,
        }
    }

    #[test]
    fn look_at_turns_toward_target() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(zombie_at(5.0, 1.0, 0.0));
        let (mut agent, env) = agent_at(obs);
        let target = agent.closest_mob(MobFilter::Hostile).unwrap().unwrap();

        assert!(!agent.look_at(&target).unwrap());
        // +x is yaw 270, the short way round from 0 is a negative turn.
        assert!(env.sent().contains(&Command::Turn(-1.0)));
        assert!(!agent
            .pending_reports()
            .iter()
            .any(|r| matches!(r, LogReport::LookAt { .. })));
    }

    #[test]
    fn move_to_requires_facing() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(zombie_at(5.0, 1.0, 0.0));
        let (mut agent, env) = agent_at(obs);
        let target = agent.closest_mob(MobFilter::All).unwrap().unwrap();

        assert!(!agent.move_to(&target).unwrap());
        assert_eq!(env.sent(), Command::stop_all().to_vec());
    }

    #[test]
    fn move_to_advances_then_stops_in_band() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(zombie_at(0.0, 1.0, 8.0));
        let (mut agent, env) = agent_at(obs);
        let target = agent.closest_mob(MobFilter::All).unwrap().unwrap();

        assert!(!agent.move_to(&target).unwrap());
        assert_eq!(env.sent(), vec![Command::Move(1.0)]);

        env.clear_sent();
        env.set_current(Observation::at(Vec3::new(0.0, 0.0, 6.0), 0.0, 0.0));
        assert!(agent.move_to(&target).unwrap());
        assert_eq!(env.sent(), Command::stop_all().to_vec());
        assert!(matches!(
            agent.drain_reports().last(),
            Some(LogReport::MoveTo { target: t }) if t.id == "Zombie1"
        ));
    }

    #[test]
    fn follow_crawls_inside_band() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(zombie_at(0.0, 1.0, 4.0));
        let (mut agent, env) = agent_at(obs);
        let target = agent.closest_mob(MobFilter::All).unwrap().unwrap();
        assert!(agent.follow(&target).unwrap());
        assert_eq!(env.sent(), vec![Command::Move(crate::agent::movement::CRAWL_RATE)]);
    }

    #[test]
    fn override_takes_over_other_actions() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(zombie_at(0.0, 1.0, 2.0));
        let (mut agent, env) = agent_at(obs);
        let zombie = agent.closest_mob(MobFilter::All).unwrap().unwrap();
        agent.inventory_mut().seed(0, ItemType::Bread, 1).unwrap();

        agent.set_override(ActionOverride::StopMoving);
        assert!(agent.equip(ItemType::Bread).unwrap());
        assert!(agent.look_at(&zombie).unwrap());
        assert_eq!(env.sent().len(), 8);
        assert!(env.sent().iter().all(|c| Command::stop_all().contains(c)));

        agent.clear_override();
        env.clear_sent();
        assert!(!agent.craft(ItemType::Bread, &[RecipeItem::new(ItemType::Wheat, 3)]).unwrap());
    }

    #[test]
    fn override_bypasses_preconditions_of_its_own_action() {
        let obs = Observation::at(Vec3::ZERO, 0.0, 180.0).with_entity(zombie_at(0.0, 1.0, 9.0));
        let (mut agent, env) = agent_at(obs);
        let zombie = agent.closest_mob(MobFilter::All).unwrap().unwrap();

        agent.set_override(ActionOverride::AttackMob(zombie.clone()));
        assert!(agent.look_at(&zombie).unwrap());
        assert!(env.sent().contains(&Command::Attack(true)));
    }

    #[test]
    fn craft_consumes_ingredients() {
        let (mut agent, env) = agent_at(Observation::default());
        agent.inventory_mut().seed(12, ItemType::Wheat, 3).unwrap();

        let recipe = [RecipeItem::new(ItemType::Wheat, 3)];
        assert!(agent.craft(ItemType::Bread, &recipe).unwrap());
        assert_eq!(agent.inventory().amount_of(ItemType::Wheat), 0);
        assert_eq!(agent.inventory().amount_of(ItemType::Bread), 1);
        assert_eq!(env.sent(), vec![Command::Craft(ItemType::Bread)]);
        match agent.drain_reports().as_slice() {
            [LogReport::Craft { crafted, consumed }] => {
                assert_eq!(crafted.item, ItemType::Bread);
                assert_eq!(consumed.len(), 3);
            }
            other => panic!("unexpected reports {other:?}"),
        }
    }

    #[test]
    fn equip_from_hotbar_toggles_slot() {
        let (mut agent, env) = agent_at(Observation::default());
        agent.inventory_mut().seed(4, ItemType::IronSword, 1).unwrap();
        assert!(agent.equip(ItemType::IronSword).unwrap());
        assert_eq!(
            env.sent(),
            vec![
                Command::Hotbar { slot: 4, pressed: true },
                Command::Hotbar { slot: 4, pressed: false },
            ]
        );
        assert_eq!(agent.inventory().equipped_index(), 4);

        env.clear_sent();
        assert!(agent.equip(ItemType::IronSword).unwrap());
        assert!(env.sent().is_empty());
    }

    #[test]
    fn equip_into_free_hotbar_slot() {
        let (mut agent, env) = agent_at(Observation::default());
        agent.inventory_mut().seed(0, ItemType::Stick, 1).unwrap();
        agent.inventory_mut().seed(20, ItemType::Beef, 2).unwrap();
        assert!(agent.equip(ItemType::Beef).unwrap());
        assert_eq!(env.sent()[0], Command::SwapInventoryItems(1, 20));
        assert_eq!(agent.inventory().item_in(1), Some(ItemType::Beef));
        assert_eq!(agent.inventory().equipped().unwrap().item, ItemType::Beef);
    }

    #[test]
    fn equip_missing_item_fails() {
        let (mut agent, _env) = agent_at(Observation::default());
        assert!(!agent.equip(ItemType::Diamond).unwrap());
        assert!(agent.pending_reports().is_empty());
    }

    #[test]
    fn named_filters_validate() {
        let (mut agent, _env) = agent_at(Observation::default());
        let err = agent.closest_mob_named("scary").unwrap_err();
        assert!(err.downcast_ref::<crate::error::ConfigError>().is_some());
        assert!(agent.closest_item_named("food").unwrap().is_none());
        assert_eq!(MobType::from_name("Zombie"), Some(MobType::Zombie));
    }
}
