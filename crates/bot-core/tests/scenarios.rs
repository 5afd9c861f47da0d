//! End-to-end scenarios driving agents through scripted snapshots.

use std::time::Duration;

use tracebot_core::agent::{ActionOverride, AgentRegistry, Command, LogReport, ScriptedEnvironment};
use tracebot_core::config::ActionSettings;
use tracebot_core::geometry::{Orientation, Vec3, is_facing, turn_rates};
use tracebot_core::trace::TraceLogger;
use tracebot_core::world::{
    AgentKind, EntityObservation, ItemType, MobFilter, Observation, SlotObservation,
};

fn mob(name: &str, id: &str, x: f64, y: f64, z: f64) -> EntityObservation {
    EntityObservation {
        name: name.to_string(),
        id: id.to_string(),
        x,
        y,
        z,
        quantity: None,
    }
}

fn spawn(reg: &mut AgentRegistry, id: &str, obs: Observation) -> ScriptedEnvironment {
    let env = ScriptedEnvironment::new(obs);
    reg.spawn(id, AgentKind::Hardcoded, env.clone(), ActionSettings::default())
        .unwrap();
    env
}

fn count(logger: &TraceLogger, line: &str) -> usize {
    logger.lines().iter().filter(|l| *l == line).count()
}

#[test]
fn aligned_target_needs_no_yaw_correction() {
    let rates = turn_rates(
        Vec3::ZERO,
        Orientation { pitch: 0.0, yaw: 0.0 },
        Vec3::new(0.0, 0.0, 5.0),
    );
    assert_eq!(rates.yaw, 0.0);
    assert!(is_facing(5.0, rates));

    let mut reg = AgentRegistry::new();
    let env = spawn(
        &mut reg,
        "A",
        Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(mob("Pig", "5", 0.0, 1.0, 5.0)),
    );
    let agent = reg.require_mut("A").unwrap();
    let pig = agent.closest_mob(MobFilter::Peaceful).unwrap().unwrap();
    assert!(agent.look_at(&pig).unwrap());
    assert_eq!(env.sent(), vec![Command::Pitch(0.0), Command::Turn(0.0)]);
}

#[test]
fn equip_from_overflow_with_full_hotbar_swaps_into_wielded_slot() {
    let mut reg = AgentRegistry::new();
    let env = spawn(&mut reg, "A", Observation::default());
    let agent = reg.require_mut("A").unwrap();
    for (slot, item) in ItemType::ALL.iter().take(9).enumerate() {
        agent.inventory_mut().seed(slot, *item, 1).unwrap();
    }
    agent.inventory_mut().seed(10, ItemType::DiamondSword, 1).unwrap();
    assert_eq!(agent.inventory().next_unused_hotbar(), None);

    assert!(agent.equip(ItemType::DiamondSword).unwrap());
    assert_eq!(
        env.sent(),
        vec![
            Command::SwapInventoryItems(0, 10),
            Command::Hotbar { slot: 0, pressed: true },
            Command::Hotbar { slot: 0, pressed: false },
        ]
    );
    assert_eq!(agent.inventory().equipped_index(), 0);
    assert_eq!(agent.inventory().equipped().unwrap().item, ItemType::DiamondSword);
    assert_eq!(agent.inventory().item_in(10), Some(ItemType::ALL[0]));
    assert!(matches!(
        agent.drain_reports().as_slice(),
        [LogReport::Equip { item }] if item.item == ItemType::DiamondSword
    ));
}

#[test]
fn attack_out_of_reach_stops_and_reports_nothing() {
    let mut reg = AgentRegistry::new();
    let env = spawn(
        &mut reg,
        "A",
        Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(mob("Zombie", "9", 0.0, 1.0, 10.0)),
    );
    let agent = reg.require_mut("A").unwrap();
    let zombie = agent.closest_mob(MobFilter::Hostile).unwrap().unwrap();
    agent.drain_reports();

    assert!(!agent.attack_mob(&zombie).unwrap());
    let sent = env.sent();
    assert!(sent.contains(&Command::Move(0.0)));
    assert!(!sent.contains(&Command::Attack(true)));
    assert!(agent.drain_reports().is_empty());
}

#[test]
fn empty_closest_mob_is_logged_once_over_identical_ticks() {
    let mut reg = AgentRegistry::new();
    spawn(&mut reg, "A", Observation::default());
    let mut logger = TraceLogger::new();
    logger.start(&mut reg).unwrap();

    for _ in 0..3 {
        let found = reg.require_mut("A").unwrap().closest_mob(MobFilter::All).unwrap();
        assert!(found.is_none());
        reg.tick_all();
        logger.update(&mut reg).unwrap();
    }
    assert_eq!(count(&logger, "closest_mob-A-None"), 1);
}

#[test]
fn kill_then_pickup_is_traced() {
    let standing = Observation::at(Vec3::ZERO, 0.0, 0.0);
    let mut reg = AgentRegistry::new();
    let env = spawn(
        &mut reg,
        "A",
        standing.clone().with_entity(mob("Cow", "7", 0.0, 1.0, 2.0)),
    );
    let mut killed = standing.clone();
    killed.mobs_killed = 1;
    env.push_frame(killed.clone());
    let mut looted = killed;
    looted.inventory = Some(vec![SlotObservation {
        item: "beef".into(),
        index: 0,
        quantity: 1,
    }]);
    env.push_frame(looted);

    let mut logger = TraceLogger::new();
    logger.start(&mut reg).unwrap();
    assert_eq!(count(&logger, "mobs-Cow7-Cow"), 1);

    let agent = reg.require_mut("A").unwrap();
    let cow = agent.closest_mob(MobFilter::Food).unwrap().unwrap();
    assert!(agent.attack_mob(&cow).unwrap());
    assert_eq!(agent.inventory().amount_of(ItemType::Beef), 1);
    assert_eq!(env.waited(), Duration::from_millis(1000));

    logger.update(&mut reg).unwrap();
    for line in [
        "!ATTACK-A-Cow7",
        "status-Cow7-dead",
        "items-A_beef0-beef",
        "!PICKUPITEM-A-A_beef0",
        "at-A_beef0-A",
    ] {
        assert_eq!(count(&logger, line), 1, "missing {line}");
    }
}

fn giver_and_receiver() -> (AgentRegistry, ScriptedEnvironment) {
    let mut reg = AgentRegistry::new();
    let giver = spawn(&mut reg, "A", Observation::at(Vec3::ZERO, 0.0, 0.0));
    spawn(&mut reg, "B", Observation::at(Vec3::new(0.0, 0.0, 3.0), 0.0, 180.0));
    reg.require_mut("A")
        .unwrap()
        .inventory_mut()
        .seed(0, ItemType::Bread, 1)
        .unwrap();
    (reg, giver)
}

#[test]
fn give_item_hands_the_same_unit_over() {
    let (mut reg, giver) = giver_and_receiver();
    let mut logger = TraceLogger::new();
    logger.start(&mut reg).unwrap();

    assert!(reg.give_item("A", "B", ItemType::Bread).unwrap());
    assert_eq!(reg.get("A").unwrap().inventory().amount_of(ItemType::Bread), 0);
    let received = reg.get("B").unwrap().inventory().items();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, "A_bread0");

    let sent = giver.sent();
    assert_eq!(sent.last(), Some(&Command::DiscardCurrentItem));
    assert_eq!(giver.waited(), Duration::from_millis(2800));

    logger.update(&mut reg).unwrap();
    assert_eq!(count(&logger, "!GIVEITEM-A-A_bread0-B"), 1);
    assert_eq!(count(&logger, "at-A_bread0-B"), 1);
    assert_eq!(count(&logger, "equipped_item-A-None"), 1);
}

#[test]
fn give_outside_band_fails() {
    let (mut reg, _giver) = giver_and_receiver();
    reg.get_mut("B")
        .unwrap()
        .refresh()
        .unwrap();
    let (a, b) = reg.pair_mut("A", "B").unwrap();
    // One block away is inside the minimum giving distance.
    let mut b_entity = tracebot_core::world::Positioned::as_entity(&*b).unwrap();
    b_entity.position = Vec3::new(0.0, 1.0, 1.0);
    assert!(!a.give_item(ItemType::Bread, &b_entity).unwrap());
    assert_eq!(a.inventory().amount_of(ItemType::Bread), 1);
    assert!(a.take_handoffs().is_empty());
}

#[test]
fn handoff_lands_at_next_logger_update() {
    let (mut reg, _giver) = giver_and_receiver();
    let mut logger = TraceLogger::new();
    logger.start(&mut reg).unwrap();

    let (a, b) = reg.pair_mut("A", "B").unwrap();
    assert!(a.give_item(ItemType::Bread, &*b).unwrap());
    assert!(b.inventory().items().is_empty());

    logger.update(&mut reg).unwrap();
    assert_eq!(reg.get("B").unwrap().inventory().amount_of(ItemType::Bread), 1);
}

#[test]
fn override_redirects_other_actions() {
    let mut reg = AgentRegistry::new();
    let env = spawn(
        &mut reg,
        "A",
        Observation::at(Vec3::ZERO, 0.0, 0.0).with_entity(mob("Sheep", "3", -6.0, 1.0, 0.0)),
    );
    let agent = reg.require_mut("A").unwrap();
    let sheep = agent.closest_mob(MobFilter::All).unwrap().unwrap();

    agent.set_override(ActionOverride::LookAt(sheep));
    assert!(!agent.equip(ItemType::Stick).unwrap());
    assert_eq!(env.sent(), vec![Command::Pitch(0.0), Command::Turn(1.0)]);

    agent.clear_override();
    env.clear_sent();
    assert!(!agent.equip(ItemType::Stick).unwrap());
    assert_eq!(env.sent(), Command::stop_all().to_vec());
}
