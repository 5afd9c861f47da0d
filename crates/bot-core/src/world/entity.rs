use std::fmt;

use serde::{Deserialize, Serialize};

use super::kinds::{ItemType, MobType};
use crate::geometry::Vec3;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Hardcoded,
    Trained,
    Human,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Hardcoded => "hardcoded",
            AgentKind::Trained => "trained",
            AgentKind::Human => "human",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Agent,
    Mob,
    Item,
}

/// Category plus the type tag within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Agent(AgentKind),
    Mob(MobType),
    Item(ItemType),
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Agent(_) => Category::Agent,
            EntityKind::Mob(_) => Category::Mob,
            EntityKind::Item(_) => Category::Item,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Agent(kind) => kind.as_str(),
            EntityKind::Mob(mob) => mob.as_str(),
            EntityKind::Item(item) => item.as_str(),
        }
    }
}

/// One entity as seen in a single snapshot. Held by value for one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub position: Vec3,
    /// Stack size; only items carry one.
    pub quantity: Option<u32>,
}

impl Entity {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn mob_type(&self) -> Option<MobType> {
        match self.kind {
            EntityKind::Mob(mob) => Some(mob),
            _ => None,
        }
    }

    pub fn item_type(&self) -> Option<ItemType> {
        match self.kind {
            EntityKind::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_mob(&self) -> bool {
        self.category() == Category::Mob
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.id, self.kind.type_name())
    }
}

/// Anything with a stable id and a current position, so agents and world entities can both be
/// targeted.
pub trait Positioned {
    fn entity_id(&self) -> &str;
    fn as_entity(&self) -> Option<Entity>;
}

impl Positioned for Entity {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn as_entity(&self) -> Option<Entity> {
        Some(self.clone())
    }
}

/// Nearest entity accepted by `accept`; the first one scanned wins ties.
pub fn closest<'a, F>(from: Vec3, entities: &'a [Entity], mut accept: F) -> Option<&'a Entity>
where
    F: FnMut(&Entity) -> bool,
{
    let mut best: Option<(&Entity, f64)> = None;
    for entity in entities {
        if !accept(entity) {
            continue;
        }
        let d = from.distance(entity.position);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((entity, d)),
        }
    }
    best.map(|(e, _)| e)
}
