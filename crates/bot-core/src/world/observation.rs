use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::kinds::{ItemType, MobType};
use crate::geometry::{Orientation, Vec3, normalize_yaw};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EntityObservation {
    pub name: String,
    /// Simulator instance id (usually a UUID).
    #[serde(default)]
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SlotObservation {
    #[serde(rename = "type")]
    pub item: String,
    pub index: usize,
    pub quantity: u32,
}

fn default_alive() -> bool {
    true
}

/// Latest world snapshot for one agent, decoded from the simulator's JSON.
///
/// Every field defaults so a partial snapshot still decodes; missing data reads as "nothing
/// found this tick".
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Observation {
    #[serde(rename = "XPos", default)]
    pub x: f64,
    #[serde(rename = "YPos", default)]
    pub y: f64,
    #[serde(rename = "ZPos", default)]
    pub z: f64,
    #[serde(rename = "Pitch", default)]
    pub pitch: f64,
    #[serde(rename = "Yaw", default)]
    pub yaw: f64,
    #[serde(rename = "IsAlive", default = "default_alive")]
    pub is_alive: bool,
    #[serde(rename = "MobsKilled", default)]
    pub mobs_killed: u32,
    #[serde(default)]
    pub nearby_entities: Vec<EntityObservation>,
    /// Full inventory listing, when the mission streams it.
    #[serde(default)]
    pub inventory: Option<Vec<SlotObservation>>,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            is_alive: true,
            mobs_killed: 0,
            nearby_entities: Vec::new(),
            inventory: None,
        }
    }
}

impl Observation {
    pub fn at(position: Vec3, pitch: f64, yaw: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            pitch,
            yaw,
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity: EntityObservation) -> Self {
        self.nearby_entities.push(entity);
        self
    }

    pub fn feet(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Yaw is reported in `(-180, 180]`; orientation uses `[0, 360)`.
    pub fn orientation(&self) -> Orientation {
        Orientation {
            pitch: self.pitch,
            yaw: normalize_yaw(self.yaw),
        }
    }

    /// Typed nearby mobs and items, in scan order. Entries of any other kind are skipped.
    pub fn entities(&self) -> Vec<Entity> {
        self.nearby_entities
            .iter()
            .filter_map(|e| {
                let kind = if let Some(mob) = MobType::from_name(&e.name) {
                    EntityKind::Mob(mob)
                } else if let Some(item) = ItemType::from_name(&e.name) {
                    EntityKind::Item(item)
                } else {
                    return None;
                };
                let quantity = match kind {
                    EntityKind::Item(_) => Some(e.quantity.unwrap_or(1)),
                    _ => None,
                };
                Some(Entity {
                    id: entity_id(&e.name, &e.id),
                    kind,
                    position: Vec3::new(e.x, e.y, e.z),
                    quantity,
                })
            })
            .collect()
    }
}

/// Atom-safe entity id: the name followed by the instance id with separators removed.
pub fn entity_id(name: &str, instance: &str) -> String {
    let digits: String = instance.chars().filter(|c| *c != '-').collect();
    format!("{name}{digits}")
}
