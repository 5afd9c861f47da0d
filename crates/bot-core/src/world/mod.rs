//! Typed view over the simulator's world snapshots: entity kinds, nearby entities and the
//! per-agent inventory model.

pub mod entity;
pub mod inventory;
pub mod kinds;
pub mod observation;

pub use entity::{AgentKind, Category, Entity, EntityKind, Positioned, closest};
pub use inventory::{HOTBAR_SLOTS, INVENTORY_SLOTS, Inventory, InventoryItem, MAX_STACK};
pub use kinds::{ItemFilter, ItemType, MobFilter, MobType};
pub use observation::{EntityObservation, Observation, SlotObservation, entity_id};
