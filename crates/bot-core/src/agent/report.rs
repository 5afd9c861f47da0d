use crate::world::{Entity, InventoryItem, ItemFilter, MobFilter};

/// Outcome of one action call, queued on the agent until the trace logger drains it.
#[derive(Debug, Clone, PartialEq)]
pub enum LogReport {
    ClosestMob {
        filter: MobFilter,
        mob: Option<Entity>,
    },
    ClosestItem {
        filter: ItemFilter,
        item: Option<Entity>,
    },
    LookAt {
        target: Entity,
    },
    MoveTo {
        target: Entity,
    },
    Attack {
        target: Entity,
        killed: bool,
        /// Units that landed in the inventory right after a kill.
        obtained: Vec<InventoryItem>,
        /// Items lying nearby after a kill that nothing picked up.
        dropped: Vec<Entity>,
    },
    Craft {
        crafted: InventoryItem,
        consumed: Vec<InventoryItem>,
    },
    Equip {
        item: InventoryItem,
    },
    GiveItem {
        item: InventoryItem,
        receiver: Entity,
        /// What the giver wields afterwards.
        equipped_after: Option<InventoryItem>,
    },
}

/// Unit removed from a giver and not yet placed in the receiver's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandoff {
    pub giver: String,
    pub receiver: String,
    pub item: InventoryItem,
}
