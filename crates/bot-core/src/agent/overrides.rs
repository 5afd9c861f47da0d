use crate::world::{Entity, ItemType};

/// A required amount of one ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeItem {
    pub item: ItemType,
    pub quantity: usize,
}

impl RecipeItem {
    pub const fn new(item: ItemType, quantity: usize) -> Self {
        Self { item, quantity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    StopMoving,
    LookAt,
    MoveTo,
    AttackMob,
    Equip,
    Craft,
    GiveItem,
}

/// Pending action that takes over every other action call on the same agent.
///
/// Installed and cleared by whoever composes the agent's behaviour.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOverride {
    StopMoving,
    LookAt(Entity),
    MoveTo(Entity),
    AttackMob(Entity),
    Equip(ItemType),
    Craft {
        item: ItemType,
        recipe: Vec<RecipeItem>,
    },
    GiveItem {
        item: ItemType,
        receiver: Entity,
    },
}

impl ActionOverride {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionOverride::StopMoving => ActionKind::StopMoving,
            ActionOverride::LookAt(_) => ActionKind::LookAt,
            ActionOverride::MoveTo(_) => ActionKind::MoveTo,
            ActionOverride::AttackMob(_) => ActionKind::AttackMob,
            ActionOverride::Equip(_) => ActionKind::Equip,
            ActionOverride::Craft { .. } => ActionKind::Craft,
            ActionOverride::GiveItem { .. } => ActionKind::GiveItem,
        }
    }
}
