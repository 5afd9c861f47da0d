use std::collections::BTreeMap;

use super::kinds::ItemType;
use super::observation::SlotObservation;
use crate::error::ConfigError;

pub const HOTBAR_SLOTS: usize = 9;
pub const INVENTORY_SLOTS: usize = 36;
pub const MAX_STACK: usize = 64;

/// One tracked unit of an item. Ids stay stable while the unit is held or handed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InventoryItem {
    pub id: String,
    pub item: ItemType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub item: ItemType,
    /// Unit ids; the quantity is the length.
    pub units: Vec<String>,
}

impl Stack {
    pub fn quantity(&self) -> usize {
        self.units.len()
    }
}

/// Slot bookkeeping for one agent: hotbar slots `0..9`, then the main inventory.
///
/// The wielded item is whatever sits in the selected hotbar slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    owner: String,
    slots: Vec<Option<Stack>>,
    selected: usize,
    next_id: u64,
}

impl Inventory {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            slots: vec![None; INVENTORY_SLOTS],
            selected: 0,
            next_id: 0,
        }
    }

    fn allocate(&mut self, item: ItemType) -> InventoryItem {
        let id = format!("{}_{}{}", self.owner, item, self.next_id);
        self.next_id += 1;
        InventoryItem { id, item }
    }

    /// Places `quantity` fresh units into a specific slot, replacing what was there.
    pub fn seed(
        &mut self,
        slot: usize,
        item: ItemType,
        quantity: usize,
    ) -> Result<Vec<InventoryItem>, ConfigError> {
        if slot >= INVENTORY_SLOTS {
            return Err(ConfigError::SlotOutOfRange {
                slot,
                capacity: INVENTORY_SLOTS,
            });
        }
        if !(1..=MAX_STACK).contains(&quantity) {
            return Err(ConfigError::QuantityOutOfRange {
                quantity,
                max: MAX_STACK,
            });
        }
        let units: Vec<InventoryItem> = (0..quantity)
            .map(|_| self.allocate(item))
            .collect();
        self.slots[slot] = Some(Stack {
            item,
            units: units.iter().map(|u| u.id.clone()).collect(),
        });
        Ok(units)
    }

    /// Adds a freshly identified unit. Returns `None` when no slot can take it.
    pub fn add(&mut self, item: ItemType) -> Option<InventoryItem> {
        let slot = self.slot_accepting(item)?;
        let unit = self.allocate(item);
        self.put(slot, unit.clone());
        Some(unit)
    }

    /// Adds a unit that already has an id (e.g. one handed over by another agent).
    pub fn insert(&mut self, unit: InventoryItem) -> bool {
        let Some(slot) = self.slot_accepting(unit.item) else {
            return false;
        };
        self.put(slot, unit);
        true
    }

    /// True when one more unit of `item` fits.
    pub fn has_room_for(&self, item: ItemType) -> bool {
        self.slot_accepting(item).is_some()
    }

    fn slot_accepting(&self, item: ItemType) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some(st) if st.item == item && st.quantity() < MAX_STACK))
            .or_else(|| self.slots.iter().position(Option::is_none))
    }

    fn put(&mut self, slot: usize, unit: InventoryItem) {
        match &mut self.slots[slot] {
            Some(stack) => stack.units.push(unit.id),
            empty => {
                *empty = Some(Stack {
                    item: unit.item,
                    units: vec![unit.id],
                })
            }
        }
    }

    fn take_from(&mut self, slot: usize) -> Option<InventoryItem> {
        let stack = self.slots.get_mut(slot)?.as_mut()?;
        let item = stack.item;
        let id = stack.units.pop()?;
        if stack.units.is_empty() {
            self.slots[slot] = None;
        }
        Some(InventoryItem { id, item })
    }

    /// Removes one unit of `item`, from the first slot holding it.
    pub fn remove(&mut self, item: ItemType) -> Option<InventoryItem> {
        let slot = self.slot_of(item)?;
        self.take_from(slot)
    }

    pub fn remove_equipped(&mut self) -> Option<InventoryItem> {
        self.take_from(self.selected)
    }

    pub fn amount_of(&self, item: ItemType) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item == item)
            .map(Stack::quantity)
            .sum()
    }

    pub fn slot_of(&self, item: ItemType) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some(st) if st.item == item))
    }

    pub fn item_in(&self, slot: usize) -> Option<ItemType> {
        self.slots.get(slot)?.as_ref().map(|s| s.item)
    }

    pub fn equipped_index(&self) -> usize {
        self.selected
    }

    pub fn equipped(&self) -> Option<InventoryItem> {
        let stack = self.slots[self.selected].as_ref()?;
        Some(InventoryItem {
            id: stack.units.last()?.clone(),
            item: stack.item,
        })
    }

    /// Selects a hotbar slot; indices outside the hotbar are ignored.
    pub fn select(&mut self, slot: usize) {
        if slot < HOTBAR_SLOTS {
            self.selected = slot;
        }
    }

    pub fn next_unused_hotbar(&self) -> Option<usize> {
        self.slots[..HOTBAR_SLOTS].iter().position(Option::is_none)
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        if a < INVENTORY_SLOTS && b < INVENTORY_SLOTS {
            self.slots.swap(a, b);
        }
    }

    /// Every held unit, in slot order.
    pub fn items(&self) -> Vec<InventoryItem> {
        self.slots
            .iter()
            .flatten()
            .flat_map(|s| {
                s.units.iter().map(|id| InventoryItem {
                    id: id.clone(),
                    item: s.item,
                })
            })
            .collect()
    }

    /// Reconciles with the simulator's inventory listing.
    ///
    /// Units keep their ids when they merely moved between slots. Returns the units that
    /// appeared, which were given fresh ids.
    pub fn sync(&mut self, listing: &[SlotObservation]) -> Vec<InventoryItem> {
        let mut pool: BTreeMap<ItemType, Vec<String>> = BTreeMap::new();
        for stack in self.slots.iter_mut().filter_map(Option::take) {
            pool.entry(stack.item).or_default().extend(stack.units);
        }

        let mut appeared = Vec::new();
        for entry in listing {
            if entry.index >= INVENTORY_SLOTS || entry.quantity == 0 {
                continue;
            }
            let Some(item) = ItemType::from_name(&entry.item) else {
                continue;
            };
            let mut units = Vec::with_capacity(entry.quantity as usize);
            for _ in 0..entry.quantity {
                match pool.get_mut(&item).and_then(|ids| {
                    if ids.is_empty() {
                        None
                    } else {
                        Some(ids.remove(0))
                    }
                }) {
                    Some(id) => units.push(id),
                    None => {
                        let unit = self.allocate(item);
                        units.push(unit.id.clone());
                        appeared.push(unit);
                    }
                }
            }
            self.slots[entry.index] = Some(Stack { item, units });
        }
        appeared
    }
}
