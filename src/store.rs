//! The inventory store seam.
//!
//! The engine is consumed as a library; the surrounding system owns
//! persistence. [`InventoryStore`] is the contract that persistence boundary
//! implements, and [`InMemoryStore`] is the in-process implementation used in
//! tests and single-node deployments.

use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::InventoryError;
use crate::models::{InventoryItem, ItemFilter};

/// Storage contract for inventory items.
///
/// `update_with` is the read-modify-write hook: implementations must run the
/// closure with at-least single-writer-at-a-time semantics per item, so two
/// concurrent adjustments to the same item cannot compute from the same
/// snapshot and lose an update. No cross-item coordination is required; each
/// item's ledger is independent.
pub trait InventoryStore: Send + Sync {
    /// All items matching the filter.
    fn fetch(&self, filter: &ItemFilter) -> Vec<InventoryItem>;

    /// One item by id.
    fn get(&self, id: Uuid) -> Option<InventoryItem>;

    /// Insert a new item. Fails if the id is already present.
    fn insert(&self, item: InventoryItem) -> Result<(), InventoryError>;

    /// Remove an item, returning it if it existed. The item's adjustment
    /// history goes with it; recipes referencing the item are not cascaded
    /// (that policy belongs to the host).
    fn remove(&self, id: Uuid) -> Option<InventoryItem>;

    /// Atomically mutate one item. The closure runs against a staged copy;
    /// if it fails nothing is written, so a rejected adjustment leaves both
    /// stock and ledger untouched. Returns the committed item.
    fn update_with(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut InventoryItem) -> Result<(), InventoryError>,
    ) -> Result<InventoryItem, InventoryError>;
}

/// DashMap-backed store. The map's per-entry locking serializes `update_with`
/// calls against the same item.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: DashMap<Uuid, InventoryItem>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl InventoryStore for InMemoryStore {
    fn fetch(&self, filter: &ItemFilter) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self
            .items
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    fn get(&self, id: Uuid) -> Option<InventoryItem> {
        self.items.get(&id).map(|entry| entry.value().clone())
    }

    fn insert(&self, item: InventoryItem) -> Result<(), InventoryError> {
        match self.items.entry(item.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(InventoryError::ValidationError(
                format!("inventory item {} already exists", item.id),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(item);
                Ok(())
            }
        }
    }

    fn remove(&self, id: Uuid) -> Option<InventoryItem> {
        self.items.remove(&id).map(|(_, item)| item)
    }

    fn update_with(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut InventoryItem) -> Result<(), InventoryError>,
    ) -> Result<InventoryItem, InventoryError> {
        let mut entry = self
            .items
            .get_mut(&id)
            .ok_or(InventoryError::ItemNotFound(id))?;
        let mut staged = entry.value().clone();
        mutate(&mut staged)?;
        *entry.value_mut() = staged.clone();
        Ok(staged)
    }
}
