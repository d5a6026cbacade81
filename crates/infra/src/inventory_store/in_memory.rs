use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use sweetshop_core::SweetId;
use sweetshop_inventory::{InventoryRecord, InventoryStore, MAX_STOCK, StockChange, StoreError, ValidSweet};

type Slot = Arc<Mutex<InventoryRecord>>;

/// In-memory inventory store.
///
/// Each record sits behind its own mutex so stock adjustments on different
/// sweets never contend. The map lock is held (shared) while a record is
/// adjusted, so a concurrent delete cannot interleave with the adjustment.
#[derive(Debug)]
pub struct InMemoryInventoryStore {
    records: RwLock<BTreeMap<SweetId, Slot>>,
    next_id: AtomicI64,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn snapshot<F>(&self, mut keep: F) -> Result<Vec<InventoryRecord>, StoreError>
    where
        F: FnMut(&InventoryRecord) -> bool,
    {
        let map = self.records.read().map_err(|_| poisoned())?;
        let mut out = Vec::with_capacity(map.len());
        for slot in map.values() {
            let record = slot.lock().map_err(|_| poisoned())?;
            if keep(&record) {
                out.push(record.clone());
            }
        }
        Ok(out)
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("inventory lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert(&self, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        let id = SweetId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = InventoryRecord::from_valid(id, sweet);

        let mut map = self.records.write().map_err(|_| poisoned())?;
        map.insert(id, Arc::new(Mutex::new(record.clone())));

        tracing::debug!(sweet_id = %id, "sweet inserted");
        Ok(record)
    }

    async fn get_by_id(&self, id: SweetId) -> Result<Option<InventoryRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        match map.get(&id) {
            Some(slot) => Ok(Some(slot.lock().map_err(|_| poisoned())?.clone())),
            None => Ok(None),
        }
    }

    async fn replace(&self, id: SweetId, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        let slot = map.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut record = slot.lock().map_err(|_| poisoned())?;
        *record = InventoryRecord::from_valid(id, sweet);

        tracing::debug!(sweet_id = %id, "sweet replaced");
        Ok(record.clone())
    }

    async fn remove(&self, id: SweetId) -> Result<(), StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        map.remove(&id).ok_or(StoreError::NotFound(id))?;

        tracing::debug!(sweet_id = %id, "sweet removed");
        Ok(())
    }

    async fn all(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        self.snapshot(|_| true)
    }

    async fn find_by_text(&self, needle: &str) -> Result<Vec<InventoryRecord>, StoreError> {
        let needle = needle.to_lowercase();
        self.snapshot(|record| record.matches(&needle))
    }

    async fn adjust_stock(&self, id: SweetId, delta: i64) -> Result<StockChange, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        let slot = map.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut record = slot.lock().map_err(|_| poisoned())?;

        let available = record.quantity_in_stock;
        let Some(next) = available.checked_add(delta) else {
            return Ok(if delta < 0 {
                StockChange::Insufficient { available }
            } else {
                StockChange::CapacityExceeded { available }
            });
        };
        if next < 0 {
            return Ok(StockChange::Insufficient { available });
        }
        if next > MAX_STOCK {
            return Ok(StockChange::CapacityExceeded { available });
        }

        record.quantity_in_stock = next;
        tracing::debug!(sweet_id = %id, delta, stock = next, "stock adjusted");
        Ok(StockChange::Applied(record.clone()))
    }
}
