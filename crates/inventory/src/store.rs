use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use sweetshop_core::SweetId;

use crate::record::{InventoryRecord, ValidSweet};

/// Failure reported by an inventory store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("sweet {0} not found")]
    NotFound(SweetId),

    /// The backing storage failed (connection, query, poisoned lock).
    #[error("inventory store error: {0}")]
    Backend(String),
}

/// Outcome of a conditional stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockChange {
    /// The delta was applied; carries the record after the change.
    Applied(InventoryRecord),
    /// The delta would drive stock below zero. Nothing changed.
    Insufficient { available: i64 },
    /// The delta would push stock above `MAX_STOCK`. Nothing changed.
    CapacityExceeded { available: i64 },
}

/// Persistence port for inventory records.
///
/// Implementations keep no business rules beyond the atomic bounds check in
/// [`InventoryStore::adjust_stock`]; all other validation happens before a
/// call reaches the store.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Persist a new record and assign it a fresh id.
    async fn insert(&self, sweet: ValidSweet) -> Result<InventoryRecord, StoreError>;

    async fn get_by_id(&self, id: SweetId) -> Result<Option<InventoryRecord>, StoreError>;

    /// Overwrite every mutable field of an existing record.
    async fn replace(&self, id: SweetId, sweet: ValidSweet) -> Result<InventoryRecord, StoreError>;

    async fn remove(&self, id: SweetId) -> Result<(), StoreError>;

    /// All records, id ascending.
    async fn all(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Records whose name or category contains `needle` (case-insensitive), id ascending.
    async fn find_by_text(&self, needle: &str) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Add `delta` to the stock level if the result stays within `0..=MAX_STOCK`.
    ///
    /// Check and write are one atomic step with respect to other calls on the
    /// same id.
    async fn adjust_stock(&self, id: SweetId, delta: i64) -> Result<StockChange, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn insert(&self, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        (**self).insert(sweet).await
    }

    async fn get_by_id(&self, id: SweetId) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn replace(&self, id: SweetId, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        (**self).replace(id, sweet).await
    }

    async fn remove(&self, id: SweetId) -> Result<(), StoreError> {
        (**self).remove(id).await
    }

    async fn all(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).all().await
    }

    async fn find_by_text(&self, needle: &str) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).find_by_text(needle).await
    }

    async fn adjust_stock(&self, id: SweetId, delta: i64) -> Result<StockChange, StoreError> {
        (**self).adjust_stock(id, delta).await
    }
}
