use thiserror::Error;

use sweetshop_core::{SweetId, ValidationError};

use crate::record::{InventoryRecord, MAX_STOCK, SweetFields};
use crate::store::{InventoryStore, StockChange, StoreError};

/// Failure of an inventory operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("sweet {0} not found")]
    NotFound(SweetId),

    #[error("insufficient stock for sweet {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: SweetId,
        available: i64,
        requested: i64,
    },

    #[error("inventory store failure: {0}")]
    Store(String),
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

/// Application service for the sweet catalog.
///
/// Every stock and field invariant is enforced here; the store only persists.
/// Stock changes go through [`InventoryStore::adjust_stock`] so concurrent
/// purchases of the same record can never oversell.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(&self, fields: &SweetFields) -> Result<InventoryRecord, InventoryError> {
        let sweet = fields.validate()?;
        Ok(self.store.insert(sweet).await?)
    }

    /// Full replace. Fields are validated before the record is looked up.
    pub async fn update(
        &self,
        id: SweetId,
        fields: &SweetFields,
    ) -> Result<InventoryRecord, InventoryError> {
        let sweet = fields.validate()?;
        Ok(self.store.replace(id, sweet).await?)
    }

    pub async fn delete(&self, id: SweetId) -> Result<(), InventoryError> {
        Ok(self.store.remove(id).await?)
    }

    pub async fn get(&self, id: SweetId) -> Result<InventoryRecord, InventoryError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<InventoryRecord>, InventoryError> {
        Ok(self.store.all().await?)
    }

    /// Case-insensitive substring search on name or category.
    ///
    /// A blank query returns the full listing.
    pub async fn search(&self, query: &str) -> Result<Vec<InventoryRecord>, InventoryError> {
        let needle = query.trim();
        if needle.is_empty() {
            return self.list().await;
        }
        Ok(self.store.find_by_text(needle).await?)
    }

    /// Sell `quantity` units of one sweet.
    pub async fn purchase(
        &self,
        id: SweetId,
        quantity: i64,
    ) -> Result<InventoryRecord, InventoryError> {
        // No upper bound here: an oversized amount is insufficient stock.
        if quantity <= 0 {
            return Err(ValidationError::must_be_positive("quantity").into());
        }

        match self.store.adjust_stock(id, -quantity).await? {
            StockChange::Applied(record) => Ok(record),
            StockChange::Insufficient { available } => Err(InventoryError::InsufficientStock {
                id,
                available,
                requested: quantity,
            }),
            // Only reachable with a positive delta.
            StockChange::CapacityExceeded { available } => {
                Err(ValidationError::too_large("quantity", MAX_STOCK - available).into())
            }
        }
    }

    /// Add `quantity` units to one sweet's stock.
    pub async fn restock(
        &self,
        id: SweetId,
        quantity: i64,
    ) -> Result<InventoryRecord, InventoryError> {
        check_quantity(quantity)?;

        match self.store.adjust_stock(id, quantity).await? {
            StockChange::Applied(record) => Ok(record),
            StockChange::CapacityExceeded { available } => {
                Err(ValidationError::too_large("quantity", MAX_STOCK - available).into())
            }
            StockChange::Insufficient { available } => Err(InventoryError::InsufficientStock {
                id,
                available,
                requested: quantity,
            }),
        }
    }
}

/// Restock amounts must be positive and fit in a stock level.
fn check_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    if quantity > MAX_STOCK {
        return Err(ValidationError::too_large("quantity", MAX_STOCK));
    }
    Ok(())
}
