//! Inventory domain module.
//!
//! Business rules for the sweet catalog and its stock levels, implemented as
//! deterministic domain logic over an abstract store (no HTTP, no SQL, no logging).

pub mod record;
pub mod service;
pub mod store;

pub use record::{
    InventoryRecord, MAX_CATEGORY_LEN, MAX_NAME_LEN, MAX_PRICE, MAX_STOCK, PRICE_SCALE, SweetFields,
    ValidSweet,
};
pub use service::{InventoryError, InventoryService};
pub use store::{InventoryStore, StockChange, StoreError};
