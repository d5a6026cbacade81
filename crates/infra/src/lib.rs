//! Infrastructure layer: stores, database wiring, configuration.

pub mod config;
pub mod db;
pub mod inventory_store;
pub mod user_store;

pub use config::{AdminBootstrap, AppConfig, ConfigError};
pub use db::DbError;
pub use inventory_store::{InMemoryInventoryStore, PostgresInventoryStore};
pub use user_store::{InMemoryUserStore, PostgresUserStore};

#[cfg(test)]
mod integration_tests;
