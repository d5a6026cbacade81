//! Account store implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
