//! `sweetshop-core` — shared domain building blocks.
//!
//! Identifiers and validation errors used by every other crate. No IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, ValidationError, ValidationErrors};
pub use id::{SweetId, UserId};
