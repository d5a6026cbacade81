//! Role-based access policy for inventory operations.
//!
//! Pure policy checks: no IO, no panics. The API layer enforces these before
//! calling into the inventory service.

use serde::Serialize;
use thiserror::Error;

use crate::permissions::{Permission, SWEETS_MANAGE, SWEETS_PURCHASE, SWEETS_VIEW};
use crate::{Caller, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No credentials were presented.
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Every operation the inventory exposes to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryOperation {
    List,
    Search,
    Get,
    Purchase,
    Create,
    Update,
    Delete,
    Restock,
}

impl InventoryOperation {
    pub const ALL: [InventoryOperation; 8] = [
        InventoryOperation::List,
        InventoryOperation::Search,
        InventoryOperation::Get,
        InventoryOperation::Purchase,
        InventoryOperation::Create,
        InventoryOperation::Update,
        InventoryOperation::Delete,
        InventoryOperation::Restock,
    ];

    pub fn required_permission(&self) -> Permission {
        match self {
            InventoryOperation::List | InventoryOperation::Search | InventoryOperation::Get => {
                SWEETS_VIEW
            }
            InventoryOperation::Purchase => SWEETS_PURCHASE,
            InventoryOperation::Create
            | InventoryOperation::Update
            | InventoryOperation::Delete
            | InventoryOperation::Restock => SWEETS_MANAGE,
        }
    }
}

/// Check a single permission for an authenticated principal.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.role.grants(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Maps callers to the inventory operations they may perform.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Anonymous callers are rejected for every operation; authenticated
    /// callers need the operation's permission.
    pub fn authorize(&self, caller: &Caller, operation: InventoryOperation) -> Result<(), AuthzError> {
        let principal = caller.principal().ok_or(AuthzError::Unauthenticated)?;
        authorize(principal, &operation.required_permission())
    }
}
