//! API-side authorization guard for inventory operations.
//!
//! Enforced at the handler boundary, before the inventory service is called,
//! so the domain stays auth-agnostic.

use sweetshop_auth::{AccessPolicy, Caller, InventoryOperation, Principal};

use crate::app::errors::ApiError;

/// Check `operation` for the current caller.
pub fn authorize_operation(
    policy: &AccessPolicy,
    caller: &Caller,
    operation: InventoryOperation,
) -> Result<(), ApiError> {
    policy.authorize(caller, operation).map_err(|e| {
        tracing::debug!(?operation, error = %e, "operation denied");
        ApiError::from(e)
    })
}

/// The authenticated principal, or 401 for anonymous callers.
pub fn require_principal(caller: &Caller) -> Result<&Principal, ApiError> {
    caller
        .principal()
        .ok_or(ApiError::Authz(sweetshop_auth::AuthzError::Unauthenticated))
}
