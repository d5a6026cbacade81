//! `sweetshop-auth`: accounts, tokens and the role-based access policy.
//!
//! Decoupled from HTTP and storage; stores are reached through the
//! [`UserStore`] trait.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod service;
pub mod user;

pub use authorize::{AccessPolicy, AuthzError, InventoryOperation, authorize};
pub use claims::{JwtClaims, TokenType, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator, TokenIssueError, TokenPair};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use principal::{Caller, Principal};
pub use roles::{Role, UnknownRole};
pub use service::{AuthError, AuthService, AuthSession};
pub use user::{NewUser, Registration, UserAccount, UserStore, UserStoreError, ValidRegistration};
