use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::{Permission, SWEETS_MANAGE, SWEETS_PURCHASE, SWEETS_VIEW};

/// Role of an authenticated account.
///
/// Anonymous callers have no role at all; see [`crate::Caller`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        const USER: &[Permission] = &[SWEETS_VIEW, SWEETS_PURCHASE];
        const ADMIN: &[Permission] = &[SWEETS_VIEW, SWEETS_PURCHASE, SWEETS_MANAGE];

        match self {
            Role::User => USER,
            Role::Admin => ADMIN,
        }
    }

    pub fn grants(&self, permission: &Permission) -> bool {
        self.permissions().contains(permission)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_grants_everything_user_grants() {
        for perm in Role::User.permissions() {
            assert!(Role::Admin.grants(perm));
        }
        assert!(Role::Admin.grants(&SWEETS_MANAGE));
        assert!(!Role::User.grants(&SWEETS_MANAGE));
    }

    #[test]
    fn parses_and_displays_lowercase() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("staff".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
