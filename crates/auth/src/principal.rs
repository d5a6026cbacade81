use serde::{Deserialize, Serialize};

use sweetshop_core::UserId;

use crate::Role;

/// An authenticated account acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

/// Who is calling: resolved once per request from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(p) => Some(p),
        }
    }
}

impl From<Principal> for Caller {
    fn from(value: Principal) -> Self {
        Caller::Authenticated(value)
    }
}
