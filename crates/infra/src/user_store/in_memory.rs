use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use sweetshop_auth::{NewUser, UserAccount, UserStore, UserStoreError};
use sweetshop_core::UserId;

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<UserId, UserAccount>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> UserStoreError {
    UserStoreError::Backend("user store lock poisoned".to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<UserAccount, UserStoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        // Check and insert under one write lock so usernames stay unique.
        if users.values().any(|u| u.username == user.username) {
            return Err(UserStoreError::UsernameTaken(user.username));
        }

        let next = users.keys().next_back().map_or(1, |id| id.get() + 1);
        let account = UserAccount {
            id: UserId::new(next),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            date_joined: Utc::now(),
        };
        users.insert(account.id, account.clone());

        tracing::debug!(user_id = %account.id, "user inserted");
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, UserStoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserStoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }
}
