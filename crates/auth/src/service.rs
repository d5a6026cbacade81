use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use sweetshop_core::ValidationErrors;

use crate::claims::{TokenType, TokenValidationError};
use crate::jwt::{Hs256Jwt, TokenIssueError, TokenPair};
use crate::password::{PasswordError, hash_password, verify_password};
use crate::user::{
    NewUser, Registration, UserAccount, UserStore, UserStoreError, validate_email,
    validate_password, validate_username,
};
use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("a user with username '{0}' already exists")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenValidationError),

    #[error("authentication backend failure: {0}")]
    Internal(String),
}

impl From<UserStoreError> for AuthError {
    fn from(value: UserStoreError) -> Self {
        match value {
            UserStoreError::UsernameTaken(name) => Self::UsernameTaken(name),
            UserStoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(value: PasswordError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<TokenIssueError> for AuthError {
    fn from(value: TokenIssueError) -> Self {
        Self::Internal(value.to_string())
    }
}

/// An account together with a freshly issued token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub user: UserAccount,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Registration, login and token renewal over a [`UserStore`].
#[derive(Debug, Clone)]
pub struct AuthService<U> {
    users: U,
    jwt: Arc<Hs256Jwt>,
}

impl<U> AuthService<U>
where
    U: UserStore,
{
    pub fn new(users: U, jwt: Arc<Hs256Jwt>) -> Self {
        Self { users, jwt }
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        Arc::clone(&self.jwt)
    }

    /// Create a `user`-role account and sign it in.
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, AuthError> {
        let valid = registration.validate()?;

        if self.users.find_by_username(&valid.username).await?.is_some() {
            return Err(AuthError::UsernameTaken(valid.username));
        }

        let user = self
            .users
            .insert(NewUser {
                username: valid.username,
                email: valid.email,
                password_hash: hash_off_thread(valid.password).await?,
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        self.session(user)
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            tracing::warn!(username = %username.trim(), "login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_off_thread(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.session(user)
    }

    /// Exchange a refresh token for a new pair. The role is re-read from the store.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.jwt.decode(refresh_token, TokenType::Refresh, Utc::now())?;

        let user = self
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(self.jwt.issue_pair(&user.principal(), Utc::now())?)
    }

    /// The stored account behind an authenticated principal.
    pub async fn current_user(&self, principal: &Principal) -> Result<UserAccount, AuthError> {
        self.users
            .get_by_id(principal.user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Create the bootstrap admin account unless the username already exists.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, AuthError> {
        let username = username.trim();
        let email = email.trim();

        if let Some(existing) = self.users.find_by_username(username).await? {
            if !existing.role.is_admin() {
                tracing::warn!(username = %username, "bootstrap admin username belongs to a non-admin account");
            }
            return Ok(existing);
        }

        let mut errors = ValidationErrors::new();
        for check in [
            validate_username(username),
            validate_email(email),
            validate_password(password),
        ] {
            if let Err(e) = check {
                errors.push(e);
            }
        }
        errors.into_result()?;

        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_off_thread(password.to_string()).await?,
                role: Role::Admin,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "admin account created");
        Ok(user)
    }

    fn session(&self, user: UserAccount) -> Result<AuthSession, AuthError> {
        let tokens = self.jwt.issue_pair(&user.principal(), Utc::now())?;
        Ok(AuthSession { user, tokens })
    }
}

// Argon2 is CPU-bound; keep it off the async worker threads.
async fn hash_off_thread(password: String) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))??;
    Ok(hash)
}

async fn verify_off_thread(password: String, phc_hash: String) -> Result<bool, AuthError> {
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &phc_hash))
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))??;
    Ok(matches)
}
