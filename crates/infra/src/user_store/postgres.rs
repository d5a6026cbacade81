use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use sweetshop_auth::{NewUser, Role, UserAccount, UserStore, UserStoreError};
use sweetshop_core::UserId;

use crate::db::{describe, is_unique_violation};

const COLUMNS: &str = "id, username, email, password_hash, role, date_joined";

/// Postgres-backed account store over the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> UserStoreError {
    UserStoreError::Backend(describe(operation, &err))
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn insert(&self, user: NewUser) -> Result<UserAccount, UserStoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserStoreError::UsernameTaken(user.username.clone())
                } else {
                    map_sqlx_error("insert_user", e)
                }
            })?;

        row.try_into()
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, UserStoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserStoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        row.map(TryInto::try_into).transpose()
    }
}

#[derive(Debug)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    date_joined: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            date_joined: row.try_get("date_joined")?,
        })
    }
}

impl TryFrom<UserRow> for UserAccount {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| UserStoreError::Backend(format!("user {}: {e}", row.id)))?;

        Ok(UserAccount {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            date_joined: row.date_joined,
        })
    }
}
