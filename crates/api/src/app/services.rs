//! Store and service wiring.
//!
//! `DATABASE_URL` selects PostgreSQL; without it every store is in-memory
//! (dev/test).

use std::sync::Arc;

use sweetshop_auth::{AccessPolicy, AuthError, AuthService, Hs256Jwt, UserStore};
use sweetshop_infra::{
    AppConfig, DbError, InMemoryInventoryStore, InMemoryUserStore, PostgresInventoryStore,
    PostgresUserStore, db,
};
use sweetshop_inventory::{InventoryService, InventoryStore};

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppServices {
    pub inventory: InventoryService<Arc<dyn InventoryStore>>,
    pub auth: AuthService<Arc<dyn UserStore>>,
    pub policy: AccessPolicy,
}

impl AppServices {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        users: Arc<dyn UserStore>,
        jwt: Arc<Hs256Jwt>,
    ) -> Self {
        Self {
            inventory: InventoryService::new(inventory),
            auth: AuthService::new(users, jwt),
            policy: AccessPolicy,
        }
    }

    pub fn in_memory(jwt: Arc<Hs256Jwt>) -> Self {
        Self::new(
            Arc::new(InMemoryInventoryStore::new()),
            Arc::new(InMemoryUserStore::new()),
            jwt,
        )
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        self.auth.jwt()
    }
}

/// Build services from configuration, connecting and migrating the database
/// when one is configured.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, DbError> {
    let jwt = Arc::new(Hs256Jwt::new(
        config.jwt_secret.as_bytes(),
        config.jwt_access_lifetime_secs,
        config.jwt_refresh_lifetime_secs,
    ));

    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set; using in-memory stores");
        return Ok(AppServices::in_memory(jwt));
    };

    let pool = db::connect(url, config.db_max_connections).await?;
    db::migrate(&pool).await?;

    Ok(AppServices::new(
        Arc::new(PostgresInventoryStore::new(pool.clone())),
        Arc::new(PostgresUserStore::new(pool)),
        jwt,
    ))
}

/// Create the configured admin account if it does not exist yet.
pub async fn bootstrap_admin(services: &AppServices, config: &AppConfig) -> Result<(), AuthError> {
    let Some(admin) = &config.admin else {
        return Ok(());
    };

    services
        .auth
        .ensure_admin(&admin.username, &admin.email, &admin.password)
        .await?;
    Ok(())
}
