//! Application configuration.
//!
//! Loaded from environment variables with fallback to defaults.

use std::net::SocketAddr;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "sweetshop-dev-secret-change-in-production";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),

    #[error("missing required configuration: {0}")]
    MissingRequired(String),
}

/// Credentials for the admin account created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl core::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string. `None` selects the in-memory stores.
    pub database_url: Option<String>,

    pub db_max_connections: u32,

    /// HS256 signing secret.
    pub jwt_secret: String,

    pub jwt_access_lifetime_secs: i64,
    pub jwt_refresh_lifetime_secs: i64,

    pub admin: Option<AdminBootstrap>,

    /// Allowed CORS origin; `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database", &self.database_url.as_ref().map(|_| "<set>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_access_lifetime_secs", &self.jwt_access_lifetime_secs)
            .field("jwt_refresh_lifetime_secs", &self.jwt_refresh_lifetime_secs)
            .field("admin", &self.admin)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap {
                email: var("ADMIN_EMAIL").unwrap_or_else(|| format!("{username}@localhost.localdomain")),
                username,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingRequired("ADMIN_PASSWORD".into())),
            (None, Some(_)) => return Err(ConfigError::MissingRequired("ADMIN_USERNAME".into())),
        };

        let config = AppConfig {
            bind_addr: parse_or(&var, "BIND_ADDR", "0.0.0.0:8080")?,
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", "10")?,
            jwt_secret,
            jwt_access_lifetime_secs: parse_or(&var, "JWT_ACCESS_LIFETIME_SECS", "3600")?,
            jwt_refresh_lifetime_secs: parse_or(&var, "JWT_REFRESH_LIFETIME_SECS", "604800")?,
            admin,
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".into()));
        }
        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".into()));
        }
        if config.jwt_refresh_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_REFRESH_LIFETIME_SECS".into()));
        }

        Ok(config)
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.jwt_access_lifetime_secs, 3600);
        assert_eq!(config.jwt_refresh_lifetime_secs, 604_800);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert!(config.admin.is_none());
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        assert_eq!(
            load(&[("DB_MAX_CONNECTIONS", "lots")]).unwrap_err(),
            ConfigError::InvalidValue("DB_MAX_CONNECTIONS".into())
        );
        assert_eq!(
            load(&[("BIND_ADDR", "nowhere")]).unwrap_err(),
            ConfigError::InvalidValue("BIND_ADDR".into())
        );
        assert_eq!(
            load(&[("JWT_ACCESS_LIFETIME_SECS", "-5")]).unwrap_err(),
            ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".into())
        );
    }

    #[test]
    fn admin_bootstrap_needs_username_and_password() {
        let config = load(&[("ADMIN_USERNAME", "root"), ("ADMIN_PASSWORD", "s3cretpass")]).unwrap();
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "root@localhost.localdomain");

        assert_eq!(
            load(&[("ADMIN_USERNAME", "root")]).unwrap_err(),
            ConfigError::MissingRequired("ADMIN_PASSWORD".into())
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[
            ("JWT_SECRET", "super-secret"),
            ("DATABASE_URL", "postgres://u:pw@db/sweets"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("pw@db"));
    }
}
