//! Environment-derived application configuration.
//!
//! Loaded once at process start; the relational-store connection string is
//! the only hard requirement. In debug builds a missing signing secret
//! falls back to an ephemeral value so local runs need no setup.

use std::net::{Ipv4Addr, SocketAddr};

use tracing::warn;
use uuid::Uuid;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `DATABASE_URL` is not set; fatal at startup.
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// `JWT_SECRET` is not set in a release build.
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    /// A numeric variable failed to parse.
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application configuration snapshot.
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Signing secret for bearer credentials.
    pub jwt_secret: String,
    /// Maximum connections in the database pool.
    pub pool_size: u32,
    /// Admin account to ensure at startup, when configured.
    pub seed_admin: Option<SeedAdmin>,
}

/// Startup admin-seed parameters.
pub struct SeedAdmin {
    /// Login email for the seeded account.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                warn!("JWT_SECRET not set, using an ephemeral dev secret");
                format!("dev-secret-{}", Uuid::new_v4())
            }
            _ => return Err(ConfigError::MissingJwtSecret),
        };

        let port = parse_env_number("PORT", DEFAULT_PORT)?;
        let pool_size = parse_env_number("DB_POOL_SIZE", DEFAULT_POOL_SIZE)?;

        let seed_admin = match (
            std::env::var("SEED_ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
            std::env::var("SEED_ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            _ => {
                warn!("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must both be set, skipping seed");
                None
            }
        };

        Ok(Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            database_url,
            jwt_secret,
            pool_size,
            seed_admin,
        })
    }
}

fn parse_env_number<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name,
            value,
        }),
        Err(_) => Ok(default),
    }
}
