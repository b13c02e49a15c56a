//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Allowed CORS origins; empty means any origin.
    pub cors_origins: Vec<HeaderValue>,
    /// bcrypt cost for new passwords.
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CHATBOT_API_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:chatbot.db?mode=rwc` |
    /// | `DATABASE_POOL_SIZE` | Connection pool size | `20` |
    /// | `CORS_ALLOW_ORIGIN` | Comma-separated allowed origins | any |
    /// | `BCRYPT_COST` | Password hashing cost | `12` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CHATBOT_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:chatbot.db?mode=rwc".to_string());

        let pool_size = match env::var("DATABASE_POOL_SIZE") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize)?,
            Err(_) => database::Database::DEFAULT_POOL_SIZE,
        };

        let cors_origins = match env::var("CORS_ALLOW_ORIGIN") {
            Ok(value) => parse_origins(&value)?,
            Err(_) => Vec::new(),
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or(ConfigError::InvalidBcryptCost)?,
            Err(_) => 12,
        };

        Ok(Self {
            addr,
            database_url,
            pool_size,
            cors_origins,
            bcrypt_cost,
        })
    }
}

/// Parse a comma-separated origin list. `*` or an empty value allows any origin.
fn parse_origins(value: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let mut origins = Vec::new();
    for origin in value.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if origin == "*" {
            return Ok(Vec::new());
        }
        let header = HeaderValue::from_str(origin)
            .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))?;
        origins.push(header);
    }
    Ok(origins)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CHATBOT_API_ADDR format")]
    InvalidAddr,

    #[error("DATABASE_POOL_SIZE must be a positive integer")]
    InvalidPoolSize,

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("BCRYPT_COST must be between 4 and 31")]
    InvalidBcryptCost,
}
