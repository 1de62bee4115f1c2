use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Optional Redis backing for the refresh-token store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u8,
    pub use_tls: bool,
    /// Prefix for refresh-token keys
    pub key_prefix: String,
}

impl RedisConfig {
    /// Returns `Ok(None)` when REDIS_HOST is unset; sessions then stay in process memory.
    ///
    /// Expected environment variables:
    /// - REDIS_HOST: Redis server host
    /// - REDIS_PORT: defaults to 6379
    /// - REDIS_USERNAME / REDIS_PASSWORD: optional
    /// - REDIS_DATABASE: defaults to 0
    /// - REDIS_USE_TLS: defaults to false
    /// - REDIS_SESSION_PREFIX: defaults to "refresh_token:"
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let host = match env::var("REDIS_HOST") {
            Ok(host) => host,
            Err(_) => {
                info!("REDIS_HOST not set, refresh tokens will be kept in memory");
                return Ok(None);
            }
        };
        info!("Loading Redis configuration from environment variables");

        let port = env::var("REDIS_PORT")
            .unwrap_or_else(|_| {
                warn!("REDIS_PORT not set, using default: 6379");
                "6379".to_string()
            })
            .parse()
            .map_err(|e| {
                error!("Invalid REDIS_PORT value: {}", e);
                ConfigError::ParseError(format!("Invalid port: {}", e))
            })?;

        let username = env::var("REDIS_USERNAME").ok();
        let password = env::var("REDIS_PASSWORD").ok();

        let database = env::var("REDIS_DATABASE")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|e| ConfigError::ParseError(format!("Invalid database: {}", e)))?;

        let use_tls = env::var("REDIS_USE_TLS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        let key_prefix = env::var("REDIS_SESSION_PREFIX").unwrap_or_else(|_| "refresh_token:".to_string());
        debug!("Redis {}:{} db {} prefix {}", host, port, database, key_prefix);

        let config = RedisConfig { host, port, username, password, database, use_tls, key_prefix };
        config.validate()?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError("Host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError("Port cannot be 0".to_string()));
        }
        if self.database > 15 {
            return Err(ConfigError::ValidationError("Database number must be between 0 and 15".to_string()));
        }
        if self.key_prefix.is_empty() {
            return Err(ConfigError::ValidationError("Session key prefix cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn get_connection_url(&self) -> String {
        let protocol = if self.use_tls { "rediss" } else { "redis" };

        let auth_part = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };

        format!("{}://{}{}:{}/{}", protocol, auth_part, self.host, self.port, self.database)
    }

    pub fn session_key(&self, token_id: &str) -> String {
        format!("{}{}", self.key_prefix, token_id)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            use_tls: false,
            key_prefix: "refresh_token:".to_string(),
        }
    }
}
