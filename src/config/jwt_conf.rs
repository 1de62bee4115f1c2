use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

const MIN_SECRET_LEN: usize = 32;

/// JWT signing configuration. Access and refresh tokens use separate secrets.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// Access token lifetime in minutes
    pub access_token_expiration: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_expiration: i64,
}

fn read_secret(name: &str) -> Result<String, ConfigError> {
    let secret = env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })?;
    if secret.len() < MIN_SECRET_LEN {
        error!("{} is too short (minimum {} characters required)", name, MIN_SECRET_LEN);
        return Err(ConfigError::InvalidValue(format!(
            "{} must be at least {} characters long",
            name, MIN_SECRET_LEN
        )));
    }
    debug!("{} loaded (length: {} chars)", name, secret.len());
    Ok(secret)
}

fn read_minutes(name: &str, default: i64) -> Result<i64, ConfigError> {
    let value = match env::var(name) {
        Ok(raw) => raw.parse::<i64>().map_err(|e| {
            error!("Invalid {} value: {}", name, e);
            ConfigError::ParseError(format!("{}: {}", name, e))
        })?,
        Err(_) => {
            warn!("{} not set, using default: {} minutes", name, default);
            default
        }
    };
    if value <= 0 {
        return Err(ConfigError::InvalidValue(format!("{} must be greater than 0", name)));
    }
    Ok(value)
}

impl JwtConfig {
    /// Expected environment variables:
    /// - ACCESS_TOKEN_SECRET, REFRESH_TOKEN_SECRET (required, >= 32 chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: minutes, defaults to 15
    /// - JWT_REFRESH_TOKEN_EXPIRY: minutes, defaults to 43200 (30 days)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let config = JwtConfig {
            access_token_secret: read_secret("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: read_secret("REFRESH_TOKEN_SECRET")?,
            access_token_expiration: read_minutes("JWT_ACCESS_TOKEN_EXPIRY", 15)?,
            refresh_token_expiration: read_minutes("JWT_REFRESH_TOKEN_EXPIRY", 43_200)?,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Validating JWT configuration");

        if self.access_token_secret.len() < MIN_SECRET_LEN || self.refresh_token_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ValidationError("JWT secrets must be at least 32 characters long".to_string()));
        }
        if self.access_token_secret == self.refresh_token_secret {
            warn!("Access and refresh tokens share the same secret");
        }
        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Token expirations must be greater than 0".to_string()));
        }
        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            access_token_secret: "test_access_secret_for_jwt_testing_long_enough_for_hs256".to_string(),
            refresh_token_secret: "test_refresh_secret_for_jwt_testing_long_enough_for_hs256".to_string(),
            access_token_expiration: 15,
            refresh_token_expiration: 43_200,
        }
    }
}
