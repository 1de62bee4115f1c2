use std::env;
use serde::{Serialize, Deserialize};
use crate::config::ConfigError;

/// Credentials for the admin account created on first boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = AdminUserConfig {
            username: env::var("ADMIN_USERNAME").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_USERNAME".to_string()))?,
            email: env::var("ADMIN_EMAIL").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string()))?,
            password: env::var("ADMIN_PASSWORD").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::ValidationError("ADMIN_USERNAME cannot be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ConfigError::ValidationError("ADMIN_EMAIL is not a valid email".to_string()));
        }
        if self.password.len() < 6 {
            return Err(ConfigError::ValidationError("ADMIN_PASSWORD must be at least 6 characters".to_string()));
        }
        Ok(())
    }
}
