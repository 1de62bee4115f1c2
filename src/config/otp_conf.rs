use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};

use crate::config::ConfigError;

/// One-time password settings for email verification and password reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Number of decimal digits in a code
    pub length: u32,
    /// How long a code stays valid, in seconds
    pub expiration_secs: u64,
}

impl OtpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading OTP configuration from environment variables");

        let length = env::var("OTP_LENGTH")
            .unwrap_or_else(|_| "6".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("Invalid OTP_LENGTH value".to_string()))?;

        let expiration_secs = env::var("OTP_EXPIRATION_SECS")
            .unwrap_or_else(|_| {
                warn!("OTP_EXPIRATION_SECS not set, defaulting to 600 seconds (10 minutes)");
                "600".to_string()
            })
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid OTP_EXPIRATION_SECS value".to_string()))?;
        debug!("OTP length {} expiring after {} seconds", length, expiration_secs);

        let config = OtpConfig { length, expiration_secs };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=9).contains(&self.length) {
            return Err(ConfigError::ValidationError("OTP length must be between 4 and 9 digits".to_string()));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::ValidationError("OTP expiration cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn expiration_millis(&self) -> i64 {
        (self.expiration_secs * 1000) as i64
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        OtpConfig { length: 6, expiration_secs: 600 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_six_digits_ten_minutes() {
        let config = OtpConfig::default();
        assert_eq!(config.length, 6);
        assert_eq!(config.expiration_millis(), 10 * 60 * 1000);
    }

    #[test]
    fn test_validate_length_bounds() {
        let mut config = OtpConfig::default();
        config.length = 3;
        assert!(config.validate().is_err());
        config.length = 10;
        assert!(config.validate().is_err());
    }
}
