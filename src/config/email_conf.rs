use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// SMTP settings for OTP and order-update mail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Whether to use TLS encryption
    pub use_tls: bool,
    /// STARTTLS upgrade instead of implicit TLS
    pub use_starttls: bool,
    pub from_email: String,
    /// Display name in the From header
    pub from_name: String,
    pub connection_timeout_secs: u64,
    /// Storefront base URL, used for "View Order" links
    pub frontend_url: String,
}

impl EmailConfig {
    /// Expected environment variables:
    /// - SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD (required)
    /// - SMTP_PORT (defaults to 587)
    /// - SMTP_USE_TLS / SMTP_USE_STARTTLS (default true)
    /// - SMTP_FROM_EMAIL (defaults to SMTP_USERNAME)
    /// - SMTP_FROM_NAME (defaults to "Lume Atelier")
    /// - SMTP_CONNECTION_TIMEOUT (seconds, defaults to 30)
    /// - FRONTEND_URL (defaults to "#")
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| {
                error!("SMTP_HOST environment variable not found");
                ConfigError::EnvVarNotFound("SMTP_HOST".to_string())
            })?;
        debug!("SMTP host: {}", smtp_host);

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| {
                warn!("SMTP_PORT not set, defaulting to 587");
                "587".to_string()
            })
            .parse::<u16>()
            .map_err(|_| {
                error!("Invalid SMTP_PORT value");
                ConfigError::InvalidValue("Invalid SMTP_PORT value".to_string())
            })?;

        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| {
                error!("SMTP_USERNAME environment variable not found");
                ConfigError::EnvVarNotFound("SMTP_USERNAME".to_string())
            })?;

        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| {
                error!("SMTP_PASSWORD environment variable not found");
                ConfigError::EnvVarNotFound("SMTP_PASSWORD".to_string())
            })?;
        debug!("SMTP password: [REDACTED]");

        let use_tls = env::var("SMTP_USE_TLS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);
        let use_starttls = env::var("SMTP_USE_STARTTLS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let from_email = env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| {
            warn!("SMTP_FROM_EMAIL not set, using SMTP_USERNAME");
            smtp_username.clone()
        });

        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Lume Atelier".to_string());

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| {
            warn!("FRONTEND_URL not set, order emails will link to '#'");
            "#".to_string()
        });

        let config = EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            use_tls,
            use_starttls,
            from_email,
            from_name,
            connection_timeout_secs,
            frontend_url,
        };

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "test@example.com".to_string(),
            from_name: "Lume Test".to_string(),
            connection_timeout_secs: 10,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }
        if self.from_email.is_empty() || !self.from_email.contains('@') {
            error!("Invalid from email format");
            return Err(ConfigError::ValidationError("Invalid from email format".to_string()));
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }
        Ok(())
    }

    /// Link to the customer's profile page, where orders are listed.
    pub fn profile_url(&self) -> String {
        format!("{}/profile", self.frontend_url.trim_end_matches('/'))
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            use_tls: true,
            use_starttls: true,
            from_email: "noreply@lume.example".to_string(),
            from_name: "Lume Atelier".to_string(),
            connection_timeout_secs: 30,
            frontend_url: "#".to_string(),
        }
    }
}
