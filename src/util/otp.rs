use rand::Rng;
use tracing::debug;

use crate::config::OtpConfig;

/// Issues numeric one-time passwords and checks them against what was stored.
#[derive(Debug, Clone)]
pub struct OtpUtils {
    config: OtpConfig,
}

/// A freshly issued code and the Unix millis at which it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_at: i64,
}

impl OtpUtils {
    pub fn new(config: OtpConfig) -> Self {
        OtpUtils { config }
    }

    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Uniform over the codes of exactly `length` digits, never with a leading zero.
    pub fn generate(&self) -> IssuedOtp {
        let low = 10u64.pow(self.config.length - 1);
        let high = 10u64.pow(self.config.length);
        let code = rand::thread_rng().gen_range(low..high).to_string();
        IssuedOtp {
            code,
            expires_at: Self::now_millis() + self.config.expiration_millis(),
        }
    }

    pub fn verify(stored: Option<&str>, expires_at: Option<i64>, provided: &str, now_millis: i64) -> bool {
        match (stored, expires_at) {
            (Some(code), Some(expiry)) => {
                let matches = code == provided;
                let fresh = expiry >= now_millis;
                debug!("OTP check: matches={} fresh={}", matches, fresh);
                matches && fresh
            }
            _ => false,
        }
    }
}
