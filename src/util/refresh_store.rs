use async_trait::async_trait;
use dashmap::DashSet;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info, instrument};

use crate::config::RedisConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Operation error: {0}")]
    OperationError(String),
}

/// The set of refresh tokens currently allowed to mint access tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn add(&self, token: &str) -> Result<(), SessionStoreError>;
    async fn contains(&self, token: &str) -> Result<bool, SessionStoreError>;
    /// Removing an unknown token is not an error.
    async fn remove(&self, token: &str) -> Result<(), SessionStoreError>;
}

/// Process-local store; every session is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: DashSet<String>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn add(&self, token: &str) -> Result<(), SessionStoreError> {
        self.tokens.insert(token.to_string());
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, SessionStoreError> {
        Ok(self.tokens.contains(token))
    }

    async fn remove(&self, token: &str) -> Result<(), SessionStoreError> {
        self.tokens.remove(token);
        Ok(())
    }
}

/// Redis-backed store; entries expire together with the refresh token itself.
#[derive(Clone)]
pub struct RedisRefreshTokenStore {
    connection_manager: ConnectionManager,
    config: RedisConfig,
    ttl_secs: u64,
}

impl RedisRefreshTokenStore {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig, ttl_secs: u64) -> Result<Self, SessionStoreError> {
        info!("Initializing Redis refresh-token store");

        config.validate().map_err(|e| {
            error!("Redis configuration validation failed: {}", e);
            SessionStoreError::ConfigError(e.to_string())
        })?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            SessionStoreError::ConnectionError(format!("Client creation failed: {}", e))
        })?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            SessionStoreError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let store = Self { connection_manager, config, ttl_secs };
        store.ping().await?;

        info!("Redis refresh-token store ready");
        Ok(store)
    }

    async fn ping(&self) -> Result<(), SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        let result: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!("Redis ping failed: {}", e);
            SessionStoreError::OperationError(format!("Ping failed: {}", e))
        })?;
        if result == "PONG" {
            Ok(())
        } else {
            Err(SessionStoreError::OperationError(format!("Unexpected ping response: {}", result)))
        }
    }
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn add(&self, token: &str) -> Result<(), SessionStoreError> {
        let key = self.config.session_key(token);
        let mut conn = self.connection_manager.clone();
        let _: () = redis::cmd("SETEX")
            .arg(&key)
            .arg(self.ttl_secs)
            .arg(1)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Failed to store refresh token: {}", e);
                SessionStoreError::OperationError(format!("Setex operation failed: {}", e))
            })?;
        debug!("Refresh token stored with TTL {}s", self.ttl_secs);
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        conn.exists(self.config.session_key(token)).await.map_err(|e| {
            error!("Failed to look up refresh token: {}", e);
            SessionStoreError::OperationError(format!("Exists operation failed: {}", e))
        })
    }

    async fn remove(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        let deleted: u64 = conn.del(self.config.session_key(token)).await.map_err(|e| {
            error!("Failed to delete refresh token: {}", e);
            SessionStoreError::OperationError(format!("Delete operation failed: {}", e))
        })?;
        debug!("Refresh token removed ({} keys)", deleted);
        Ok(())
    }
}
