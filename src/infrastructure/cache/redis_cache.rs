//! Redis-backed principal cache.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::Principal;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Redis cache for authenticated principals.
///
/// Entries are JSON strings written with `SET EX`, so Redis handles expiry.
/// All operations are fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "ledger:principal:".to_string(),
        })
    }

    fn build_key(&self, token_hash: &str) -> String {
        format!("{}{}", self.key_prefix, token_hash)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_principal(&self, token_hash: &str) -> CacheResult<Option<Principal>> {
        let key = self.build_key(token_hash);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Principal>(&raw) {
                Ok(principal) => {
                    debug!(member_id = %principal.member_id, "Principal cache hit");
                    Ok(Some(principal))
                }
                Err(e) => {
                    warn!("Discarding malformed cached principal: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Redis GET error: {}", e);
                Ok(None)
            }
        }
    }

    async fn set_principal(
        &self,
        token_hash: &str,
        principal: &Principal,
        ttl: Duration,
    ) -> CacheResult<()> {
        let key = self.build_key(token_hash);
        let raw = serde_json::to_string(principal)
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        let mut conn = self.client.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, raw, ttl.as_secs().max(1))
            .await
        {
            warn!("Redis SET error: {}", e);
        }
        Ok(())
    }

    async fn invalidate(&self, token_hash: &str) -> CacheResult<()> {
        let key = self.build_key(token_hash);
        let mut conn = self.client.clone();

        if let Err(e) = conn.del::<_, i32>(&key).await {
            warn!("Redis DEL error: {}", e);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
