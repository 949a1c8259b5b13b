//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::Principal;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache of authenticated principals keyed by token hash.
///
/// Implementations must be thread-safe and fail open: a broken cache degrades
/// to a repository lookup on every request, never to a rejected request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map with expiry sweeps
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up the principal for a token hash.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(principal))` on cache hit
    /// - `Ok(None)` on cache miss, expiry or error
    async fn get_principal(&self, token_hash: &str) -> CacheResult<Option<Principal>>;

    /// Stores a principal for `ttl`.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations log and return `Ok(())`.
    async fn set_principal(
        &self,
        token_hash: &str,
        principal: &Principal,
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Drops a cached principal, used when a token is revoked.
    async fn invalidate(&self, token_hash: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name for health reports.
    fn backend(&self) -> &'static str;
}
