//! In-process principal cache with explicit expiry sweeps.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::Principal;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

struct Entry {
    principal: Principal,
    expires_at: Instant,
}

/// Principal cache held in process memory.
///
/// Reads ignore expired entries. [`MemoryCache::sweep`] removes them, and
/// [`MemoryCache::spawn_sweeper`] runs it on an interval.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired entries and returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Sweeps every `interval` until the cache is dropped.
    pub fn spawn_sweeper(cache: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(cache);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let removed = cache.sweep().await;
                if removed > 0 {
                    debug!(removed, "Swept expired principals");
                }
            }
        })
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_principal(&self, token_hash: &str) -> CacheResult<Option<Principal>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(token_hash)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.principal.clone()))
    }

    async fn set_principal(
        &self,
        token_hash: &str,
        principal: &Principal,
        ttl: Duration,
    ) -> CacheResult<()> {
        self.entries.write().await.insert(
            token_hash.to_string(),
            Entry {
                principal: principal.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, token_hash: &str) -> CacheResult<()> {
        self.entries.write().await.remove(token_hash);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            member_id: "20181681".to_string(),
            fee_manager: true,
        }
    }

    #[tokio::test]
    async fn test_hit_then_invalidate() {
        let cache = MemoryCache::new();
        cache
            .set_principal("hash", &principal(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get_principal("hash").await.unwrap(), Some(principal()));

        cache.invalidate("hash").await.unwrap();
        assert_eq!(cache.get_principal("hash").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_miss_and_get_swept() {
        let cache = MemoryCache::new();
        cache
            .set_principal("short", &principal(), Duration::from_secs(5))
            .await
            .unwrap();
        cache
            .set_principal("long", &principal(), Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(cache.get_principal("short").await.unwrap(), None);
        assert_eq!(cache.len().await, 2);

        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get_principal("long").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set_principal("hash", &principal(), Duration::from_secs(1))
            .await
            .unwrap();

        let handle = MemoryCache::spawn_sweeper(&cache, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;

        assert!(cache.is_empty().await);
        handle.abort();
    }
}
