//! Best-effort look-aside cache
//!
//! Shadows the catalog store for recently served entities. Every backend
//! failure is swallowed here: a failed get is a miss, a failed set is a
//! no-op. The store plus the freshness policy remain the authority on
//! staleness, so losing the cache never changes an answer, only its cost.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// TTL for list-type aggregates (states, district lists)
pub const LIST_TTL_SECS: u64 = 86400;

/// TTL for individual district payloads
pub const DETAIL_TTL_SECS: u64 = 3600;

/// Pluggable cache backend. Implementations may fail; callers go through
/// [`LookAsideCache`], which never lets a failure escape.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> anyhow::Result<()>;
}

/// In-process fallback backend used when no external cache is configured.
/// No eviction; TTL is accepted and ignored.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl_secs: u64) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Cache facade with swallow-and-log error semantics
#[derive(Clone)]
pub struct LookAsideCache {
    backend: Arc<dyn CacheBackend>,
}

impl LookAsideCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Cache backed by an in-process map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::default()))
    }

    /// Read a JSON value. Backend errors and unparseable entries are both
    /// treated as misses.
    pub async fn get_json(&self, key: &str) -> Option<Value> {
        match self.backend.get(key).await {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(key, error = %e, "Cache entry unparseable, treating as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(key, error = %e, "Cache get failed (non-fatal)");
                None
            }
        }
    }

    /// Write a JSON value, best effort
    pub async fn set_json(&self, key: &str, value: &Value, ttl_secs: u64) {
        if let Err(e) = self.backend.set(key, value.to_string(), ttl_secs).await {
            debug!(key, error = %e, "Cache set failed (non-fatal)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BrokenCache;

    #[async_trait]
    impl CacheBackend for BrokenCache {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("connection refused")
        }

        async fn set(&self, _key: &str, _value: String, _ttl: u64) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn memory_cache_round_trips() {
        let cache = LookAsideCache::in_memory();
        let value = json!({"district_code": "123"});

        cache.set_json("district:JHARKHAND:RANCHI", &value, DETAIL_TTL_SECS).await;
        assert_eq!(cache.get_json("district:JHARKHAND:RANCHI").await, Some(value));
        assert_eq!(cache.get_json("district:JHARKHAND:GUMLA").await, None);
    }

    #[tokio::test]
    async fn broken_backend_reads_as_miss_and_writes_as_noop() {
        let cache = LookAsideCache::new(Arc::new(BrokenCache));

        cache.set_json("k", &json!(1), DETAIL_TTL_SECS).await;
        assert_eq!(cache.get_json("k").await, None);
    }

    #[tokio::test]
    async fn unparseable_entry_is_a_miss() {
        let backend = Arc::new(MemoryCache::default());
        backend.set("k", "not json".to_string(), 0).await.unwrap();

        let cache = LookAsideCache::new(backend);
        assert_eq!(cache.get_json("k").await, None);
    }
}
