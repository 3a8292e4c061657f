//! Cache abstractions

use async_trait::async_trait;
use std::time::Duration;

/// Point-in-time view of a cache, for introspection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats<K> {
    pub size: usize,
    pub keys: Vec<K>,
}

#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Returns the value if present and unexpired. An expired entry is
    /// removed as a side effect.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`, replacing any existing entry. `ttl` of `None` falls
    /// back to the cache's default TTL, if it has one.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    /// Same expiry semantics as [`Cache::get`] without cloning the value.
    async fn contains(&self, key: &K) -> bool;

    async fn remove(&self, key: &K);

    async fn clear(&self);

    async fn stats(&self) -> CacheStats<K>;
}
