use crate::core::cache::{Cache, CacheStats};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Bounds applied to the background sweep period.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheValue<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < now)
    }
}

type Entries<K, V> = Arc<Mutex<HashMap<K, CacheValue<V>>>>;

/// In-memory TTL cache guarded by a single async mutex.
///
/// Expired entries are dropped lazily on read and, if a sweeper has been
/// spawned, periodically in the background.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Entries<K, V>,
    default_ttl: Option<Duration>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries never expire unless given a TTL
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            default_ttl: None,
        }
    }

    /// Creates a cache that applies `ttl` to entries stored without one
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            default_ttl: Some(ttl),
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let mut cache = self.inner.lock().await;
        purge_expired(&mut cache, Instant::now())
    }

    /// Spawns a background task that sweeps every `period`, clamped to
    /// between one millisecond and one day.
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped. Must be called from within a tokio runtime.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let entries: Weak<Mutex<HashMap<K, CacheValue<V>>>> = Arc::downgrade(&self.inner);
        let period = period.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(entries) = entries.upgrade() else {
                    debug!("Cache dropped, stopping sweeper");
                    break;
                };
                let removed = purge_expired(&mut *entries.lock().await, Instant::now());
                if removed > 0 {
                    debug!("Cache SWEEP removed {} entries", removed);
                }
            }
        })
    }
}

fn purge_expired<K: Eq + Hash, V>(cache: &mut HashMap<K, CacheValue<V>>, now: Instant) -> usize {
    let before = cache.len();
    cache.retain(|_, entry| !entry.is_expired(now));
    before - cache.len()
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        // A TTL past the end of the clock means the entry never expires.
        let expires_at = ttl
            .or(self.default_ttl)
            .and_then(|duration| Instant::now().checked_add(duration));
        let cache_value = CacheValue { value, expires_at };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, cache_value);
    }

    async fn contains(&self, key: &K) -> bool {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                cache.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }

    async fn stats(&self) -> CacheStats<K> {
        let cache = self.inner.lock().await;
        CacheStats {
            size: cache.len(),
            keys: cache.keys().cloned().collect(),
        }
    }
}
