use crate::core::cache::Cache;
use crate::core::market::{MarketData, MarketDataProvider};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub fn market_cache_key(zip_code: &str) -> String {
    format!("market-data-{}", zip_code.trim())
}

/// Serves market data from a shared cache, falling through to `inner` on a
/// miss. Failed fetches are not cached.
#[derive(Clone)]
pub struct CachingMarketDataProvider<T: MarketDataProvider> {
    inner: T,
    cache: Arc<dyn Cache<String, MarketData>>,
    ttl: Option<Duration>,
}

impl<T: MarketDataProvider> CachingMarketDataProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn Cache<String, MarketData>>, ttl: Option<Duration>) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<T: MarketDataProvider> MarketDataProvider for CachingMarketDataProvider<T> {
    async fn fetch_market_data(&self, zip_code: &str) -> Result<MarketData> {
        let key = market_cache_key(zip_code);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for market data: {}", key);
            return Ok(cached);
        }
        debug!("Cache miss for market data: {}", key);
        let data = self.inner.fetch_market_data(zip_code).await?;
        self.cache.put(key, data.clone(), self.ttl).await;
        Ok(data)
    }
}
