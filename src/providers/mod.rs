pub mod caching;
pub mod market_api;
pub mod ratelimit;
pub mod util;

pub use caching::CachingMarketDataProvider;
pub use market_api::MarketApiClient;
pub use ratelimit::RateLimiter;
