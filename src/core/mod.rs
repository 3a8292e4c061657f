//! Core business logic abstractions

pub mod amortization;
pub mod cache;
pub mod config;
pub mod finance;
pub mod irr;
pub mod listing;
pub mod log;
pub mod market;
pub mod scenario;

// Re-export main types for cleaner imports
pub use cache::{Cache, CacheStats};
pub use finance::{FinanceError, FinancialInputs, FinancialMetrics};
pub use market::{MarketData, MarketDataProvider};
