//! Market statistics for a location and the provider seam that supplies them.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market statistics for one zip code. Every upstream figure is optional:
/// sources regularly omit fields and a missing value must not masquerade as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub zip_code: String,
    pub median_home_price: Option<f64>,
    pub median_rent: Option<f64>,
    pub price_to_rent_ratio: Option<f64>,
    /// Forecast annual appreciation, in percent.
    pub appreciation_rate: Option<f64>,
    pub average_days_on_market: Option<f64>,
    /// 0-100 composite of demand and price growth.
    pub market_score: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketData {
    /// Assembles a record from raw figures, filling in the derived fields.
    pub fn from_figures(
        zip_code: &str,
        median_home_price: Option<f64>,
        median_rent: Option<f64>,
        appreciation_rate: Option<f64>,
        average_days_on_market: Option<f64>,
    ) -> Self {
        let price_to_rent_ratio = match (median_home_price, median_rent) {
            (Some(price), Some(rent)) => price_to_rent_ratio(price, rent),
            _ => None,
        };
        let market_score = match (average_days_on_market, appreciation_rate) {
            (Some(days), Some(growth)) => Some(market_score(days, growth)),
            _ => None,
        };
        Self {
            zip_code: zip_code.to_string(),
            median_home_price,
            median_rent,
            price_to_rent_ratio,
            appreciation_rate,
            average_days_on_market,
            market_score,
            fetched_at: Utc::now(),
        }
    }
}

/// Home price over a year of rent.
pub fn price_to_rent_ratio(median_home_price: f64, median_rent: f64) -> Option<f64> {
    (median_home_price > 0.0 && median_rent > 0.0).then(|| median_home_price / (median_rent * 12.0))
}

/// Fast-selling markets and strong price growth both push the score up.
pub fn market_score(average_days_on_market: f64, appreciation_forecast: f64) -> f64 {
    let demand = (100.0 - average_days_on_market).max(0.0);
    let appreciation = appreciation_forecast * 20.0;
    ((demand + appreciation) / 2.0).min(100.0)
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_market_data(&self, zip_code: &str) -> Result<MarketData>;
}
