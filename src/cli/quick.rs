use super::{analyze, ui};
use crate::core::config::PropertyConfig;
use crate::core::listing::{estimate_inputs, parse_listing_amount};
use crate::core::market::MarketDataProvider;
use anyhow::{Result, anyhow};
use tracing::debug;

const QUICK_HOLDING_PERIOD: u32 = 5;

/// Builds a property from listing figures, filling gaps from market data
/// when a zip code is given.
pub async fn estimate_property(
    price: &str,
    rent: Option<&str>,
    zip_code: Option<&str>,
    provider: &dyn MarketDataProvider,
) -> Result<PropertyConfig> {
    let purchase_price = parse_listing_amount(price)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| anyhow!("Could not read a listing price from '{}'", price))?;
    let mut rent_estimate = rent
        .map(|r| {
            parse_listing_amount(r)
                .ok_or_else(|| anyhow!("Could not read a monthly rent from '{}'", r))
        })
        .transpose()?;
    let mut market_appreciation = None;

    if let Some(zip) = zip_code {
        match provider.fetch_market_data(zip).await {
            Ok(market) => {
                if rent_estimate.is_none() {
                    rent_estimate = market.median_rent;
                }
                market_appreciation = market.appreciation_rate;
            }
            Err(e) => {
                debug!("Falling back to default assumptions for {}: {:#}", zip, e);
            }
        }
    }

    let mut inputs = estimate_inputs(purchase_price, rent_estimate);
    if let Some(appreciation) = market_appreciation {
        inputs.appreciation_rate = appreciation;
    }

    Ok(PropertyConfig {
        name: format!("Listing at {}", ui::format_currency(purchase_price)),
        zip_code: zip_code.map(str::to_string),
        holding_period_years: QUICK_HOLDING_PERIOD,
        inputs,
    })
}

pub async fn run(
    price: &str,
    rent: Option<&str>,
    zip_code: Option<&str>,
    provider: &dyn MarketDataProvider,
) -> Result<()> {
    let property = estimate_property(price, rent, zip_code, provider).await?;
    let report = analyze::analyze_property(&property)?;
    println!("{}", report.display_as_table());
    println!(
        "{}",
        ui::style_text(
            "Estimated with 20% down, 7% over 30 years, 8% vacancy and 10% management",
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::listing::DEFAULT_APPRECIATION_RATE;
    use crate::core::market::MarketData;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        async fn fetch_market_data(&self, zip_code: &str) -> Result<MarketData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match zip_code {
                "12345" => Ok(MarketData::from_figures(
                    zip_code,
                    Some(300_000.0),
                    Some(2100.0),
                    Some(4.5),
                    Some(30.0),
                )),
                _ => Err(anyhow!("Market data unavailable")),
            }
        }
    }

    #[tokio::test]
    async fn test_defaults_without_zip() {
        let provider = FixedProvider::new();
        let property = estimate_property("$250,000", None, None, &provider)
            .await
            .unwrap();

        assert_eq!(property.inputs.purchase_price, 250_000.0);
        assert_eq!(property.inputs.monthly_rent, 2500.0);
        assert_eq!(property.inputs.appreciation_rate, DEFAULT_APPRECIATION_RATE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_market_rent_and_appreciation_replace_defaults() {
        let provider = FixedProvider::new();
        let property = estimate_property("250000", None, Some("12345"), &provider)
            .await
            .unwrap();

        assert_eq!(property.inputs.monthly_rent, 2100.0);
        assert_eq!(property.inputs.appreciation_rate, 4.5);
        assert_eq!(property.zip_code.as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_listed_rent_wins_over_market() {
        let provider = FixedProvider::new();
        let property = estimate_property("250000", Some("$1,900/mo"), Some("12345"), &provider)
            .await
            .unwrap();

        assert_eq!(property.inputs.monthly_rent, 1900.0);
        assert_eq!(property.inputs.appreciation_rate, 4.5);
    }

    #[tokio::test]
    async fn test_market_failure_falls_back_to_defaults() {
        let provider = FixedProvider::new();
        let property = estimate_property("250000", None, Some("99999"), &provider)
            .await
            .unwrap();

        assert_eq!(property.inputs.monthly_rent, 2500.0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreadable_price() {
        let provider = FixedProvider::new();
        assert!(estimate_property("call for price", None, None, &provider).await.is_err());
        assert!(estimate_property("$0", None, None, &provider).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_rent_is_rejected() {
        let provider = FixedProvider::new();
        let result =
            estimate_property("250000", Some("ask agent"), Some("12345"), &provider).await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("monthly rent"), "{message}");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
