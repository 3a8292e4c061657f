use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::ProvidersConfig;
use crate::core::market::{MarketData, MarketDataProvider};
use crate::providers::ratelimit::RateLimiter;
use crate::providers::util::with_retry;

const DEFAULT_ATTOM_URL: &str = "https://api.gateway.attomdata.com";
const DEFAULT_REALTOR_URL: &str = "https://realtor.p.rapidapi.com";
const DEFAULT_REALTOR_HOST: &str = "realtor.p.rapidapi.com";

#[derive(Deserialize, Debug)]
struct AttomResponse {
    #[serde(default)]
    property: Vec<AttomProperty>,
}

#[derive(Deserialize, Debug)]
struct AttomProperty {
    avm: Option<Avm>,
}

#[derive(Deserialize, Debug)]
struct Avm {
    amount: Option<AvmAmount>,
    percentile: Option<AvmPercentile>,
}

#[derive(Deserialize, Debug)]
struct AvmAmount {
    value: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct AvmPercentile {
    forecast: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct RealtorResponse {
    rent: Option<RealtorRent>,
    market: Option<RealtorMarket>,
}

#[derive(Deserialize, Debug)]
struct RealtorRent {
    median: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct RealtorMarket {
    #[serde(rename = "averageDaysOnMarket")]
    average_days_on_market: Option<f64>,
}

#[derive(Debug, Default)]
struct Valuation {
    median_home_price: Option<f64>,
    appreciation_rate: Option<f64>,
}

#[derive(Debug, Default)]
struct RentalMarket {
    median_rent: Option<f64>,
    average_days_on_market: Option<f64>,
}

/// Market statistics from the ATTOM valuation API and the Realtor API.
///
/// Every outbound request waits on the shared [`RateLimiter`] and is retried
/// with exponential backoff.
pub struct MarketApiClient {
    client: reqwest::Client,
    attom_base_url: String,
    attom_api_key: String,
    realtor_base_url: String,
    realtor_host: String,
    realtor_api_key: String,
    limiter: Arc<RateLimiter>,
    retry_attempts: usize,
    retry_delay: Duration,
}

impl MarketApiClient {
    pub fn new(providers: &ProvidersConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let (attom_base_url, attom_key) = providers.attom.as_ref().map_or(
            (DEFAULT_ATTOM_URL.to_string(), None),
            |c| (c.base_url.clone(), c.api_key.clone()),
        );
        let (realtor_base_url, realtor_key) = providers.realtor.as_ref().map_or(
            (DEFAULT_REALTOR_URL.to_string(), None),
            |c| (c.base_url.clone(), c.api_key.clone()),
        );
        let realtor_host = reqwest::Url::parse(&realtor_base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_REALTOR_HOST.to_string());

        let client = reqwest::Client::builder()
            .user_agent("rei/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            attom_base_url: attom_base_url.trim_end_matches('/').to_string(),
            attom_api_key: api_key_or_env(attom_key, "ATTOM_API_KEY"),
            realtor_base_url: realtor_base_url.trim_end_matches('/').to_string(),
            realtor_host,
            realtor_api_key: api_key_or_env(realtor_key, "RAPIDAPI_KEY"),
            limiter,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the default of three attempts starting at a one second delay.
    pub fn with_retry_policy(mut self, attempts: usize, base_delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = base_delay;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, request: impl Fn() -> reqwest::RequestBuilder) -> Result<T> {
        let limiter = &self.limiter;
        let request = &request;
        with_retry(
            move || async move {
                limiter.wait_for_token().await;
                let response = request().send().await?.error_for_status()?;
                Ok(response.json::<T>().await?)
            },
            self.retry_attempts,
            self.retry_delay,
        )
        .await
    }

    async fn fetch_valuation(&self, zip_code: &str) -> Result<Valuation> {
        let url = format!(
            "{}/propertyapi/v1.0.0/avm/detail/{}",
            self.attom_base_url, zip_code
        );
        debug!("Requesting valuation data from {}", url);

        let data: AttomResponse = self
            .get_json(|| {
                self.client
                    .get(&url)
                    .header("apikey", &self.attom_api_key)
                    .header("Accept", "application/json")
            })
            .await
            .with_context(|| format!("Valuation request failed for zip code {zip_code}"))?;

        let avm = data
            .property
            .into_iter()
            .next()
            .and_then(|p| p.avm)
            .ok_or_else(|| anyhow!("No valuation found for zip code: {}", zip_code))?;

        Ok(Valuation {
            median_home_price: avm.amount.and_then(|a| a.value),
            appreciation_rate: avm.percentile.and_then(|p| p.forecast),
        })
    }

    async fn fetch_rental_market(&self, zip_code: &str) -> Result<RentalMarket> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/locations/v2/auto-complete", self.realtor_base_url),
            &[("input", zip_code)],
        )
        .with_context(|| format!("Invalid Realtor base URL: {}", self.realtor_base_url))?;
        debug!("Requesting rental data from {}", url);

        let data: RealtorResponse = self
            .get_json(|| {
                self.client
                    .get(url.clone())
                    .header("x-rapidapi-host", &self.realtor_host)
                    .header("x-rapidapi-key", &self.realtor_api_key)
            })
            .await
            .with_context(|| format!("Rental market request failed for zip code {zip_code}"))?;

        Ok(RentalMarket {
            median_rent: data.rent.and_then(|r| r.median),
            average_days_on_market: data.market.and_then(|m| m.average_days_on_market),
        })
    }
}

fn api_key_or_env(configured: Option<String>, env_var: &str) -> String {
    configured
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_else(|| {
            debug!("No API key configured and {} is not set", env_var);
            String::new()
        })
}

#[async_trait]
impl MarketDataProvider for MarketApiClient {
    #[instrument(
        name = "MarketDataFetch",
        skip(self),
        fields(zip_code = %zip_code)
    )]
    async fn fetch_market_data(&self, zip_code: &str) -> Result<MarketData> {
        let zip_code = zip_code.trim();
        if zip_code.is_empty() {
            return Err(anyhow!("Zip code is required for market data"));
        }

        let (valuation, rental) = tokio::join!(
            self.fetch_valuation(zip_code),
            self.fetch_rental_market(zip_code)
        );

        // One source failing still leaves a useful, explicitly partial record.
        let (valuation, rental) = match (valuation, rental) {
            (Err(valuation_err), Err(rental_err)) => {
                return Err(anyhow!(
                    "Failed to fetch market data for {zip_code}: {valuation_err:#}; {rental_err:#}"
                ));
            }
            (valuation, rental) => (
                valuation.unwrap_or_else(|e| {
                    debug!("Valuation unavailable: {e:#}");
                    Valuation::default()
                }),
                rental.unwrap_or_else(|e| {
                    debug!("Rental market unavailable: {e:#}");
                    RentalMarket::default()
                }),
            ),
        };

        Ok(MarketData::from_figures(
            zip_code,
            valuation.median_home_price,
            rental.median_rent,
            valuation.appreciation_rate,
            rental.average_days_on_market,
        ))
    }
}
