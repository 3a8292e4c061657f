pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::market::MarketData;
use crate::providers::{CachingMarketDataProvider, MarketApiClient, RateLimiter};
use crate::store::MemoryCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Analyze {
        json: bool,
    },
    Scenarios,
    Amortize {
        property: String,
        monthly: bool,
    },
    Market {
        zip_codes: Vec<String>,
        json: bool,
    },
    Quick {
        price: String,
        rent: Option<String>,
        zip_code: Option<String>,
    },
}

impl AppCommand {
    fn needs_properties(&self) -> bool {
        match self {
            AppCommand::Analyze { .. } | AppCommand::Scenarios | AppCommand::Amortize { .. } => {
                true
            }
            AppCommand::Market { zip_codes, .. } => zip_codes.is_empty(),
            AppCommand::Quick { .. } => false,
        }
    }
}

fn load_config(command: &AppCommand, config_path: Option<&str>) -> Result<AppConfig> {
    if let Some(path) = config_path {
        return AppConfig::load_from_path(path);
    }
    let path = AppConfig::default_config_path()?;
    if path.exists() {
        return AppConfig::load();
    }
    if command.needs_properties() {
        anyhow::bail!(
            "No configuration found at {}. Run `rei setup` to create one.",
            path.display()
        );
    }
    debug!("No config at {}, using defaults", path.display());
    Ok(AppConfig::default())
}

/// Wires the HTTP client, shared rate limiter and TTL cache into one provider.
fn market_provider(config: &AppConfig) -> Result<CachingMarketDataProvider<MarketApiClient>> {
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window(),
    ));
    let client = MarketApiClient::new(&config.providers, limiter)?;

    let cache = Arc::new(match config.cache.default_ttl() {
        Some(ttl) => MemoryCache::<String, MarketData>::with_default_ttl(ttl),
        None => MemoryCache::<String, MarketData>::new(),
    });
    cache.spawn_sweeper(config.cache.sweep_interval());
    let cache: Arc<dyn Cache<String, MarketData>> = cache;

    Ok(CachingMarketDataProvider::new(
        client,
        cache,
        Some(config.cache.market_ttl()),
    ))
}

fn configured_zip_codes(config: &AppConfig) -> Vec<String> {
    let mut zip_codes: Vec<String> = Vec::new();
    for zip in config.properties.iter().filter_map(|p| p.zip_code.as_ref()) {
        if !zip_codes.contains(zip) {
            zip_codes.push(zip.clone());
        }
    }
    zip_codes
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("rei starting...");

    let config = load_config(&command, config_path)?;
    debug!("Loaded {} properties", config.properties.len());

    match command {
        AppCommand::Analyze { json } => cli::analyze::run(&config.properties, json),
        AppCommand::Scenarios => cli::scenarios::run(&config.properties),
        AppCommand::Amortize { property, monthly } => {
            cli::amortize::run(&config, &property, monthly)
        }
        AppCommand::Market { zip_codes, json } => {
            let provider = market_provider(&config)?;
            let zip_codes = if zip_codes.is_empty() {
                configured_zip_codes(&config)
            } else {
                zip_codes
            };
            cli::market::run(&provider, &zip_codes, json).await
        }
        AppCommand::Quick {
            price,
            rent,
            zip_code,
        } => {
            let provider = market_provider(&config)?;
            cli::quick::run(&price, rent.as_deref(), zip_code.as_deref(), &provider).await
        }
    }
}
