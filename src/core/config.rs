use crate::core::finance::FinancialInputs;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PropertyConfig {
    pub name: String,
    pub zip_code: Option<String>,
    /// Years held before sale, used for the IRR projection.
    #[serde(default = "default_holding_period")]
    pub holding_period_years: u32,
    #[serde(flatten)]
    pub inputs: FinancialInputs,
}

fn default_holding_period() -> u32 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AttomProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RealtorProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub attom: Option<AttomProviderConfig>,
    pub realtor: Option<RealtorProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            attom: Some(AttomProviderConfig {
                base_url: "https://api.gateway.attomdata.com".to_string(),
                api_key: None,
            }),
            realtor: Some(RealtorProviderConfig {
                base_url: "https://realtor.p.rapidapi.com".to_string(),
                api_key: None,
            }),
        }
    }
}

const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for entries stored without one; `None` keeps them forever.
    pub default_ttl_secs: Option<u64>,
    pub sweep_interval_secs: u64,
    pub market_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            default_ttl_secs: Some(300),
            sweep_interval_secs: 60,
            market_ttl_secs: 60 * 60,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }

    /// Sweep period in seconds, clamped to between one second and one day.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.clamp(1, MAX_SWEEP_INTERVAL_SECS))
    }

    pub fn market_ttl(&self) -> Duration {
        Duration::from_secs(self.market_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub per_milliseconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: 10,
            per_milliseconds: 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.per_milliseconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "rei", "rei")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyConfig> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
properties:
  - name: "Maple Street Duplex"
    zip_code: "12345"
    purchase_price: 300000
    down_payment: 20
    interest_rate: 4.5
    loan_term: 30
    property_tax_rate: 1.2
    insurance_cost: 1200
    maintenance_cost: 200
    vacancy_rate: 5
    monthly_rent: 2500
    property_management_fee: 8
    closing_costs: 5000
    appreciation_rate: 3
  - name: "Oak Condo"
    holding_period_years: 10
    purchase_price: 180000
    down_payment: 25
    interest_rate: 6.75
    loan_term: 15
    monthly_rent: 1600
    hoa_fees: 250
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.properties.len(), 2);

        let duplex = &config.properties[0];
        assert_eq!(duplex.name, "Maple Street Duplex");
        assert_eq!(duplex.zip_code.as_deref(), Some("12345"));
        assert_eq!(duplex.holding_period_years, 5);
        assert_eq!(duplex.inputs.purchase_price, 300000.0);
        assert_eq!(duplex.inputs.loan_term, 30);
        assert_eq!(duplex.inputs.property_management_fee, 8.0);
        assert_eq!(duplex.inputs.hoa_fees, 0.0);

        let condo = &config.properties[1];
        assert!(condo.zip_code.is_none());
        assert_eq!(condo.holding_period_years, 10);
        assert_eq!(condo.inputs.hoa_fees, 250.0);
        assert_eq!(condo.inputs.vacancy_rate, 0.0);
        assert_eq!(condo.inputs.closing_costs, 0.0);

        // Defaults apply when sections are omitted
        assert!(config.providers.attom.is_some());
        assert_eq!(
            config.providers.realtor.as_ref().unwrap().base_url,
            "https://realtor.p.rapidapi.com"
        );
        assert_eq!(config.cache.default_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.cache.market_ttl(), Duration::from_secs(3600));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window(), Duration::from_millis(1000));

        assert!(config.find_property("oak condo").is_some());
        assert!(config.find_property("Pine Cabin").is_none());
    }

    #[test]
    fn test_config_with_providers_and_limits() {
        let yaml_str = r#"
providers:
  attom:
    base_url: "http://example.com/attom"
    api_key: "attom-key"
  realtor:
    base_url: "http://example.com/realtor"
cache:
  default_ttl_secs: null
  market_ttl_secs: 120
rate_limit:
  max_requests: 2
  per_milliseconds: 500
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(config.properties.is_empty());

        let attom = config.providers.attom.unwrap();
        assert_eq!(attom.base_url, "http://example.com/attom");
        assert_eq!(attom.api_key.as_deref(), Some("attom-key"));
        assert!(config.providers.realtor.unwrap().api_key.is_none());

        assert_eq!(config.cache.default_ttl(), None);
        assert_eq!(config.cache.market_ttl(), Duration::from_secs(120));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 2);
        assert_eq!(config.rate_limit.per_milliseconds, 500);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.properties.is_empty());
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_out_of_range_cache_settings_are_usable() {
        let yaml_str = r#"
cache:
  default_ttl_secs: 18446744073709551615
  sweep_interval_secs: 18446744073709551615
  market_ttl_secs: 18446744073709551615
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(86_400));
        assert_eq!(config.cache.market_ttl(), Duration::from_secs(u64::MAX));

        let zero: AppConfig = serde_yaml::from_str("cache:\n  sweep_interval_secs: 0\n").unwrap();
        assert_eq!(zero.cache.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_required_inputs_fail() {
        let yaml_str = r#"
properties:
  - name: "Incomplete"
    purchase_price: 100000
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }
}
