//! Provider and aggregator configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{FxError, FxResult};
use crate::provider::{currency_api, frankfurter, CurrencyApiProvider, FrankfurterProvider, RateProvider};

/// How the aggregator polls its providers on a cache miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// One provider after another, in configuration order.
    #[default]
    Sequential,
    /// All providers at once.
    Concurrent,
}

impl std::str::FromStr for FetchStrategy {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(FetchStrategy::Sequential),
            "concurrent" | "parallel" => Ok(FetchStrategy::Concurrent),
            other => Err(FxError::Config(format!("unknown fetch strategy: {}", other))),
        }
    }
}

/// Configuration for the rate aggregator.
#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    /// Provider polling strategy.
    pub fetch_strategy: FetchStrategy,
    /// Upper bound on a single provider fetch. `None` leaves it to the
    /// provider's own transport timeout.
    pub provider_timeout: Option<Duration>,
}

impl AggregatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> FxResult<Self> {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var("RATEFOLD_FETCH_STRATEGY") {
            config.fetch_strategy = strategy.parse()?;
        }

        if let Ok(secs) = std::env::var("RATEFOLD_PROVIDER_TIMEOUT_SECS") {
            config.provider_timeout = Some(parse_secs("RATEFOLD_PROVIDER_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Provider timeout cannot be zero".to_string());
        }
        Ok(())
    }
}

/// Upstream provider configuration.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// Query the Frankfurter API.
    pub frankfurter_enabled: bool,
    /// Frankfurter base URL.
    pub frankfurter_url: String,
    /// Query the free currency API.
    pub currency_api_enabled: bool,
    /// Free currency API base URL.
    pub currency_api_url: String,
    /// HTTP request timeout for every provider.
    pub request_timeout: Duration,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            frankfurter_enabled: true,
            frankfurter_url: frankfurter::DEFAULT_BASE_URL.to_string(),
            currency_api_enabled: true,
            currency_api_url: currency_api::DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ProvidersConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> FxResult<Self> {
        let mut config = Self::default();

        if let Ok(enabled) = std::env::var("RATEFOLD_FRANKFURTER_ENABLED") {
            config.frankfurter_enabled = parse_flag(&enabled, config.frankfurter_enabled);
        }

        if let Ok(url) = std::env::var("RATEFOLD_FRANKFURTER_URL") {
            config.frankfurter_url = url;
        }

        if let Ok(enabled) = std::env::var("RATEFOLD_CURRENCY_API_ENABLED") {
            config.currency_api_enabled = parse_flag(&enabled, config.currency_api_enabled);
        }

        if let Ok(url) = std::env::var("RATEFOLD_CURRENCY_API_URL") {
            config.currency_api_url = url;
        }

        if let Ok(secs) = std::env::var("RATEFOLD_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("RATEFOLD_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.frankfurter_enabled && !self.currency_api_enabled {
            return Err("At least one rate provider must be enabled".to_string());
        }

        if self.frankfurter_enabled && self.frankfurter_url.trim().is_empty() {
            return Err("Frankfurter URL cannot be empty".to_string());
        }

        if self.currency_api_enabled && self.currency_api_url.trim().is_empty() {
            return Err("Currency API URL cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }

    /// Build the enabled providers in their fixed order.
    pub fn build_providers(&self) -> FxResult<Vec<Arc<dyn RateProvider>>> {
        let mut providers: Vec<Arc<dyn RateProvider>> = Vec::new();

        if self.frankfurter_enabled {
            providers.push(Arc::new(FrankfurterProvider::new(
                self.frankfurter_url.clone(),
                self.request_timeout,
            )?));
        }

        if self.currency_api_enabled {
            providers.push(Arc::new(CurrencyApiProvider::new(
                self.currency_api_url.clone(),
                self.request_timeout,
            )?));
        }

        Ok(providers)
    }
}

/// Parse a whole number of seconds from an environment variable.
fn parse_secs(var: &str, value: &str) -> FxResult<Duration> {
    value
        .trim()
        .parse()
        .map(Duration::from_secs)
        .map_err(|_| FxError::Config(format!("invalid {}: {:?}", var, value)))
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(ProvidersConfig::default().validate().is_ok());
        assert!(AggregatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = ProvidersConfig {
            frankfurter_enabled: false,
            currency_api_enabled: false,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ProvidersConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AggregatorConfig {
            provider_timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_providers_order() {
        let providers = ProvidersConfig::default().build_providers().unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["frankfurter", "freeCurrencyRates"]);

        let config = ProvidersConfig {
            frankfurter_enabled: false,
            ..Default::default()
        };
        assert_eq!(config.build_providers().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_strategy_parse() {
        assert_eq!("Concurrent".parse::<FetchStrategy>().unwrap(), FetchStrategy::Concurrent);
        assert_eq!("sequential".parse::<FetchStrategy>().unwrap(), FetchStrategy::Sequential);
        assert!("random".parse::<FetchStrategy>().is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("RATEFOLD_REQUEST_TIMEOUT_SECS", " 15 ").unwrap(), Duration::from_secs(15));
        assert!(matches!(
            parse_secs("RATEFOLD_REQUEST_TIMEOUT_SECS", "30s"),
            Err(FxError::Config(_))
        ));
        assert!(parse_secs("RATEFOLD_PROVIDER_TIMEOUT_SECS", "-1").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE", false));
        assert!(!parse_flag("off", true));
        assert!(parse_flag("maybe", true));
    }
}
