//! Free currency API provider (fawazahmed0 currency-api on jsDelivr).
//!
//! `GET /eur.json` answers with rates nested under the lowercase base:
//! `{"date": "...", "eur": {"usd": 1.08, "nzd": 1.6}}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use ratefold_common::{Currency, RateMap, SymbolSet};

use super::http::{build_client, get_json, parse_rate};
use super::RateProvider;
use crate::error::{FxError, FxResult};

/// Provider name used in metrics.
pub const PROVIDER_NAME: &str = "freeCurrencyRates";

/// Public CDN endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies";

/// Rate provider backed by the free currency API.
pub struct CurrencyApiProvider {
    client: Client,
    base_url: String,
}

impl CurrencyApiProvider {
    /// Create a provider against `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self, base: &Currency, symbols: &SymbolSet) -> FxResult<RateMap> {
        let base_key = base.to_lowercase();
        let request = self
            .client
            .get(format!("{}/{}.json", self.base_url, base_key));

        let body = get_json(PROVIDER_NAME, request).await?;

        let rates_node = body
            .get(&base_key)
            .and_then(|v| v.as_object())
            .ok_or_else(|| FxError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                message: format!("missing \"{}\" object", base_key),
            })?;

        let mut rates = RateMap::new();
        for symbol in symbols {
            let Some(value) = rates_node.get(&symbol.to_lowercase()) else {
                debug!(provider = PROVIDER_NAME, symbol = %symbol, "Symbol not quoted");
                continue;
            };
            match parse_rate(value) {
                Some(rate) => {
                    rates.insert(symbol.clone(), rate);
                }
                None => warn!(
                    provider = PROVIDER_NAME,
                    symbol = %symbol,
                    value = %value,
                    "Unparseable rate value"
                ),
            }
        }

        Ok(rates)
    }
}
