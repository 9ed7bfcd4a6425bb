//! Frankfurter provider (ECB reference rates).
//!
//! `GET /latest?base=EUR&symbols=USD,NZD` answers with
//! `{"amount": 1.0, "base": "EUR", "date": "...", "rates": {"USD": 1.08}}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use ratefold_common::{join_symbols, Currency, RateMap, SymbolSet};

use super::http::{build_client, get_json, parse_rate};
use super::RateProvider;
use crate::error::{FxError, FxResult};

/// Provider name used in metrics.
pub const PROVIDER_NAME: &str = "frankfurter";

/// Public Frankfurter endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";

/// Rate provider backed by the Frankfurter API.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    /// Create a provider against `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self, base: &Currency, symbols: &SymbolSet) -> FxResult<RateMap> {
        let joined = join_symbols(symbols);
        let request = self
            .client
            .get(format!("{}/latest", self.base_url))
            .query(&[("base", base.code()), ("symbols", joined.as_str())]);

        let body = get_json(PROVIDER_NAME, request).await?;

        let rates_node = body
            .get("rates")
            .and_then(|v| v.as_object())
            .ok_or_else(|| FxError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                message: "missing \"rates\" object".to_string(),
            })?;

        let mut rates = RateMap::new();
        for symbol in symbols {
            match rates_node.get(symbol.code()) {
                Some(value) => match parse_rate(value) {
                    Some(rate) => {
                        rates.insert(symbol.clone(), rate);
                    }
                    None => warn!(
                        provider = PROVIDER_NAME,
                        symbol = %symbol,
                        value = %value,
                        "Unparseable rate value"
                    ),
                },
                None => debug!(provider = PROVIDER_NAME, symbol = %symbol, "Symbol not quoted"),
            }
        }

        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratefold_common::normalize_symbols;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> FrankfurterProvider {
        FrankfurterProvider::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "EUR"))
            .and(query_param("symbols", "NZD,USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "amount": 1.0,
                "base": "EUR",
                "date": "2024-01-02",
                "rates": {"USD": 1.0812, "NZD": 1.7421}
            })))
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["usd", "nzd"]);
        let rates = provider(&server)
            .fetch(&Currency::eur(), &symbols)
            .await
            .unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[&Currency::usd()], dec!(1.0812));
        assert_eq!(rates[&Currency::nzd()], dec!(1.7421));
    }

    #[tokio::test]
    async fn test_fetch_partial_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "base": "EUR",
                "rates": {"USD": 1.08}
            })))
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["USD", "XYZ"]);
        let rates = provider(&server)
            .fetch(&Currency::eur(), &symbols)
            .await
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert!(rates.contains_key(&Currency::usd()));
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["USD"]);
        let result = provider(&server).fetch(&Currency::new("XXX"), &symbols).await;

        assert!(matches!(result, Err(FxError::HttpStatus { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["USD"]);
        let result = provider(&server).fetch(&Currency::eur(), &symbols).await;

        assert!(matches!(result, Err(FxError::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_fetch_missing_rates_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"base": "EUR"})))
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["USD"]);
        let result = provider(&server).fetch(&Currency::eur(), &symbols).await;

        assert!(matches!(result, Err(FxError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_keeps_full_precision() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base":"EUR","rates":{"USD":1.00000049999999999999}}"#),
            )
            .mount(&server)
            .await;

        let symbols = normalize_symbols(["USD"]);
        let rates = provider(&server)
            .fetch(&Currency::eur(), &symbols)
            .await
            .unwrap();

        let rate = rates[&Currency::usd()];
        assert_eq!(rate, dec!(1.00000049999999999999));
        assert_eq!(crate::average_rate(&[rate]), Some(dec!(1.000000)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let provider = FrankfurterProvider::new(uri, Duration::from_secs(2)).unwrap();
        let symbols = normalize_symbols(["USD"]);

        let result = provider.fetch(&Currency::eur(), &symbols).await;

        assert!(matches!(result, Err(FxError::Transport { .. })));
    }
}
