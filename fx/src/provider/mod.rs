//! Rate provider traits and implementations.
//!
//! Each provider wraps one upstream source and turns its payload into a
//! [`RateMap`]. The aggregator only sees the trait.

mod http;

pub mod currency_api;
pub mod frankfurter;

pub use currency_api::CurrencyApiProvider;
pub use frankfurter::FrankfurterProvider;

use async_trait::async_trait;
use ratefold_common::{Currency, RateMap, SymbolSet};

use crate::error::FxResult;

/// Trait for FX rate providers.
///
/// Implementations must report every transport or parsing failure as an
/// `Err` rather than swallowing it, so the aggregator can count it. A
/// response that simply lacks some symbols is a successful partial result.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable provider name, used as the metrics key.
    fn name(&self) -> &str;

    /// Fetch rates for `base` against `symbols`.
    ///
    /// Returned keys are uppercase codes; values are parsed from the
    /// upstream's textual representation.
    async fn fetch(&self, base: &Currency, symbols: &SymbolSet) -> FxResult<RateMap>;
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: dashmap::DashMap<Currency, rust_decimal::Decimal>,
    failing: std::sync::atomic::AtomicBool,
    delay: Option<std::time::Duration>,
    calls: std::sync::atomic::AtomicU64,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
            delay: None,
            calls: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Builder form of [`set_rate`](Self::set_rate).
    pub fn with_rate(self, symbol: &str, rate: rust_decimal::Decimal) -> Self {
        self.set_rate(symbol, rate);
        self
    }

    /// Make every fetch fail.
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set a rate for a symbol. The mock answers with every rate it holds,
    /// requested or not.
    pub fn set_rate(&self, symbol: &str, rate: rust_decimal::Decimal) {
        self.rates.insert(Currency::new(symbol), rate);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetches received.
    pub fn calls(&self) -> u64 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _base: &Currency, _symbols: &SymbolSet) -> FxResult<RateMap> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::error::FxError::ProviderError(format!(
                "{} is unavailable",
                self.name
            )));
        }

        Ok(self
            .rates
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratefold_common::normalize_symbols;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test").with_rate("usd", dec!(1.08));
        let symbols = normalize_symbols(["USD"]);

        let rates = provider.fetch(&Currency::eur(), &symbols).await.unwrap();

        assert_eq!(provider.name(), "test");
        assert_eq!(rates.get(&Currency::usd()), Some(&dec!(1.08)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockRateProvider::new("broken").failing();
        let symbols = normalize_symbols(["USD"]);

        let result = provider.fetch(&Currency::eur(), &symbols).await;

        tokio_test::assert_err!(result);
        assert_eq!(provider.calls(), 1);
    }
}
