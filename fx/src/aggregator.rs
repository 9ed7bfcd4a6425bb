//! Multi-provider rate aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use ratefold_common::{
    normalize_symbols, CacheKey, Currency, RateMap, RatesResult, RATE_SCALE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, instrument, warn};

use crate::cache::{RateCache, SharedRateCache};
use crate::config::{AggregatorConfig, FetchStrategy};
use crate::error::FxError;
use crate::metrics::{MetricsRecorder, MetricsSnapshot, SharedMetrics};
use crate::provider::RateProvider;

/// Combines every configured provider into one consensus rate per symbol.
///
/// One instance per process; handlers share it behind an `Arc`.
pub struct RateAggregator {
    providers: Vec<Arc<dyn RateProvider>>,
    cache: SharedRateCache,
    metrics: SharedMetrics,
    config: AggregatorConfig,
}

impl RateAggregator {
    /// Create an aggregator with its own cache and metrics.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, config: AggregatorConfig) -> Self {
        Self::with_shared(
            providers,
            Arc::new(RateCache::new()),
            Arc::new(MetricsRecorder::new()),
            config,
        )
    }

    /// Create an aggregator over an existing cache and metrics recorder.
    pub fn with_shared(
        providers: Vec<Arc<dyn RateProvider>>,
        cache: SharedRateCache,
        metrics: SharedMetrics,
        config: AggregatorConfig,
    ) -> Self {
        info!(
            providers = providers.len(),
            strategy = ?config.fetch_strategy,
            "Initialized rate aggregator"
        );
        Self {
            providers,
            cache,
            metrics,
            config,
        }
    }

    /// Get consensus rates for `base` against `symbols`.
    ///
    /// Inputs are normalized before the cache lookup. Provider failures are
    /// counted and skipped; symbols nobody quoted are left out of the result.
    #[instrument(skip(self, symbols))]
    pub async fn get_exchange_rates<I, S>(&self, base: &str, symbols: I) -> RatesResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = CacheKey::new(Currency::new(base), normalize_symbols(symbols));
        self.get_rates(key).await
    }

    /// Same as [`get_exchange_rates`](Self::get_exchange_rates) for an
    /// already built key.
    pub async fn get_rates(&self, key: CacheKey) -> RatesResult {
        if let Some(cached) = self.cache.get(&key) {
            self.metrics.increment_total_queries();
            return cached;
        }

        if key.symbols().is_empty() {
            warn!(key = %key, "No symbols requested");
            self.metrics.increment_total_queries();
            return RatesResult::empty(key.base().clone());
        }

        info!(key = %key, "Cache miss, fetching from providers");

        let mut collected: BTreeMap<Currency, Vec<Decimal>> = key
            .symbols()
            .iter()
            .map(|symbol| (symbol.clone(), Vec::new()))
            .collect();

        for rates in self.fetch_all(&key).await.into_iter().flatten() {
            for (symbol, value) in rates {
                if let Some(values) = collected.get_mut(&symbol) {
                    values.push(value);
                }
            }
        }

        let mut rates = RateMap::new();
        for (symbol, values) in collected {
            if values.is_empty() {
                warn!(symbol = %symbol, "No rates found for symbol");
                continue;
            }
            match average_rate(&values) {
                Some(average) => {
                    rates.insert(symbol, average);
                }
                None => warn!(symbol = %symbol, samples = values.len(), "Rate average overflowed"),
            }
        }

        let result = RatesResult::new(key.base().clone(), rates);
        info!(key = %key, resolved = result.rates.len(), "Fetched and cached rates");
        self.cache.insert(key, result.clone());
        self.metrics.increment_total_queries();

        result
    }

    /// Query every provider, keeping configuration order in the output.
    async fn fetch_all(&self, key: &CacheKey) -> Vec<Option<RateMap>> {
        match self.config.fetch_strategy {
            FetchStrategy::Sequential => {
                let mut outcomes = Vec::with_capacity(self.providers.len());
                for provider in &self.providers {
                    outcomes.push(self.fetch_one(provider.as_ref(), key).await);
                }
                outcomes
            }
            FetchStrategy::Concurrent => {
                join_all(
                    self.providers
                        .iter()
                        .map(|provider| self.fetch_one(provider.as_ref(), key)),
                )
                .await
            }
        }
    }

    async fn fetch_one(&self, provider: &dyn RateProvider, key: &CacheKey) -> Option<RateMap> {
        let name = provider.name();
        debug!(provider = name, "Fetching rates");
        self.metrics.increment_provider_requests(name);

        let fetch = provider.fetch(key.base(), key.symbols());
        let outcome = match self.config.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .unwrap_or_else(|_| {
                    Err(FxError::Timeout {
                        provider: name.to_string(),
                        elapsed: limit,
                    })
                }),
            None => fetch.await,
        };

        match outcome {
            Ok(rates) => {
                self.metrics.increment_provider_responses(name);
                debug!(provider = name, quoted = rates.len(), "Provider responded");
                Some(rates)
            }
            Err(e) => {
                warn!(
                    provider = name,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to fetch rates"
                );
                self.metrics.increment_provider_errors(name);
                None
            }
        }
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Cache cleared");
    }

    /// Number of cached results.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Reset all metrics.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    /// The shared metrics recorder.
    pub fn metrics_recorder(&self) -> &SharedMetrics {
        &self.metrics
    }

    /// Configured provider names, in query order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

/// Arithmetic mean rounded half-up to six fractional digits.
///
/// Returns `None` for an empty slice or if the sum overflows.
pub fn average_rate(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))?;
    let mean = sum.checked_div(Decimal::from(values.len()))?;

    let mut rounded = mean.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(RATE_SCALE);
    Some(rounded)
}
