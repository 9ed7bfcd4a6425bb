//! Ratefold FX Aggregation Engine
//!
//! Queries several independent exchange-rate providers, averages their
//! answers into one consensus rate per symbol and caches the result.
//!
//! # Features
//!
//! - Pluggable rate providers behind the [`RateProvider`] trait
//! - Partial-failure tolerance: a failing provider is counted, not fatal
//! - Half-up rounding to six fractional digits
//! - Process-lifetime cache keyed by normalized (base, symbols)
//! - Per-provider request, response and error counters
//!
//! # Example
//!
//! ```rust,ignore
//! use ratefold_fx::{AggregatorConfig, ProvidersConfig, RateAggregator};
//!
//! let providers = ProvidersConfig::default().build_providers()?;
//! let aggregator = RateAggregator::new(providers, AggregatorConfig::default());
//!
//! let result = aggregator.get_exchange_rates("EUR", ["USD", "NZD"]).await;
//! println!("{:?}", result.rates);
//! ```

pub mod aggregator;
pub mod provider;
pub mod cache;
pub mod metrics;
pub mod config;
pub mod error;

pub use aggregator::{average_rate, RateAggregator};
pub use provider::{CurrencyApiProvider, FrankfurterProvider, RateProvider};
pub use cache::{RateCache, SharedRateCache};
pub use metrics::{MetricsRecorder, MetricsSnapshot, ProviderMetrics, SharedMetrics};
pub use config::{AggregatorConfig, FetchStrategy, ProvidersConfig};
pub use error::{FxError, FxResult};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
