//! Query and per-provider counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Counters for a single provider.
#[derive(Debug, Default)]
struct ProviderCounters {
    requests: AtomicU64,
    responses: AtomicU64,
    errors: AtomicU64,
}

/// Aggregator metrics.
///
/// Every counter is independently atomic; a snapshot taken while requests
/// are in flight may mix counts from before and after a given fetch.
pub struct MetricsRecorder {
    /// Total calls to the aggregator, cache hits included.
    total_queries: AtomicU64,
    /// Per-provider counters, created on first reference.
    providers: DashMap<String, ProviderCounters>,
}

impl MetricsRecorder {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            providers: DashMap::new(),
        }
    }

    /// Increment total queries.
    pub fn increment_total_queries(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request sent to a provider.
    pub fn increment_provider_requests(&self, name: &str) {
        self.with_provider(name, |c| c.requests.fetch_add(1, Ordering::Relaxed));
    }

    /// Record a successful provider response.
    pub fn increment_provider_responses(&self, name: &str) {
        self.with_provider(name, |c| c.responses.fetch_add(1, Ordering::Relaxed));
    }

    /// Record a provider failure.
    pub fn increment_provider_errors(&self, name: &str) {
        self.with_provider(name, |c| c.errors.fetch_add(1, Ordering::Relaxed));
    }

    /// Get current metrics snapshot, providers sorted by name.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut providers: Vec<ProviderMetrics> = self
            .providers
            .iter()
            .map(|entry| ProviderMetrics {
                name: entry.key().clone(),
                requests: entry.requests.load(Ordering::Relaxed),
                responses: entry.responses.load(Ordering::Relaxed),
                errors: entry.errors.load(Ordering::Relaxed),
            })
            .collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));

        MetricsSnapshot {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            providers,
        }
    }

    /// Zero the query counter and forget every provider.
    pub fn reset(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.providers.clear();
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            r#"# HELP ratefold_queries_total Total number of exchange rate queries
# TYPE ratefold_queries_total counter
ratefold_queries_total {}
"#,
            snapshot.total_queries
        );

        let families: [(&str, &str, fn(&ProviderMetrics) -> u64); 3] = [
            ("requests", "Requests sent to each provider", |p| p.requests),
            ("responses", "Successful responses from each provider", |p| p.responses),
            ("errors", "Failed requests per provider", |p| p.errors),
        ];

        for (suffix, help, value) in families {
            out.push_str(&format!(
                "\n# HELP ratefold_provider_{suffix}_total {help}\n# TYPE ratefold_provider_{suffix}_total counter\n"
            ));
            for provider in &snapshot.providers {
                out.push_str(&format!(
                    "ratefold_provider_{suffix}_total{{provider=\"{}\"}} {}\n",
                    provider.name,
                    value(provider)
                ));
            }
        }

        out
    }

    fn with_provider(&self, name: &str, f: impl FnOnce(&ProviderCounters) -> u64) {
        if let Some(counters) = self.providers.get(name) {
            f(&counters);
            return;
        }
        let counters = self.providers.entry(name.to_string()).or_default();
        f(&counters);
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time counters for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetrics {
    pub name: String,
    #[serde(rename = "total_requests")]
    pub requests: u64,
    #[serde(rename = "total_responses")]
    pub responses: u64,
    #[serde(rename = "total_errors")]
    pub errors: u64,
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    #[serde(rename = "apis")]
    pub providers: Vec<ProviderMetrics>,
}

impl MetricsSnapshot {
    /// Look up one provider's counters.
    pub fn provider(&self, name: &str) -> Option<&ProviderMetrics> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<MetricsRecorder>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_increment() {
        let metrics = MetricsRecorder::new();

        metrics.increment_total_queries();
        metrics.increment_total_queries();
        metrics.increment_provider_requests("frankfurter");
        metrics.increment_provider_responses("frankfurter");
        metrics.increment_provider_requests("freeCurrencyRates");
        metrics.increment_provider_errors("freeCurrencyRates");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.providers.len(), 2);

        let frankfurter = snapshot.provider("frankfurter").unwrap();
        assert_eq!((frankfurter.requests, frankfurter.responses, frankfurter.errors), (1, 1, 0));

        let free = snapshot.provider("freeCurrencyRates").unwrap();
        assert_eq!((free.requests, free.responses, free.errors), (1, 0, 1));
    }

    #[test]
    fn test_provider_created_lazily() {
        let metrics = MetricsRecorder::new();
        assert!(metrics.snapshot().providers.is_empty());

        metrics.increment_provider_errors("late");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.providers.len(), 1);
        assert_eq!(snapshot.provider("late").unwrap().requests, 0);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let metrics = MetricsRecorder::new();
        metrics.increment_total_queries();

        let before = metrics.snapshot();
        metrics.increment_total_queries();

        assert_eq!(before.total_queries, 1);
        assert_eq!(metrics.snapshot().total_queries, 2);
    }

    #[test]
    fn test_reset() {
        let metrics = MetricsRecorder::new();
        metrics.increment_total_queries();
        metrics.increment_provider_requests("frankfurter");

        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_queries, 0);
        assert!(snapshot.providers.is_empty());

        metrics.increment_provider_requests("frankfurter");
        assert_eq!(metrics.snapshot().provider("frankfurter").unwrap().requests, 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(MetricsRecorder::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.increment_total_queries();
                        metrics.increment_provider_requests("frankfurter");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_queries, 8000);
        assert_eq!(snapshot.provider("frankfurter").unwrap().requests, 8000);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let metrics = MetricsRecorder::new();
        metrics.increment_provider_requests("frankfurter");

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["total_queries"], 0);
        assert_eq!(json["apis"][0]["name"], "frankfurter");
        assert_eq!(json["apis"][0]["total_requests"], 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = MetricsRecorder::new();
        metrics.increment_total_queries();
        metrics.increment_provider_errors("frankfurter");

        let output = metrics.to_prometheus();
        assert!(output.contains("ratefold_queries_total 1"));
        assert!(output.contains("ratefold_provider_errors_total{provider=\"frankfurter\"} 1"));
        assert!(output.contains("ratefold_provider_requests_total{provider=\"frankfurter\"} 0"));
    }
}
