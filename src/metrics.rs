//! Upstream request metrics
//!
//! Tracks latency percentiles and success rates of calls made through the
//! market data service, per kind of operation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Kind of upstream call being measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Whole multi-page listing aggregation
    Listing,
    CoinDetails,
    MarketChart,
}

/// Metrics for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetrics {
    /// Name of the provider
    pub provider_name: String,
    /// 50th percentile latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of requests tracked
    pub total_requests: u64,
    /// Number of failed requests
    pub failed_requests: u64,
    /// Lifetime request count per operation
    pub requests_by_operation: HashMap<Operation, u64>,
}

impl ProviderMetrics {
    /// Creates metrics with no data
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
            requests_by_operation: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct Totals {
    total: u64,
    failed: u64,
    by_operation: HashMap<Operation, u64>,
}

/// Collects and computes metrics for a provider
pub struct MetricsCollector {
    provider_name: String,
    /// Rolling window of latency samples
    samples: Arc<RwLock<VecDeque<LatencySample>>>,
    /// Lifetime counters
    totals: Arc<RwLock<Totals>>,
}

impl MetricsCollector {
    /// Creates a new metrics collector for a provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            samples: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_SAMPLES))),
            totals: Arc::new(RwLock::new(Totals::default())),
        }
    }

    /// Records a call with its duration and success status
    pub async fn record_request(&self, operation: Operation, duration: Duration, success: bool) {
        {
            let mut totals = self.totals.write().await;
            totals.total += 1;
            if !success {
                totals.failed += 1;
            }
            *totals.by_operation.entry(operation).or_insert(0) += 1;
        }

        let mut samples = self.samples.write().await;
        if samples.len() >= MAX_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> ProviderMetrics {
        let samples = self.samples.read().await;
        let totals = self.totals.read().await;

        if samples.is_empty() {
            return ProviderMetrics::empty(&self.provider_name);
        }

        // Failed calls can end early, so only successes feed the percentiles
        let mut latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();

        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if totals.total > 0 {
            (totals.total - totals.failed) as f64 / totals.total as f64
        } else {
            1.0
        };

        ProviderMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: totals.total,
            failed_requests: totals.failed,
            requests_by_operation: totals.by_operation.clone(),
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let collector = MetricsCollector::new("test");

        collector
            .record_request(Operation::Listing, Duration::from_millis(100), true)
            .await;
        collector
            .record_request(Operation::CoinDetails, Duration::from_millis(200), true)
            .await;
        collector
            .record_request(Operation::CoinDetails, Duration::from_millis(150), false)
            .await;

        let metrics = collector.get_metrics().await;

        assert_eq!(metrics.provider_name, "test");
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
        assert_eq!(metrics.requests_by_operation[&Operation::CoinDetails], 2);
        assert_eq!(metrics.latency_p99_ms, 200.0);
    }

    #[tokio::test]
    async fn test_empty_metrics() {
        let metrics = MetricsCollector::new("idle").get_metrics().await;
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.success_rate, 1.0);
    }

    #[tokio::test]
    async fn test_window_is_bounded() {
        let collector = MetricsCollector::new("busy");
        for _ in 0..(MAX_SAMPLES + 20) {
            collector
                .record_request(Operation::MarketChart, Duration::from_millis(1), true)
                .await;
        }

        assert_eq!(collector.samples.read().await.len(), MAX_SAMPLES);
        assert_eq!(collector.get_metrics().await.total_requests, 120);
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 9.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
