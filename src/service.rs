//! Market data service
//!
//! Single entry point for dashboard views: cached coin listings, coin
//! details and chart series, with metrics, events and a health check.

use crate::{
    aggregator::{aggregate_all_coins, AggregationReport},
    constants::{COINGECKO_API_URL, ENV_API_KEY, ENV_API_URL, EVENT_CHANNEL_CAPACITY},
    error::ProviderError,
    metrics::{MetricsCollector, Operation, ProviderMetrics},
    provider::MarketDataProvider,
    providers::CoinGeckoProvider,
    store::MarketDataStore,
    types::{
        ChartRange, CoinDetails, CoinMarketRecord, ComponentHealth, Currency, HealthStatus,
        MarketChart, MarketDataEvent,
    },
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, OnceCell};
use uuid::Uuid;

static GLOBAL_SERVICE: OnceCell<Arc<MarketDataService>> = OnceCell::const_new();

/// Market data service
///
/// Listing requests are served from an in-memory cache while it is fresh,
/// otherwise the full listing is aggregated from the provider. Listing
/// calls never fail; detail and chart calls surface provider errors.
///
/// # Example
/// ```no_run
/// use coin_market_sdk::{MarketDataService, Currency};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = MarketDataService::global().await;
/// let listing = service.all_coins(Currency::Eur).await;
/// println!("{} coins loaded", listing.coins.len());
/// # Ok(())
/// # }
/// ```
pub struct MarketDataService {
    store: Arc<MarketDataStore>,
    provider: Arc<dyn MarketDataProvider>,
    metrics: Arc<MetricsCollector>,
    events: broadcast::Sender<MarketDataEvent>,
}

impl MarketDataService {
    /// Returns the global singleton instance
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. Use [`new`](Self::new) to
    /// handle that error instead.
    pub async fn global() -> Arc<Self> {
        GLOBAL_SERVICE
            .get_or_init(|| async {
                Arc::new(Self::new().expect("Failed to create market data service"))
            })
            .await
            .clone()
    }

    /// Creates a service backed by CoinGecko
    ///
    /// The base URL can be overridden with `COINGECKO_API_URL`, and a demo
    /// API key supplied with `COINGECKO_API_KEY`.
    pub fn new() -> Result<Self, ProviderError> {
        let base_url = std::env::var(ENV_API_URL).unwrap_or_else(|_| COINGECKO_API_URL.to_string());
        let api_key = std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty());

        let provider = CoinGeckoProvider::with_base_url(base_url, api_key)?;
        Ok(Self::with_provider(Arc::new(provider)))
    }

    /// Creates a service with a custom provider
    pub fn with_provider(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_store(provider, MarketDataStore::new())
    }

    /// Creates a service with a custom provider and cache
    pub fn with_store(provider: Arc<dyn MarketDataProvider>, store: MarketDataStore) -> Self {
        let metrics = Arc::new(MetricsCollector::new(provider.provider_name()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            store: Arc::new(store),
            provider,
            metrics,
            events,
        }
    }

    /// Subscribes to service events
    pub fn subscribe(&self) -> broadcast::Receiver<MarketDataEvent> {
        self.events.subscribe()
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Gets every coin in `currency`, in market-cap order
    ///
    /// Served from cache while fresh. Never fails; the result may be
    /// partial or empty when upstream misbehaves.
    pub async fn all_coins(&self, currency: Currency) -> Arc<AggregationReport> {
        match self.store.get(currency).await {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(reason = %e, "Listing cache miss");
                self.refresh_now(currency).await
            }
        }
    }

    /// Aggregates the listing for `currency` bypassing the cache
    pub async fn refresh_now(&self, currency: Currency) -> Arc<AggregationReport> {
        let start = Instant::now();
        let report = aggregate_all_coins(self.provider.as_ref(), currency).await;
        let complete = report.stop_reason.is_complete();

        self.metrics
            .record_request(Operation::Listing, start.elapsed(), complete)
            .await;

        let event = if complete {
            MarketDataEvent::CoinsRefreshed {
                id: Uuid::new_v4(),
                currency,
                count: report.coins.len(),
                timestamp: Utc::now(),
            }
        } else {
            MarketDataEvent::CoinsPartiallyLoaded {
                id: Uuid::new_v4(),
                currency,
                count: report.coins.len(),
                stop_reason: report.stop_reason.clone(),
                timestamp: Utc::now(),
            }
        };

        tracing::info!(
            currency = %currency,
            count = report.coins.len(),
            requests = report.requests_issued,
            stop_reason = %report.stop_reason,
            latency_ms = start.elapsed().as_millis() as u64,
            "Refreshed coin listing"
        );

        let report = self.store.update(report).await;
        self.publish(event);
        report
    }

    /// Finds one coin in the cached (or freshly aggregated) listing
    pub async fn find_coin(&self, currency: Currency, id: &str) -> Option<CoinMarketRecord> {
        self.all_coins(currency)
            .await
            .coins
            .iter()
            .find(|coin| coin.id == id)
            .cloned()
    }

    /// Fetches the detail record for one coin
    pub async fn coin_details(&self, id: &str) -> Result<CoinDetails, ProviderError> {
        let start = Instant::now();
        let result = self.provider.fetch_coin_details(id).await;

        self.metrics
            .record_request(Operation::CoinDetails, start.elapsed(), result.is_ok())
            .await;

        if let Err(e) = &result {
            self.report_failure(format!("coin_details:{}", id), e);
        }
        result
    }

    /// Fetches chart series for one coin over a dashboard range
    pub async fn market_chart(
        &self,
        id: &str,
        currency: Currency,
        range: ChartRange,
    ) -> Result<MarketChart, ProviderError> {
        let start = Instant::now();
        let result = self
            .provider
            .fetch_market_chart(id, currency, range.days())
            .await;

        self.metrics
            .record_request(Operation::MarketChart, start.elapsed(), result.is_ok())
            .await;

        if let Err(e) = &result {
            self.report_failure(format!("market_chart:{}:{}:{}", id, currency, range.days()), e);
        }
        result
    }

    /// Gets provider metrics including latency percentiles and success rates
    pub async fn get_provider_metrics(&self) -> ProviderMetrics {
        self.metrics.get_metrics().await
    }

    /// Perform a health check on the service
    ///
    /// # Returns
    /// ComponentHealth describing cached listings and provider success rate
    pub async fn health_check(&self) -> ComponentHealth {
        let mut details = std::collections::HashMap::new();

        let cached = self.store.cached_currencies().await;
        let mut fresh = Vec::new();
        let mut stale = Vec::new();
        let mut partial = Vec::new();

        for currency in &cached {
            if self.store.is_stale(*currency).await {
                stale.push(currency.code());
            } else {
                fresh.push(currency.code());
            }
            if let Some(listing) = self.store.get_any(*currency).await {
                if !listing.report.stop_reason.is_complete() {
                    partial.push(currency.code());
                }
            }
        }

        let metrics = self.get_provider_metrics().await;

        details.insert("provider_name".to_string(), serde_json::json!(self.provider_name()));
        details.insert("fresh_listings".to_string(), serde_json::json!(fresh));
        details.insert("stale_listings".to_string(), serde_json::json!(stale));
        details.insert("partial_listings".to_string(), serde_json::json!(partial));
        details.insert(
            "success_rate".to_string(),
            serde_json::json!(metrics.success_rate),
        );

        let status = if fresh.is_empty() {
            HealthStatus::Unhealthy
        } else if !stale.is_empty() || !partial.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let message = match status {
            HealthStatus::Healthy => "Market data service is operational with fresh data".to_string(),
            HealthStatus::Degraded => format!(
                "Market data service has {} stale and {} partial listings",
                stale.len(),
                partial.len()
            ),
            HealthStatus::Unhealthy => "Market data service has no fresh listing".to_string(),
        };

        ComponentHealth {
            name: "market_data_service".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }

    fn report_failure(&self, resource: String, error: &ProviderError) {
        tracing::warn!(resource = %resource, error = %error, "Market data fetch failed");
        self.publish(MarketDataEvent::FetchFailed {
            id: Uuid::new_v4(),
            resource,
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn publish(&self, event: MarketDataEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::StopReason;
    use crate::provider::mock::{MockProvider, PageReply};
    use crate::types::{ChartPoint, CoinMarketData};
    use std::time::Duration;

    fn service_with(provider: Arc<MockProvider>) -> MarketDataService {
        MarketDataService::with_provider(provider)
    }

    fn details(id: &str) -> CoinDetails {
        CoinDetails {
            id: id.to_string(),
            symbol: id[..3].to_string(),
            name: id.to_string(),
            description: Default::default(),
            image: Default::default(),
            market_cap_rank: Some(1),
            market_data: CoinMarketData::default(),
            last_updated: None,
        }
    }

    #[tokio::test]
    async fn test_listing_is_cached() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[250, 40]));
        let service = service_with(provider.clone());

        let first = service.all_coins(Currency::Usd).await;
        let second = service.all_coins(Currency::Usd).await;

        assert_eq!(first.coins.len(), 290);
        assert_eq!(second.coins.len(), 290);
        assert_eq!(provider.page_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_listing_is_refetched() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[3]));
        let service = MarketDataService::with_store(
            provider.clone(),
            MarketDataStore::with_stale_after(Duration::ZERO),
        );

        service.all_coins(Currency::Eur).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        service.all_coins(Currency::Eur).await;

        assert_eq!(provider.page_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_currencies_are_fetched_separately() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[2]));
        let service = service_with(provider.clone());

        service.all_coins(Currency::Usd).await;
        service.all_coins(Currency::Brl).await;

        let currencies: Vec<Currency> = provider
            .page_requests()
            .iter()
            .map(|r| r.currency)
            .collect();
        assert_eq!(currencies, vec![Currency::Usd, Currency::Brl]);
    }

    #[tokio::test]
    async fn test_partial_listing_emits_event() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[250]));
        provider.set_page(2, PageReply::RateLimited);
        let service = service_with(provider);
        let mut events = service.subscribe();

        let report = service.all_coins(Currency::Usd).await;

        assert_eq!(report.coins.len(), 250);
        match events.recv().await.unwrap() {
            MarketDataEvent::CoinsPartiallyLoaded {
                count, stop_reason, ..
            } => {
                assert_eq!(count, 250);
                assert_eq!(stop_reason, StopReason::RateLimited);
            }
            other => panic!("unexpected event: {}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_listing_emits_refreshed() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[10]));
        let service = service_with(provider);
        let mut events = service.subscribe();

        service.refresh_now(Currency::Eur).await;

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "COINS_REFRESHED");
    }

    #[tokio::test]
    async fn test_find_coin() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[5]));
        let service = service_with(provider);

        let coin = service.find_coin(Currency::Usd, "coin-3").await.unwrap();
        assert_eq!(coin.market_cap_rank, Some(3));
        assert!(service.find_coin(Currency::Usd, "missing").await.is_none());
    }

    #[tokio::test]
    async fn test_coin_details_propagates_status() {
        let provider = Arc::new(MockProvider::new());
        provider.set_details(details("bitcoin"));
        provider.set_details_status("ethereum", 503);
        let service = service_with(provider.clone());
        let mut events = service.subscribe();

        assert_eq!(service.coin_details("bitcoin").await.unwrap().id, "bitcoin");

        let err = service.coin_details("ethereum").await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        let err = service.coin_details("unknown").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(provider.call_count(), 3);

        assert_eq!(events.recv().await.unwrap().event_type(), "FETCH_FAILED");
    }

    #[tokio::test]
    async fn test_market_chart_propagates_rate_limit() {
        let provider = Arc::new(MockProvider::new());
        provider.set_chart(
            "bitcoin",
            MarketChart {
                prices: vec![ChartPoint(1, 10.0), ChartPoint(2, 11.0)],
                ..Default::default()
            },
        );
        provider.set_chart_status("solana", 429);
        let service = service_with(provider);

        let chart = service
            .market_chart("bitcoin", Currency::Usd, ChartRange::Week)
            .await
            .unwrap();
        assert_eq!(chart.prices.len(), 2);

        let err = service
            .market_chart("solana", Currency::Usd, ChartRange::Day)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimitExceeded));
        assert_eq!(err.status(), Some(429));
    }

    #[tokio::test]
    async fn test_metrics_by_operation() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[1]));
        let service = service_with(provider);

        service.all_coins(Currency::Usd).await;
        let _ = service.coin_details("nothing").await;

        let metrics = service.get_provider_metrics().await;
        assert_eq!(metrics.provider_name, "mock");
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.failed_requests, 1);
        assert_eq!(metrics.requests_by_operation[&Operation::Listing], 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = Arc::new(MockProvider::with_page_sizes(&[4]));
        let service = service_with(provider.clone());

        let health = service.health_check().await;
        assert_eq!(health.status, HealthStatus::Unhealthy);

        service.all_coins(Currency::Usd).await;
        assert_eq!(service.health_check().await.status, HealthStatus::Healthy);

        provider.set_page(1, PageReply::Status(500));
        service.refresh_now(Currency::Eur).await;
        let health = service.health_check().await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.details["partial_listings"], serde_json::json!(["eur"]));
    }
}
