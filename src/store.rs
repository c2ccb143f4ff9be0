//! In-memory listing cache keyed by currency

use crate::{
    aggregator::AggregationReport,
    constants::STALE_THRESHOLD_SECS,
    error::DataError,
    types::Currency,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A cached aggregation result together with when it was fetched
#[derive(Debug, Clone)]
pub struct CachedListing {
    pub report: Arc<AggregationReport>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedListing {
    pub fn new(report: AggregationReport) -> Self {
        Self {
            report: Arc::new(report),
            fetched_at: Utc::now(),
        }
    }

    /// Get the age of the listing
    pub fn age(&self) -> Duration {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        Duration::from_millis(age.num_milliseconds().max(0) as u64)
    }

    /// Check if the listing is older than `threshold`
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age() > threshold
    }
}

/// In-memory store for aggregated coin listings
///
/// Holds at most one listing per currency. Storing a new listing
/// supersedes the previous one for that currency only.
pub struct MarketDataStore {
    listings: Arc<RwLock<HashMap<Currency, CachedListing>>>,
    stale_after: Duration,
}

impl MarketDataStore {
    /// Creates a store with the default staleness window
    pub fn new() -> Self {
        Self::with_stale_after(Duration::from_secs(STALE_THRESHOLD_SECS))
    }

    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            listings: Arc::new(RwLock::new(HashMap::new())),
            stale_after,
        }
    }

    /// Stores a listing, replacing any previous one for its currency
    pub async fn update(&self, report: AggregationReport) -> Arc<AggregationReport> {
        let currency = report.currency;
        let cached = CachedListing::new(report);
        let report = cached.report.clone();

        self.listings.write().await.insert(currency, cached);
        tracing::debug!(
            currency = %currency,
            count = report.coins.len(),
            "Cached market listing"
        );

        report
    }

    /// Gets the listing for a currency
    ///
    /// # Returns
    /// The cached listing, or an error if it was never stored or has
    /// outlived the staleness window
    pub async fn get(&self, currency: Currency) -> Result<Arc<AggregationReport>, DataError> {
        let listings = self.listings.read().await;
        let cached = listings
            .get(&currency)
            .ok_or_else(|| DataError::not_available(currency.code()))?;

        if cached.is_stale(self.stale_after) {
            return Err(DataError::stale(currency.code(), cached.age()));
        }

        Ok(cached.report.clone())
    }

    /// Gets the listing for a currency regardless of its age
    pub async fn get_any(&self, currency: Currency) -> Option<CachedListing> {
        self.listings.read().await.get(&currency).cloned()
    }

    /// Drops the listing for a currency
    pub async fn invalidate(&self, currency: Currency) -> bool {
        self.listings.write().await.remove(&currency).is_some()
    }

    /// Currencies with a listing, fresh or stale
    pub async fn cached_currencies(&self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> = self.listings.read().await.keys().copied().collect();
        currencies.sort_by_key(|c| c.code());
        currencies
    }

    /// Checks if the listing for a currency is stale
    ///
    /// # Returns
    /// True if the listing is stale or doesn't exist
    pub async fn is_stale(&self, currency: Currency) -> bool {
        match self.listings.read().await.get(&currency) {
            Some(cached) => cached.is_stale(self.stale_after),
            None => true,
        }
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}
