//! Provider abstraction for fetching market data from external APIs

use crate::{
    error::ProviderError,
    types::{CoinDetails, CoinMarketRecord, Currency, MarketChart},
};
use async_trait::async_trait;

/// Trait for market data providers
///
/// Implementations fetch coin listings, coin details and chart series from
/// a paginated upstream API (CoinGecko, or a scripted mock in tests).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches one page of the market-cap ordered coin listing
    ///
    /// # Arguments
    /// * `currency` - Currency the prices are denominated in
    /// * `page` - 1-based page number
    /// * `per_page` - Number of records requested
    ///
    /// # Returns
    /// The records of the page in upstream order, or an error for a
    /// rate-limit, non-success status or transport failure
    async fn fetch_markets_page(
        &self,
        currency: Currency,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<CoinMarketRecord>, ProviderError>;

    /// Fetches the detail record for one coin
    async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetails, ProviderError>;

    /// Fetches price, market cap and volume series for one coin
    ///
    /// # Arguments
    /// * `id` - Upstream coin id
    /// * `currency` - Currency the series are denominated in
    /// * `days` - Number of days of history
    async fn fetch_market_chart(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> Result<MarketChart, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Scripted reply for one listing page
    #[derive(Debug, Clone)]
    pub enum PageReply {
        /// Page with this many records
        Coins(usize),
        /// HTTP 429
        RateLimited,
        /// Any other HTTP status
        Status(u16),
        /// Connection level failure
        Transport,
    }

    /// A listing request seen by the mock
    #[derive(Debug, Clone, PartialEq)]
    pub struct PageRequest {
        pub currency: Currency,
        pub page: u32,
        pub per_page: usize,
    }

    /// Mock provider for testing
    ///
    /// Pages without a scripted reply fall back to the default reply,
    /// which is an empty page unless set otherwise.
    pub struct MockProvider {
        pages: Arc<Mutex<HashMap<u32, PageReply>>>,
        default_page: Arc<Mutex<PageReply>>,
        requests: Arc<Mutex<Vec<PageRequest>>>,
        details: Arc<Mutex<HashMap<String, Result<CoinDetails, u16>>>>,
        charts: Arc<Mutex<HashMap<String, Result<MarketChart, u16>>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                pages: Arc::new(Mutex::new(HashMap::new())),
                default_page: Arc::new(Mutex::new(PageReply::Coins(0))),
                requests: Arc::new(Mutex::new(Vec::new())),
                details: Arc::new(Mutex::new(HashMap::new())),
                charts: Arc::new(Mutex::new(HashMap::new())),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Scripts page sizes for pages 1..=n
        pub fn with_page_sizes(sizes: &[usize]) -> Self {
            let provider = Self::new();
            for (i, size) in sizes.iter().enumerate() {
                provider.set_page(i as u32 + 1, PageReply::Coins(*size));
            }
            provider
        }

        pub fn set_page(&self, page: u32, reply: PageReply) {
            self.pages.lock().unwrap().insert(page, reply);
        }

        pub fn set_default_page(&self, reply: PageReply) {
            *self.default_page.lock().unwrap() = reply;
        }

        pub fn set_details(&self, details: CoinDetails) {
            self.details
                .lock()
                .unwrap()
                .insert(details.id.clone(), Ok(details));
        }

        pub fn set_details_status(&self, id: &str, status: u16) {
            self.details
                .lock()
                .unwrap()
                .insert(id.to_string(), Err(status));
        }

        pub fn set_chart(&self, id: &str, chart: MarketChart) {
            self.charts
                .lock()
                .unwrap()
                .insert(id.to_string(), Ok(chart));
        }

        pub fn set_chart_status(&self, id: &str, status: u16) {
            self.charts
                .lock()
                .unwrap()
                .insert(id.to_string(), Err(status));
        }

        /// Listing requests in the order they were issued
        pub fn page_requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Total number of calls across all operations
        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        fn status_error(status: u16) -> ProviderError {
            if status == 429 {
                ProviderError::RateLimitExceeded
            } else {
                ProviderError::status_error(status, "mock error")
            }
        }
    }

    /// Builds `count` records for a page, ranked after the preceding pages
    pub fn make_page(currency: Currency, page: u32, per_page: usize, count: usize) -> Vec<CoinMarketRecord> {
        let first_rank = (page as usize - 1) * per_page + 1;
        (0..count)
            .map(|i| {
                let rank = first_rank + i;
                let mut coin = CoinMarketRecord::new(
                    format!("coin-{}", rank),
                    format!("c{}", rank),
                    format!("Coin {} ({})", rank, currency.code()),
                );
                coin.market_cap_rank = Some(rank as u32);
                coin.market_cap = Some(1_000_000_000.0 / rank as f64);
                coin.current_price = Some(100.0 / rank as f64);
                coin
            })
            .collect()
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn fetch_markets_page(
            &self,
            currency: Currency,
            page: u32,
            per_page: usize,
        ) -> Result<Vec<CoinMarketRecord>, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            self.requests.lock().unwrap().push(PageRequest {
                currency,
                page,
                per_page,
            });

            let reply = self
                .pages
                .lock()
                .unwrap()
                .get(&page)
                .cloned()
                .unwrap_or_else(|| self.default_page.lock().unwrap().clone());

            match reply {
                PageReply::Coins(count) => Ok(make_page(currency, page, per_page, count)),
                PageReply::RateLimited => Err(ProviderError::RateLimitExceeded),
                PageReply::Status(status) => Err(Self::status_error(status)),
                PageReply::Transport => Err(ProviderError::InvalidResponse(
                    "connection reset by peer".to_string(),
                )),
            }
        }

        async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetails, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            match self.details.lock().unwrap().get(id) {
                Some(Ok(details)) => Ok(details.clone()),
                Some(Err(status)) => Err(Self::status_error(*status)),
                None => Err(Self::status_error(404)),
            }
        }

        async fn fetch_market_chart(
            &self,
            id: &str,
            _currency: Currency,
            _days: u32,
        ) -> Result<MarketChart, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            match self.charts.lock().unwrap().get(id) {
                Some(Ok(chart)) => Ok(chart.clone()),
                Some(Err(status)) => Err(Self::status_error(*status)),
                None => Err(Self::status_error(404)),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
