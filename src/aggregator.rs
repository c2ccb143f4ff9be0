//! Market data aggregator
//!
//! Assembles the full coin listing from the paginated upstream endpoint.
//! Pages are requested strictly one after another: whether page N+1 is
//! requested depends on the size of page N, since upstream reports no total.
//!
//! The aggregator never fails. Rate limits, error statuses and transport
//! failures end the loop early and whatever was gathered so far is returned.
//!
//! A page shorter than [`PER_PAGE`] is taken to be the last one. Upstream
//! does not document this; it holds as long as every page but the last is
//! full.

use crate::{
    constants::{MAX_PAGE_REQUESTS, PER_PAGE},
    error::ProviderError,
    provider::MarketDataProvider,
    types::{CoinMarketRecord, Currency},
};
use serde::{Deserialize, Serialize};

/// Why an aggregation stopped requesting pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    /// A page came back empty
    Exhausted,
    /// A page came back shorter than requested
    ShortPage,
    /// Upstream answered HTTP 429
    RateLimited,
    /// Upstream answered another non-success status
    HttpStatus(u16),
    /// The request failed or the body could not be decoded
    Transport(String),
    /// The page request budget ran out
    BudgetExhausted,
}

impl StopReason {
    /// True when the listing was read to its end
    pub fn is_complete(&self) -> bool {
        matches!(self, StopReason::Exhausted | StopReason::ShortPage)
    }

    fn from_error(error: &ProviderError) -> Self {
        match error {
            ProviderError::RateLimitExceeded => StopReason::RateLimited,
            ProviderError::Status { status, .. } => StopReason::HttpStatus(*status),
            ProviderError::NetworkError(e) => match e.status() {
                Some(status) if status.as_u16() == 429 => StopReason::RateLimited,
                Some(status) => StopReason::HttpStatus(status.as_u16()),
                None => StopReason::Transport(e.to_string()),
            },
            ProviderError::InvalidResponse(msg) | ProviderError::InvalidRequest(msg) => {
                StopReason::Transport(msg.clone())
            }
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "listing exhausted"),
            StopReason::ShortPage => write!(f, "last page reached"),
            StopReason::RateLimited => write!(f, "rate limited"),
            StopReason::HttpStatus(status) => write!(f, "HTTP {}", status),
            StopReason::Transport(msg) => write!(f, "transport error: {}", msg),
            StopReason::BudgetExhausted => {
                write!(f, "page budget of {} requests exhausted", MAX_PAGE_REQUESTS)
            }
        }
    }
}

/// Outcome of one aggregation run
#[derive(Debug, Clone)]
pub struct AggregationReport {
    /// Currency every record is denominated in
    pub currency: Currency,
    /// Records of all successful pages, in page order
    pub coins: Vec<CoinMarketRecord>,
    /// Number of page requests issued, failed ones included
    pub requests_issued: u32,
    pub stop_reason: StopReason,
}

/// Fetches every coin in `currency`, returning what could be gathered
///
/// Never fails: an empty vector is returned when the very first request
/// does not succeed.
pub async fn fetch_all_coins(
    provider: &dyn MarketDataProvider,
    currency: Currency,
) -> Vec<CoinMarketRecord> {
    aggregate_all_coins(provider, currency).await.coins
}

/// Same as [`fetch_all_coins`], also reporting how the run ended
pub async fn aggregate_all_coins(
    provider: &dyn MarketDataProvider,
    currency: Currency,
) -> AggregationReport {
    aggregate_with_limits(provider, currency, PER_PAGE, MAX_PAGE_REQUESTS).await
}

async fn aggregate_with_limits(
    provider: &dyn MarketDataProvider,
    currency: Currency,
    per_page: usize,
    max_requests: u32,
) -> AggregationReport {
    let mut coins: Vec<CoinMarketRecord> = Vec::new();
    let mut requests_issued = 0;
    let mut page = 1;

    let stop_reason = loop {
        if requests_issued >= max_requests {
            tracing::warn!(
                provider = provider.provider_name(),
                currency = %currency,
                max_requests,
                total = coins.len(),
                "Page request budget exhausted"
            );
            break StopReason::BudgetExhausted;
        }

        requests_issued += 1;
        let batch = match provider.fetch_markets_page(currency, page, per_page).await {
            Ok(batch) => batch,
            Err(e) => {
                let reason = StopReason::from_error(&e);
                tracing::warn!(
                    provider = provider.provider_name(),
                    currency = %currency,
                    page,
                    error = %e,
                    total = coins.len(),
                    "Stopping market aggregation early, returning coins loaded so far"
                );
                break reason;
            }
        };

        if batch.is_empty() {
            tracing::info!(
                currency = %currency,
                total = coins.len(),
                "Market aggregation complete"
            );
            break StopReason::Exhausted;
        }

        let batch_len = batch.len();
        coins.extend(batch);
        tracing::debug!(
            currency = %currency,
            page,
            count = batch_len,
            total = coins.len(),
            "Fetched market page"
        );

        if batch_len < per_page {
            tracing::info!(
                currency = %currency,
                page,
                total = coins.len(),
                "Last market page reached"
            );
            break StopReason::ShortPage;
        }

        page += 1;
    };

    AggregationReport {
        currency,
        coins,
        requests_issued,
        stop_reason,
    }
}
