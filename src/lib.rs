//! # Coin Market SDK
//!
//! Market data layer for a cryptocurrency dashboard, backed by the
//! CoinGecko REST API.
//!
//! It assembles the full market-cap ordered coin listing from the paginated
//! `/coins/markets` endpoint, fetches per-coin details and chart series,
//! caches listings for a few minutes, and persists the user's display
//! currency. The view helpers in [`search`], [`comparison`], [`format`] and
//! [`chart`] cover what the dashboard pages compute from that data.
//!
//! ## Usage
//!
//! ```no_run
//! use coin_market_sdk::{ChartRange, Currency, CurrencyPreference, MarketDataService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let currency = CurrencyPreference::from_default_location()?.load();
//! let service = MarketDataService::global().await;
//!
//! // Never fails: partial or empty when upstream rate-limits or errors
//! let listing = service.all_coins(currency).await;
//! for coin in listing.coins.iter().take(10) {
//!     println!("{}: {:?}", coin.symbol, coin.current_price);
//! }
//!
//! // Single-record calls surface upstream errors
//! let details = service.coin_details("bitcoin").await?;
//! let chart = service.market_chart("bitcoin", currency, ChartRange::Month).await?;
//! println!("{}: {} price points", details.name, chart.prices.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Listing aggregation degrades instead of failing: see
//! [`aggregator::StopReason`] for why a listing ended. Coin details and
//! charts return [`ProviderError`], which carries the HTTP status:
//!
//! ```no_run
//! use coin_market_sdk::{MarketDataService, ProviderError};
//!
//! # async fn example() {
//! let service = MarketDataService::global().await;
//!
//! match service.coin_details("not-a-coin").await {
//!     Ok(details) => println!("{}", details.name),
//!     Err(ProviderError::RateLimitExceeded) => println!("Slow down"),
//!     Err(e) => eprintln!("Error (status {:?}): {}", e.status(), e),
//! }
//! # }
//! ```

pub mod aggregator;
pub mod chart;
pub mod comparison;
pub mod constants;
pub mod error;
pub mod format;
pub mod metrics;
pub mod preferences;
pub mod provider;
pub mod providers;
pub mod search;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use aggregator::{aggregate_all_coins, fetch_all_coins, AggregationReport, StopReason};
pub use error::{DataError, PreferenceError, ProviderError};
pub use metrics::ProviderMetrics;
pub use preferences::CurrencyPreference;
pub use provider::MarketDataProvider;
pub use service::MarketDataService;
pub use types::{
    ChartPoint, ChartRange, CoinDetails, CoinMarketRecord, ComponentHealth, Currency,
    HealthStatus, MarketChart, MarketDataEvent,
};
