//! Constants for the coin market SDK
//!
//! All configuration is centralized here. There is no runtime config file;
//! the only runtime knobs are the environment overrides read by
//! [`MarketDataService::new`](crate::service::MarketDataService::new).

use crate::types::Currency;

/// Number of records requested per listing page
pub const PER_PAGE: usize = 250;

/// Maximum number of listing pages requested per aggregation
pub const MAX_PAGE_REQUESTS: u32 = 30;

/// How long an aggregated listing is served from cache (in seconds)
pub const STALE_THRESHOLD_SECS: u64 = 300;

/// HTTP request timeout for upstream calls (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Currency used when no valid preference is stored
pub const DEFAULT_CURRENCY: Currency = Currency::Usd;

/// Preference key holding the selected display currency
pub const CURRENCY_PREFERENCE_KEY: &str = "crypto-dashboard-currency";

/// Directory name under the platform config dir for persisted preferences
pub const PREFERENCES_DIR: &str = "coin-market-sdk";

/// File name of the persisted preference map
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Quiet period before a search query is applied (in milliseconds)
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Result limit for the comparison coin picker
pub const COMPARISON_SEARCH_LIMIT: usize = 10;

/// Result limit for the coin selector
pub const SELECTOR_SEARCH_LIMIT: usize = 50;

/// Chart series longer than this get a year in their axis labels
pub const CHART_LONG_SERIES_POINTS: usize = 30;

/// Capacity of the service event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko endpoint for the paginated market listing
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// CoinGecko endpoint prefix for per-coin resources
pub const COINGECKO_COINS_ENDPOINT: &str = "/coins";

/// Header carrying a CoinGecko demo API key
pub const COINGECKO_API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Environment variable overriding the CoinGecko base URL
pub const ENV_API_URL: &str = "COINGECKO_API_URL";

/// Environment variable holding an optional CoinGecko API key
pub const ENV_API_KEY: &str = "COINGECKO_API_KEY";

/// Environment variable overriding the preference file location
pub const ENV_PREFERENCES_PATH: &str = "COIN_MARKET_PREFERENCES";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "coin-market-sdk/0.1.0";
