//! Types for the coin market SDK

use crate::aggregator::StopReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Display currencies supported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US Dollar
    #[default]
    Usd,
    /// Brazilian Real
    Brl,
    /// Euro
    Eur,
}

impl Currency {
    /// Get the lowercase code used by the upstream API
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Brl => "brl",
            Currency::Eur => "eur",
        }
    }

    /// Get the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Brl => "R$",
            Currency::Eur => "€",
        }
    }

    /// Get the human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar (USD)",
            Currency::Brl => "Brazilian Real (BRL)",
            Currency::Eur => "Euro (EUR)",
        }
    }

    /// Get all supported currencies
    pub fn all() -> &'static [Currency] {
        &[Currency::Usd, Currency::Brl, Currency::Eur]
    }

    /// Parses a currency code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Currency> {
        let code = code.trim();
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| format!("unsupported currency: {}", s))
    }
}

/// One coin from the `/coins/markets` listing
///
/// Numeric fields are optional because upstream sends `null` for coins
/// it has no data for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: String,

    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    /// 1 is the largest market cap
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,

    pub circulating_supply: Option<f64>,
    /// `None` when the asset has no fixed total
    #[serde(default)]
    pub total_supply: Option<f64>,
    /// `None` when supply is unbounded
    #[serde(default)]
    pub max_supply: Option<f64>,

    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub ath_date: Option<String>,
    pub atl: Option<f64>,
    pub atl_change_percentage: Option<f64>,
    pub atl_date: Option<String>,

    pub last_updated: Option<String>,
}

impl CoinMarketRecord {
    /// Creates a record with identity only; market fields are empty
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: String::new(),
            current_price: None,
            market_cap: None,
            market_cap_rank: None,
            fully_diluted_valuation: None,
            total_volume: None,
            high_24h: None,
            low_24h: None,
            price_change_24h: None,
            price_change_percentage_24h: None,
            market_cap_change_24h: None,
            market_cap_change_percentage_24h: None,
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            ath: None,
            ath_change_percentage: None,
            ath_date: None,
            atl: None,
            atl_change_percentage: None,
            atl_date: None,
            last_updated: None,
        }
    }

    /// Parses `last_updated` into a timestamp
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_updated.as_deref()?)
    }

    /// Parses `ath_date` into a timestamp
    pub fn ath_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.ath_date.as_deref()?)
    }

    /// Parses `atl_date` into a timestamp
    pub fn atl_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.atl_date.as_deref()?)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Coin description block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinDescription {
    #[serde(default)]
    pub en: String,
}

/// Coin image URLs in the sizes upstream offers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinImage {
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub large: String,
}

/// Market data block of `/coins/{id}`, keyed by currency code where upstream
/// reports one value per currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub high_24h: HashMap<String, f64>,
    #[serde(default)]
    pub low_24h: HashMap<String, f64>,

    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub price_change_percentage_30d: Option<f64>,
    pub price_change_percentage_1y: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,

    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,

    #[serde(default)]
    pub ath: HashMap<String, f64>,
    #[serde(default)]
    pub ath_change_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub ath_date: HashMap<String, String>,
    #[serde(default)]
    pub atl: HashMap<String, f64>,
    #[serde(default)]
    pub atl_change_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub atl_date: HashMap<String, String>,
}

/// Detail record from `/coins/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetails {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: CoinDescription,
    #[serde(default)]
    pub image: CoinImage,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub market_data: CoinMarketData,
    pub last_updated: Option<String>,
}

impl CoinDetails {
    /// Current price in the given currency
    pub fn current_price(&self, currency: Currency) -> Option<f64> {
        self.market_data.current_price.get(currency.code()).copied()
    }

    /// Market cap in the given currency
    pub fn market_cap(&self, currency: Currency) -> Option<f64> {
        self.market_data.market_cap.get(currency.code()).copied()
    }

    /// 24h volume in the given currency
    pub fn total_volume(&self, currency: Currency) -> Option<f64> {
        self.market_data.total_volume.get(currency.code()).copied()
    }

    /// 24h high in the given currency
    pub fn high_24h(&self, currency: Currency) -> Option<f64> {
        self.market_data.high_24h.get(currency.code()).copied()
    }

    /// 24h low in the given currency
    pub fn low_24h(&self, currency: Currency) -> Option<f64> {
        self.market_data.low_24h.get(currency.code()).copied()
    }

    /// All-time high in the given currency
    pub fn ath(&self, currency: Currency) -> Option<f64> {
        self.market_data.ath.get(currency.code()).copied()
    }

    /// All-time high date in the given currency
    pub fn ath_date(&self, currency: Currency) -> Option<&str> {
        self.market_data
            .ath_date
            .get(currency.code())
            .map(String::as_str)
    }

    /// All-time low in the given currency
    pub fn atl(&self, currency: Currency) -> Option<f64> {
        self.market_data.atl.get(currency.code()).copied()
    }

    /// All-time low date in the given currency
    pub fn atl_date(&self, currency: Currency) -> Option<&str> {
        self.market_data
            .atl_date
            .get(currency.code())
            .map(String::as_str)
    }
}

/// One `[timestamp_ms, value]` pair of a chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint(pub i64, pub f64);

impl ChartPoint {
    /// Milliseconds since the Unix epoch
    pub fn timestamp_ms(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }

    /// Timestamp as a UTC datetime
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

/// Response of `/coins/{id}/market_chart`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<ChartPoint>,
    #[serde(default)]
    pub market_caps: Vec<ChartPoint>,
    #[serde(default)]
    pub total_volumes: Vec<ChartPoint>,
}

/// Chart windows offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartRange {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl ChartRange {
    /// Number of days requested upstream
    pub fn days(&self) -> u32 {
        match self {
            ChartRange::Day => 1,
            ChartRange::Week => 7,
            ChartRange::Month => 30,
            ChartRange::Year => 365,
        }
    }

    /// Maps a day count back to a range
    pub fn from_days(days: u32) -> Option<ChartRange> {
        ChartRange::all().iter().copied().find(|r| r.days() == days)
    }

    pub fn all() -> &'static [ChartRange] {
        &[
            ChartRange::Day,
            ChartRange::Week,
            ChartRange::Month,
            ChartRange::Year,
        ]
    }
}

/// Events broadcast by the market data service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketDataEvent {
    /// Full listing was aggregated
    CoinsRefreshed {
        id: Uuid,
        currency: Currency,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Aggregation stopped early; the listing holds what was gathered
    CoinsPartiallyLoaded {
        id: Uuid,
        currency: Currency,
        count: usize,
        stop_reason: StopReason,
        timestamp: DateTime<Utc>,
    },

    /// A single-record fetch failed
    FetchFailed {
        id: Uuid,
        resource: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl MarketDataEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            MarketDataEvent::CoinsRefreshed { id, .. } => *id,
            MarketDataEvent::CoinsPartiallyLoaded { id, .. } => *id,
            MarketDataEvent::FetchFailed { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            MarketDataEvent::CoinsRefreshed { .. } => "COINS_REFRESHED",
            MarketDataEvent::CoinsPartiallyLoaded { .. } => "COINS_PARTIALLY_LOADED",
            MarketDataEvent::FetchFailed { .. } => "FETCH_FAILED",
        }
    }
}

impl std::fmt::Display for MarketDataEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketDataEvent::CoinsRefreshed {
                currency, count, ..
            } => write!(f, "Loaded {} coins in {}", count, currency),
            MarketDataEvent::CoinsPartiallyLoaded {
                currency,
                count,
                stop_reason,
                ..
            } => write!(
                f,
                "Loaded {} coins in {} (stopped early: {})",
                count, currency, stop_reason
            ),
            MarketDataEvent::FetchFailed {
                resource,
                error_message,
                ..
            } => write!(f, "Fetch failed for {}: {}", resource, error_message),
        }
    }
}

/// Overall system health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// System is healthy and all components are operational
    Healthy,
    /// System is degraded but still functional
    Degraded,
    /// System is unhealthy and requires attention
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
