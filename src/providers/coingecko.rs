//! CoinGecko market data provider implementation

use crate::{
    constants::{
        COINGECKO_API_KEY_HEADER, COINGECKO_API_URL, COINGECKO_COINS_ENDPOINT,
        COINGECKO_MARKETS_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ProviderError,
    provider::MarketDataProvider,
    types::{CoinDetails, CoinMarketRecord, Currency, MarketChart},
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider against the public API
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL, None)
    }

    /// Creates a provider against a custom base URL, optionally sending a
    /// demo API key with every request
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Builds the URL for one page of the market listing
    fn markets_url(&self, currency: Currency, page: u32, per_page: usize) -> String {
        format!(
            "{}{}?vs_currency={}&order=market_cap_desc&per_page={}&page={}&sparkline=false&locale=en",
            self.base_url,
            COINGECKO_MARKETS_ENDPOINT,
            currency.code(),
            per_page,
            page
        )
    }

    /// Builds the URL for a coin detail record
    fn details_url(&self, id: &str) -> String {
        format!(
            "{}{}/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false",
            self.base_url, COINGECKO_COINS_ENDPOINT, id
        )
    }

    /// Builds the URL for a coin's chart series
    fn chart_url(&self, id: &str, currency: Currency, days: u32) -> String {
        format!(
            "{}{}/{}/market_chart?vs_currency={}&days={}",
            self.base_url,
            COINGECKO_COINS_ENDPOINT,
            id,
            currency.code(),
            days
        )
    }

    /// Issues a GET and decodes a JSON body, mapping upstream failures
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(COINGECKO_API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(ProviderError::NetworkError)?;
        let response = check_status(response).await?;

        let response_text = response.text().await.map_err(ProviderError::NetworkError)?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e,
                truncate(&response_text, 200)
            ))
        })
    }
}

/// Rejects rate-limited and non-success responses
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();

    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimitExceeded);
    }

    if !status.is_success() {
        return Err(ProviderError::status_error(
            status.as_u16(),
            response.text().await.unwrap_or_default(),
        ));
    }

    Ok(response)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn require_id(id: &str) -> Result<&str, ProviderError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ProviderError::InvalidRequest(
            "Coin ID is required".to_string(),
        ));
    }
    Ok(id)
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new().expect("Failed to create CoinGecko provider")
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets_page(
        &self,
        currency: Currency,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<CoinMarketRecord>, ProviderError> {
        let url = self.markets_url(currency, page, per_page);
        tracing::debug!(url = %url, page, "Fetching market page from CoinGecko");

        self.get_json(&url).await
    }

    async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetails, ProviderError> {
        let id = require_id(id)?;
        let url = self.details_url(id);
        tracing::debug!(url = %url, "Fetching coin details from CoinGecko");

        self.get_json(&url).await
    }

    async fn fetch_market_chart(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> Result<MarketChart, ProviderError> {
        let id = require_id(id)?;
        let url = self.chart_url(id, currency, days);
        tracing::debug!(url = %url, "Fetching market chart from CoinGecko");

        let chart: MarketChart = self.get_json(&url).await?;

        tracing::debug!(
            points = chart.prices.len(),
            "Successfully fetched market chart from CoinGecko"
        );

        Ok(chart)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
