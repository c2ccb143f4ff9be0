//! Error types for the coin market SDK

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to an upstream market data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request rejected before reaching the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Returns the HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::RateLimitExceeded => Some(429),
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            ProviderError::InvalidResponse(_) | ProviderError::InvalidRequest(_) => None,
        }
    }

    /// Creates a Status error
    pub fn status_error(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Errors that can occur when reading cached market data
#[derive(Debug, Error, Clone)]
pub enum DataError {
    /// Listing never fetched for this currency
    #[error("Market data not available for {currency}")]
    NotAvailable { currency: String },

    /// Listing is older than the staleness window
    #[error("Market data for {currency} is stale (age: {age:?})")]
    Stale { currency: String, age: Duration },
}

impl DataError {
    /// Creates a NotAvailable error
    pub fn not_available(currency: &str) -> Self {
        Self::NotAvailable {
            currency: currency.to_string(),
        }
    }

    /// Creates a Stale error
    pub fn stale(currency: &str, age: Duration) -> Self {
        Self::Stale {
            currency: currency.to_string(),
            age,
        }
    }
}

/// Errors that can occur when persisting preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Reading or writing the backing file failed
    #[error("Preference I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not a valid preference map
    #[error("Preference serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No platform config directory to place the preference file in
    #[error("Unable to determine config directory")]
    NoConfigDir,
}
