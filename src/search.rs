//! Coin search and input debouncing

use crate::{
    constants::{COMPARISON_SEARCH_LIMIT, SEARCH_DEBOUNCE_MS, SELECTOR_SEARCH_LIMIT},
    types::CoinMarketRecord,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Filters coins by a free-text query
///
/// Matching is case-insensitive on name or symbol. A blank query returns
/// the first coins unfiltered. `exclude_id` drops one coin from matches,
/// so a comparison picker cannot offer the coin already picked on the
/// other side. Results keep listing order and are capped at `limit`.
pub fn filter_coins<'a>(
    coins: &'a [CoinMarketRecord],
    query: &str,
    exclude_id: Option<&str>,
    limit: Option<usize>,
) -> Vec<&'a CoinMarketRecord> {
    let limit = limit.unwrap_or(usize::MAX);
    let query = query.trim().to_lowercase();

    if query.is_empty() {
        return coins.iter().take(limit).collect();
    }

    coins
        .iter()
        .filter(|coin| Some(coin.id.as_str()) != exclude_id)
        .filter(|coin| {
            coin.name.to_lowercase().contains(&query)
                || coin.symbol.to_lowercase().contains(&query)
        })
        .take(limit)
        .collect()
}

/// Search for the comparison picker, never offering `other_pick`
pub fn search_comparison_candidates<'a>(
    coins: &'a [CoinMarketRecord],
    query: &str,
    other_pick: Option<&str>,
) -> Vec<&'a CoinMarketRecord> {
    filter_coins(coins, query, other_pick, Some(COMPARISON_SEARCH_LIMIT))
}

/// Search for the coin selector list
pub fn search_selector<'a>(coins: &'a [CoinMarketRecord], query: &str) -> Vec<&'a CoinMarketRecord> {
    filter_coins(coins, query, None, Some(SELECTOR_SEARCH_LIMIT))
}

/// Delays a changing value until it stops changing
///
/// Values pushed through a [`DebounceHandle`] replace each other;
/// [`settled`](Debouncer::settled) resolves with the latest one once no new
/// value arrived for the debounce delay.
pub struct Debouncer<T> {
    delay: Duration,
    tx: Arc<watch::Sender<T>>,
    rx: watch::Receiver<T>,
}

/// Cloneable input side of a [`Debouncer`]
#[derive(Clone)]
pub struct DebounceHandle<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> DebounceHandle<T> {
    /// Records a new value, restarting the quiet period
    pub fn push(&self, value: T) {
        self.tx.send_replace(value);
    }
}

impl<T: Clone> Debouncer<T> {
    /// Creates a debouncer with the dashboard's search delay
    pub fn new(initial: T) -> Self {
        Self::with_delay(initial, Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn with_delay(initial: T, delay: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            delay,
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn handle(&self) -> DebounceHandle<T> {
        DebounceHandle {
            tx: self.tx.clone(),
        }
    }

    /// Records a new value, restarting the quiet period
    pub fn push(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Latest value, settled or not
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits until no value has been pushed for the debounce delay
    pub async fn settled(&mut self) -> T {
        loop {
            match tokio::time::timeout(self.delay, self.rx.changed()).await {
                Ok(Ok(())) => {
                    self.rx.borrow_and_update();
                }
                // Quiet period elapsed; the sender half is owned by self so
                // the channel cannot close underneath us.
                Ok(Err(_)) | Err(_) => return self.rx.borrow_and_update().clone(),
            }
        }
    }
}
