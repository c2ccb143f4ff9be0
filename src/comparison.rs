//! Side-by-side comparison of two coins

use crate::types::CoinMarketRecord;
use serde::{Deserialize, Serialize};

/// Which side of a comparison row is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    First,
    Second,
    Tie,
}

/// Metrics compared between two coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    CurrentPrice,
    PriceChange24h,
    MarketCap,
    Volume24h,
    CirculatingSupply,
    AllTimeHigh,
    AllTimeLow,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[
            Metric::CurrentPrice,
            Metric::PriceChange24h,
            Metric::MarketCap,
            Metric::Volume24h,
            Metric::CirculatingSupply,
            Metric::AllTimeHigh,
            Metric::AllTimeLow,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::CurrentPrice => "Current Price",
            Metric::PriceChange24h => "24h Change",
            Metric::MarketCap => "Market Cap",
            Metric::Volume24h => "24h Volume",
            Metric::CirculatingSupply => "Circulating Supply",
            Metric::AllTimeHigh => "All-Time High",
            Metric::AllTimeLow => "All-Time Low",
        }
    }

    /// All metrics favour the larger value except the all-time low
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Metric::AllTimeLow)
    }

    pub fn value(&self, coin: &CoinMarketRecord) -> Option<f64> {
        match self {
            Metric::CurrentPrice => coin.current_price,
            Metric::PriceChange24h => coin.price_change_percentage_24h,
            Metric::MarketCap => coin.market_cap,
            Metric::Volume24h => coin.total_volume,
            Metric::CirculatingSupply => coin.circulating_supply,
            Metric::AllTimeHigh => coin.ath,
            Metric::AllTimeLow => coin.atl,
        }
    }
}

/// One metric of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    pub first: Option<f64>,
    pub second: Option<f64>,
    pub winner: Winner,
}

/// Full comparison of two coins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub first_id: String,
    pub second_id: String,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    pub fn row(&self, metric: Metric) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| row.metric == metric)
    }

    /// Number of metrics won by each side
    pub fn score(&self) -> (usize, usize) {
        self.rows.iter().fold((0, 0), |(a, b), row| match row.winner {
            Winner::First => (a + 1, b),
            Winner::Second => (a, b + 1),
            Winner::Tie => (a, b),
        })
    }
}

/// Compares two different coins on every [`Metric`]
///
/// Returns `None` when both sides are the same coin.
pub fn compare(first: &CoinMarketRecord, second: &CoinMarketRecord) -> Option<Comparison> {
    if first.id == second.id {
        return None;
    }

    let rows = Metric::all()
        .iter()
        .map(|metric| {
            let a = metric.value(first);
            let b = metric.value(second);
            ComparisonRow {
                metric: *metric,
                first: a,
                second: b,
                winner: pick_winner(a, b, metric.higher_is_better()),
            }
        })
        .collect();

    Some(Comparison {
        first_id: first.id.clone(),
        second_id: second.id.clone(),
        rows,
    })
}

fn pick_winner(first: Option<f64>, second: Option<f64>, higher_is_better: bool) -> Winner {
    let first = first.filter(|v| v.is_finite());
    let second = second.filter(|v| v.is_finite());

    match (first, second) {
        (Some(a), Some(b)) if a == b => Winner::Tie,
        (Some(a), Some(b)) => {
            if (a > b) == higher_is_better {
                Winner::First
            } else {
                Winner::Second
            }
        }
        (Some(_), None) => Winner::First,
        (None, Some(_)) => Winner::Second,
        (None, None) => Winner::Tie,
    }
}
