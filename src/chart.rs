//! Chart series summaries

use crate::{constants::CHART_LONG_SERIES_POINTS, types::ChartPoint};
use serde::{Deserialize, Serialize};

/// Direction of a series from its first to its last point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// Percentage change from the first to the last value
///
/// Zero when the series has fewer than two points or starts at zero.
pub fn price_change_percentage(points: &[ChartPoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if points.len() < 2 || first.value() == 0.0 {
        return 0.0;
    }

    (last.value() - first.value()) / first.value() * 100.0
}

/// Trend of the series; a flat series counts as up
pub fn trend(points: &[ChartPoint]) -> Trend {
    if price_change_percentage(points) >= 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// X-axis labels, `dd/mm`, with a two-digit year for long series
pub fn axis_labels(points: &[ChartPoint]) -> Vec<String> {
    let pattern = if points.len() > CHART_LONG_SERIES_POINTS {
        "%d/%m/%y"
    } else {
        "%d/%m"
    };

    points
        .iter()
        .map(|point| {
            point
                .time()
                .map(|t| t.format(pattern).to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Lowest and highest value of the series
pub fn value_range(points: &[ChartPoint]) -> Option<(f64, f64)> {
    points.iter().map(ChartPoint::value).fold(None, |range, v| match range {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
