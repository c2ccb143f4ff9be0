//! Display formatting for prices, market aggregates and supplies
//!
//! Output follows en-US conventions (`,` thousands separator, `.` decimal
//! point) with the currency symbol as prefix, e.g. `$1,234.56`, `R$0.0123`,
//! `€1.23B`. Missing or non-finite amounts render as zero.

use crate::types::Currency;

/// Formats a price with 2 to 6 fraction digits
pub fn format_price(value: Option<f64>, currency: Currency) -> String {
    match finite(value) {
        Some(v) => with_symbol(v, currency, |abs| group_decimal(abs, 2, 6)),
        None => zero_amount(currency),
    }
}

/// Formats a large amount with a K/M/B/T suffix and 2 fraction digits
pub fn format_large_number(value: Option<f64>, currency: Currency) -> String {
    match finite(value) {
        Some(v) => with_symbol(v, currency, compact),
        None => zero_amount(currency),
    }
}

/// Formats a plain amount with a K/M/B/T suffix, e.g. `19.70M`
pub fn format_compact(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v < 0.0 => format!("-{}", compact(-v)),
        Some(v) => compact(v),
        None => "0.00".to_string(),
    }
}

/// Formats a percentage change with an explicit sign, e.g. `+1.23%`
pub fn format_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v >= 0.0 => format!("+{:.2}%", v),
        Some(v) => format!("{:.2}%", v),
        None => "N/A".to_string(),
    }
}

/// Formats a supply as a whole number followed by the uppercase symbol
pub fn format_supply(value: Option<f64>, symbol: &str) -> String {
    let amount = finite(value).unwrap_or(0.0);
    format!("{} {}", group_decimal(amount.abs(), 0, 0), symbol.to_uppercase())
}

/// Formats a maximum supply, `∞` when the supply is unbounded
pub fn format_max_supply(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v > 0.0 => group_decimal(v, 0, 0),
        _ => "∞".to_string(),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn zero_amount(currency: Currency) -> String {
    format!("{}0.00", currency.symbol())
}

fn with_symbol(value: f64, currency: Currency, body: impl Fn(f64) -> String) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, currency.symbol(), body(value.abs()))
}

fn compact(abs: f64) -> String {
    let (divisor, suffix) = if abs >= 1e12 {
        (1e12, "T")
    } else if abs >= 1e9 {
        (1e9, "B")
    } else if abs >= 1e6 {
        (1e6, "M")
    } else if abs >= 1e3 {
        (1e3, "K")
    } else {
        (1.0, "")
    };

    format!("{}{}", group_decimal(abs / divisor, 2, 2), suffix)
}

/// Renders a non-negative number with thousands separators, keeping between
/// `min_frac` and `max_frac` fraction digits
fn group_decimal(abs: f64, min_frac: usize, max_frac: usize) -> String {
    let fixed = format!("{:.*}", max_frac, abs);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac {
        frac.push('0');
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}
