//! Output rounding conventions

/// Monetary amounts: nearest currency unit
pub fn round_amount(value: f64) -> f64 {
    value.round()
}

/// Amounts expressed in index units: 2 decimals
pub fn round_index(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shares, rates, factors and CNU: 4 decimals
pub fn round_ratio(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
