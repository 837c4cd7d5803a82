//! Discounting at the technical interest rate
//!
//! Two timing conventions are used:
//! - Annual life-contingent payments are valued at mid-year, `(1+i)^-(t+0.5)`
//! - Monthly clause payments are discounted month by month, `(1+i)^-(m/12)`

use serde::{Deserialize, Serialize};

/// Flat discount curve at a single annual rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual effective interest rate
    pub annual_rate: f64,
}

impl DiscountCurve {
    pub fn new(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    /// Discount factor for a payment in the middle of year `t`
    pub fn mid_year_factor(&self, t: u32) -> f64 {
        (1.0 + self.annual_rate).powf(-(t as f64 + 0.5))
    }

    /// Discount factor for a payment at the end of month `month`
    pub fn monthly_factor(&self, month: u32) -> f64 {
        (1.0 + self.annual_rate).powf(-(month as f64) / 12.0)
    }

    /// Present value of `amount` paid monthly for `months` months
    pub fn pv_monthly_stream(&self, amount: f64, months: u32) -> f64 {
        (1..=months).map(|m| amount * self.monthly_factor(m)).sum()
    }

    /// One year of growth at the annual rate
    pub fn accumulate(&self, amount: f64) -> f64 {
        amount * (1.0 + self.annual_rate)
    }
}
