//! Year-by-year projection output

use serde::{Deserialize, Serialize};

/// Payment phase of a projected year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Temporary increase still being paid
    Increase,
    /// Increase expired, steady-state amount
    Steady,
    /// Scheduled withdrawal drawing down the balance
    Declining,
}

/// A single projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Years from the start of payments (0-indexed)
    pub year_index: u32,

    /// Affiliate's age in this year
    pub age: u32,

    pub monthly_benefit: f64,

    /// Balance at the start of the year (zero when an insurer holds the capital)
    pub remaining_balance: f64,

    /// Total paid up to and including this year
    pub cumulative_withdrawn: f64,

    pub phase: Phase,
}

/// Complete projection for one scenario
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Projection {
    pub points: Vec<ProjectionPoint>,

    /// Balance left after the last projected year
    pub final_balance: f64,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ProjectionPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ProjectionPoint> {
        self.points.last()
    }

    /// Total paid over the projected years
    pub fn total_paid(&self) -> f64 {
        self.last().map(|p| p.cumulative_withdrawn).unwrap_or(0.0)
    }
}
