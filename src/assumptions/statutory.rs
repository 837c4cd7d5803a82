//! Statutory percentages, premiums, clause factors and projection horizons

use serde::{Deserialize, Serialize};

use crate::affiliate::DisabilityDegree;
use crate::error::{EngineError, EngineResult};

/// Guaranteed-period reduction factors by number of guaranteed months
///
/// Below the first breakpoint no reduction applies; between breakpoints the
/// factor is interpolated linearly; at or beyond the last breakpoint it is
/// held at the last factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(u32, f64)>", into = "Vec<(u32, f64)>")]
pub struct GuaranteedPeriodTable {
    /// (months, factor), strictly increasing in months
    breakpoints: Vec<(u32, f64)>,
}

impl GuaranteedPeriodTable {
    pub fn new(mut breakpoints: Vec<(u32, f64)>) -> EngineResult<Self> {
        if breakpoints.is_empty() {
            return Err(EngineError::invalid("guaranteed-period table is empty"));
        }
        breakpoints.sort_by_key(|&(months, _)| months);

        if breakpoints.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(EngineError::invalid(
                "guaranteed-period table repeats a breakpoint",
            ));
        }
        if let Some(&(months, factor)) = breakpoints
            .iter()
            .find(|(_, f)| !(*f > 0.0 && *f <= 1.0))
        {
            return Err(EngineError::invalid(format!(
                "guaranteed-period factor {} at {} months is outside (0, 1]",
                factor, months
            )));
        }

        Ok(Self { breakpoints })
    }

    pub fn breakpoints(&self) -> &[(u32, f64)] {
        &self.breakpoints
    }

    /// Reduction factor for a guaranteed period of `months`
    pub fn factor(&self, months: u32) -> f64 {
        let (first_months, _) = self.breakpoints[0];
        if months < first_months {
            return 1.0;
        }

        let (last_months, last_factor) = self.breakpoints[self.breakpoints.len() - 1];
        if months >= last_months {
            return last_factor;
        }

        for pair in self.breakpoints.windows(2) {
            let (lo_months, lo_factor) = pair[0];
            let (hi_months, hi_factor) = pair[1];
            if months >= lo_months && months < hi_months {
                let fraction = (months - lo_months) as f64 / (hi_months - lo_months) as f64;
                return lo_factor + (hi_factor - lo_factor) * fraction;
            }
        }

        last_factor
    }
}

impl Default for GuaranteedPeriodTable {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                (60, 0.985),
                (120, 0.955),
                (180, 0.915),
                (240, 0.870),
                (300, 0.820),
            ],
        }
    }
}

impl TryFrom<Vec<(u32, f64)>> for GuaranteedPeriodTable {
    type Error = EngineError;

    fn try_from(breakpoints: Vec<(u32, f64)>) -> Result<Self, Self::Error> {
        Self::new(breakpoints)
    }
}

impl From<GuaranteedPeriodTable> for Vec<(u32, f64)> {
    fn from(table: GuaranteedPeriodTable) -> Self {
        table.breakpoints
    }
}

/// Statutory constants used by the benefit formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatutoryParameters {
    /// Insurance premium deducted from the balance before buying an annuity
    pub annuity_premium_rate: f64,

    /// Share of the income base paid for total disability
    pub disability_total_pct: f64,

    /// Share of the income base paid for two-thirds disability
    pub disability_two_thirds_pct: f64,

    /// Share of the income base paid for partial disability
    pub disability_partial_pct: f64,

    /// Share of the deceased's income base used as reference pension
    pub survivor_reference_pct: f64,

    /// Spouse or partner share when no children are entitled
    pub partner_share_without_children: f64,

    /// Spouse or partner share when children are entitled
    pub partner_share_with_children: f64,

    pub child_share: f64,

    /// Paid only when no spouse, partner or child is entitled
    pub parent_share: f64,

    /// When set, children are entitled only below this age unless disabled
    pub child_age_limit: Option<u32>,

    pub guaranteed_period: GuaranteedPeriodTable,

    /// Lowest reduction factor for the temporary-increase clause
    pub increase_floor: f64,

    /// Lowest reduction factor when both clauses are combined
    pub combined_floor: f64,

    /// Maximum years modeled for scheduled withdrawals
    pub withdrawal_horizon_years: u32,

    /// Years modeled for temporary-increase annuities
    pub increase_horizon_years: u32,
}

impl Default for StatutoryParameters {
    fn default() -> Self {
        Self {
            annuity_premium_rate: 0.03,
            disability_total_pct: 0.70,
            disability_two_thirds_pct: 0.50,
            disability_partial_pct: 0.35,
            survivor_reference_pct: 0.70,
            partner_share_without_children: 0.60,
            partner_share_with_children: 0.50,
            child_share: 0.15,
            parent_share: 0.15,
            child_age_limit: None,
            guaranteed_period: GuaranteedPeriodTable::default(),
            increase_floor: 0.50,
            combined_floor: 0.45,
            withdrawal_horizon_years: 45,
            increase_horizon_years: 30,
        }
    }
}

impl StatutoryParameters {
    /// Percentage of the income base paid for a disability degree
    pub fn disability_pct(&self, degree: DisabilityDegree) -> f64 {
        match degree {
            DisabilityDegree::Total => self.disability_total_pct,
            DisabilityDegree::TwoThirds => self.disability_two_thirds_pct,
            DisabilityDegree::Partial => self.disability_partial_pct,
        }
    }
}
