//! Benefit-adjustment solvers for annuity clauses
//!
//! A guaranteed period lowers the monthly annuity by a statutory factor. A
//! temporary increase is funded by scaling the steady-state amount down by the
//! share of capital the extra payments consume. Neither may push the benefit
//! below its statutory floor; hitting the floor is reported, not rejected.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::discount::DiscountCurve;
use crate::affiliate::TemporaryIncreaseClause;
use crate::assumptions::StatutoryParameters;

/// Outcome of an adjustment solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Multiplier applied to the base monthly amount
    pub factor: f64,

    /// True when the floor bound the result
    pub floored: bool,

    /// Present value of the extra payments made during the increase
    pub increment_cost: f64,
}

impl Adjustment {
    fn unadjusted() -> Self {
        Self {
            factor: 1.0,
            floored: false,
            increment_cost: 0.0,
        }
    }

    /// Disclosure text for a floored adjustment
    pub fn advisory(&self) -> Option<String> {
        self.floored.then(|| {
            format!(
                "the requested clause costs more than the capital can absorb; \
                 the benefit was held at the statutory floor of {:.0}%",
                self.factor * 100.0
            )
        })
    }
}

/// Reduction factor for a guaranteed period of `months`
pub fn guaranteed_period_factor(params: &StatutoryParameters, months: u32) -> f64 {
    params.guaranteed_period.factor(months)
}

/// Present value of paying `base × pct` on top of the base for the clause duration
pub fn increment_cost(base: f64, curve: &DiscountCurve, clause: &TemporaryIncreaseClause) -> f64 {
    curve.pv_monthly_stream(base * clause.percent.as_fraction(), clause.months)
}

fn solve(scale: f64, cost: f64, capital: f64, floor: f64) -> Adjustment {
    if cost == 0.0 {
        return Adjustment {
            factor: scale,
            floored: false,
            increment_cost: 0.0,
        };
    }
    if capital <= 0.0 {
        warn!("no capital to fund the increase clause, applying floor {}", floor);
        return Adjustment {
            factor: floor,
            floored: true,
            increment_cost: cost,
        };
    }

    let raw = scale * (1.0 - cost / capital);
    debug!(
        "increase cost {:.2} against capital {:.2}: raw factor {:.6}",
        cost, capital, raw
    );

    if raw < floor {
        warn!("adjustment factor {:.4} below floor {}, floored", raw, floor);
        Adjustment {
            factor: floor,
            floored: true,
            increment_cost: cost,
        }
    } else {
        Adjustment {
            factor: raw,
            floored: false,
            increment_cost: cost,
        }
    }
}

/// Factor that funds a temporary increase out of the annuity capital
pub fn temporary_increase_factor(
    params: &StatutoryParameters,
    base: f64,
    capital: f64,
    curve: &DiscountCurve,
    clause: &TemporaryIncreaseClause,
) -> Adjustment {
    if clause.months == 0 {
        return Adjustment::unadjusted();
    }
    let cost = increment_cost(base, curve, clause);
    solve(1.0, cost, capital, params.increase_floor)
}

/// Factor for an annuity carrying both a guaranteed period and a temporary increase
///
/// The guaranteed-period reduction applies first and the increase is costed
/// on the reduced amount.
pub fn combined_factor(
    params: &StatutoryParameters,
    base: f64,
    capital: f64,
    curve: &DiscountCurve,
    guaranteed_months: u32,
    clause: &TemporaryIncreaseClause,
) -> Adjustment {
    let guaranteed = guaranteed_period_factor(params, guaranteed_months);
    if clause.months == 0 {
        return Adjustment {
            factor: guaranteed.max(params.combined_floor),
            floored: guaranteed < params.combined_floor,
            increment_cost: 0.0,
        };
    }

    let cost = increment_cost(base * guaranteed, curve, clause);
    solve(guaranteed, cost, capital, params.combined_floor)
}
