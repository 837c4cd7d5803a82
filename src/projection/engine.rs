//! Year-by-year benefit projections
//!
//! Scheduled withdrawal re-values the CNU at each attained age and draws
//! `balance / CNU` per month until the balance is exhausted or the horizon
//! ends. Increased annuities pay the increased amount while the clause runs
//! and the steady-state amount afterwards.

use log::debug;

use super::points::{Phase, Projection, ProjectionPoint};
use super::state::WithdrawalState;
use crate::assumptions::{MortalityTable, StatutoryParameters};
use crate::error::ValuationError;
use crate::rounding::round_amount;
use crate::valuation::{CnuCalculator, Dependent, Life};

/// Horizons for a projection run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Maximum years projected for scheduled withdrawal
    pub withdrawal_horizon_years: u32,

    /// Maximum years projected for increased annuities
    pub increase_horizon_years: u32,
}

impl ProjectionConfig {
    pub fn from_statutory(params: &StatutoryParameters) -> Self {
        Self {
            withdrawal_horizon_years: params.withdrawal_horizon_years,
            increase_horizon_years: params.increase_horizon_years,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::from_statutory(&StatutoryParameters::default())
    }
}

/// Monthly amounts of an increased annuity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncreaseSchedule {
    /// Months paid at the increased amount
    pub months: u32,

    pub increased_amount: f64,

    pub steady_amount: f64,
}

pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a scheduled withdrawal from `balance`
    ///
    /// The first point carries the starting balance; later points carry the
    /// balance left after the prior year's withdrawals plus interest.
    pub fn scheduled_withdrawal(
        &self,
        calculator: &mut CnuCalculator<'_>,
        affiliate: Life,
        dependents: &[Dependent],
        balance: f64,
    ) -> Result<Projection, ValuationError> {
        let years = self
            .config
            .withdrawal_horizon_years
            .min(calculator.table(&affiliate).horizon(affiliate.age));
        let state = WithdrawalState::new(affiliate, dependents, balance);

        self.draw_down(calculator, state, years, |calc, state| {
            calc.for_affiliate(state.affiliate, &state.dependents)
        })
    }

    /// Project the draw-down of a deceased affiliate's balance among survivors
    ///
    /// Each year pays `balance × Σ share / CNU`, with the CNU weighting every
    /// beneficiary's single-life value by their share. Ages are those of the
    /// beneficiary whose table runs longest.
    pub fn survivor_withdrawal(
        &self,
        calculator: &mut CnuCalculator<'_>,
        dependents: &[Dependent],
        balance: f64,
    ) -> Result<Projection, ValuationError> {
        let lead = calculator
            .longest_lived(dependents)
            .ok_or(ValuationError::NoDependents)?;
        let years = self
            .config
            .withdrawal_horizon_years
            .min(calculator.table(&lead.life).horizon(lead.life.age));
        let total_share: f64 = dependents.iter().map(|d| d.share).sum();
        let state = WithdrawalState::new(lead.life, dependents, balance);

        self.draw_down(calculator, state, years, |calc, state| {
            Ok(calc.survivorship(&state.dependents)? / total_share)
        })
    }

    /// Withdraw `12 × balance / unit CNU` a year until depleted or `years` pass
    fn draw_down<'a, F>(
        &self,
        calculator: &mut CnuCalculator<'a>,
        mut state: WithdrawalState,
        years: u32,
        mut unit_cnu: F,
    ) -> Result<Projection, ValuationError>
    where
        F: FnMut(&mut CnuCalculator<'a>, &WithdrawalState) -> Result<f64, ValuationError>,
    {
        let curve = *calculator.curve();
        let mut projection = Projection::default();

        for _year in 0..=years {
            if state.year_index > 0 && state.is_depleted() {
                break;
            }

            let cnu = unit_cnu(calculator, &state)?;
            let annual = (12.0 * state.balance / cnu).min(state.balance);
            state.withdraw(annual);

            projection.points.push(ProjectionPoint {
                year_index: state.year_index,
                age: state.affiliate.age,
                monthly_benefit: round_amount(annual / 12.0),
                remaining_balance: round_amount(state.balance),
                cumulative_withdrawn: round_amount(state.cumulative_withdrawn),
                phase: Phase::Declining,
            });

            state.advance_year(annual, &curve);
        }

        projection.final_balance = round_amount(state.balance);
        debug!(
            "withdrawal projected {} years, final balance {:.0}, cache hit rate {:.2}",
            projection.len(),
            projection.final_balance,
            calculator.cache().hit_rate()
        );

        Ok(projection)
    }

    /// Project an increased annuity paid on a life aged `age`
    pub fn temporary_increase(
        &self,
        table: &MortalityTable,
        age: u32,
        schedule: IncreaseSchedule,
    ) -> Projection {
        let years = self
            .config
            .increase_horizon_years
            .min(table.horizon(age))
            .max(1);

        let mut cumulative = 0.0;
        let points = (0..years)
            .map(|year| {
                let elapsed = year * 12;
                let increase_months = schedule.months.saturating_sub(elapsed).min(12);
                let steady_months = 12 - increase_months;
                cumulative += increase_months as f64 * schedule.increased_amount
                    + steady_months as f64 * schedule.steady_amount;

                let (phase, monthly) = if elapsed < schedule.months {
                    (Phase::Increase, schedule.increased_amount)
                } else {
                    (Phase::Steady, schedule.steady_amount)
                };

                ProjectionPoint {
                    year_index: year,
                    age: age.saturating_add(year),
                    monthly_benefit: round_amount(monthly),
                    remaining_balance: 0.0,
                    cumulative_withdrawn: round_amount(cumulative),
                    phase,
                }
            })
            .collect();

        Projection {
            points,
            final_balance: 0.0,
        }
    }
}
