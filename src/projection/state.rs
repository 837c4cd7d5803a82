//! Running state of a scheduled-withdrawal projection

use crate::valuation::{Dependent, DiscountCurve, Life};

/// State of the affiliate's account at the start of a projection year
#[derive(Debug, Clone)]
pub struct WithdrawalState {
    /// Current projection year (0-indexed)
    pub year_index: u32,

    /// Affiliate at the current age
    pub affiliate: Life,

    /// Dependents at their current ages
    pub dependents: Vec<Dependent>,

    /// Beginning of year balance
    pub balance: f64,

    /// Total withdrawn so far
    pub cumulative_withdrawn: f64,
}

impl WithdrawalState {
    pub fn new(affiliate: Life, dependents: &[Dependent], balance: f64) -> Self {
        Self {
            year_index: 0,
            affiliate,
            dependents: dependents.to_vec(),
            balance,
            cumulative_withdrawn: 0.0,
        }
    }

    /// Record this year's withdrawal
    pub fn withdraw(&mut self, annual: f64) {
        self.cumulative_withdrawn += annual;
    }

    /// Accrue interest on what remains after `annual` and move everyone a year older
    pub fn advance_year(&mut self, annual: f64, curve: &DiscountCurve) {
        self.balance = curve.accumulate((self.balance - annual).max(0.0));
        self.year_index += 1;
        self.affiliate = self.affiliate.aged(1);
        for dependent in &mut self.dependents {
            *dependent = dependent.aged(1);
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.balance < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::Sex;
    use crate::assumptions::Cohort;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_year() {
        let affiliate = Life::new(Cohort::General, Sex::Male, 65);
        let spouse = Dependent {
            life: Life::new(Cohort::General, Sex::Female, 60),
            share: 0.6,
        };
        let mut state = WithdrawalState::new(affiliate, &[spouse], 1_000.0);

        state.withdraw(100.0);
        state.advance_year(100.0, &DiscountCurve::new(0.05));

        assert_eq!(state.year_index, 1);
        assert_eq!(state.affiliate.age, 66);
        assert_eq!(state.dependents[0].life.age, 61);
        assert_relative_eq!(state.balance, 945.0, max_relative = 1e-12);
        assert_eq!(state.cumulative_withdrawn, 100.0);
        assert!(!state.is_depleted());
    }

    #[test]
    fn test_overdraw_depletes() {
        let mut state = WithdrawalState::new(Life::new(Cohort::General, Sex::Male, 90), &[], 500.0);
        state.advance_year(600.0, &DiscountCurve::new(0.03));
        assert_eq!(state.balance, 0.0);
        assert!(state.is_depleted());
    }
}
