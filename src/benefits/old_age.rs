//! Old-age pensions funded entirely by the affiliate's balance

use super::{Funding, Pricing, ScenarioResult, UnavailableReason};
use crate::affiliate::{Modality, ScenarioRequest};
use crate::assumptions::Assumptions;
use crate::error::EngineResult;

fn price(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
    modality: Modality,
) -> EngineResult<ScenarioResult> {
    let mut pricing = Pricing::new(assumptions, request);
    let cnu = match pricing.cnu() {
        Ok(cnu) => cnu,
        Err(_) => {
            return Ok(ScenarioResult::unavailable(
                request,
                UnavailableReason::DegeneratePresentValue,
            ))
        }
    };

    let funding = Funding::self_funded(
        assumptions,
        modality,
        request.parameters.accumulated_balance,
        cnu,
    );
    pricing.payout(modality, cnu, funding)
}

pub fn scheduled_withdrawal(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<ScenarioResult> {
    price(assumptions, request, Modality::ScheduledWithdrawal)
}

pub fn immediate_annuity(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<ScenarioResult> {
    price(assumptions, request, Modality::ImmediateAnnuity)
}

pub fn guaranteed_annuity(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<ScenarioResult> {
    price(assumptions, request, Modality::GuaranteedAnnuity)
}

pub fn increased_annuity(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<ScenarioResult> {
    price(assumptions, request, Modality::IncreasedAnnuity)
}

pub fn guaranteed_increased_annuity(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<ScenarioResult> {
    price(assumptions, request, Modality::GuaranteedIncreasedAnnuity)
}

/// Dispatch on the request's modality
pub fn calculate(assumptions: &Assumptions, request: &ScenarioRequest) -> EngineResult<ScenarioResult> {
    match request.modality {
        Modality::ScheduledWithdrawal => scheduled_withdrawal(assumptions, request),
        Modality::ImmediateAnnuity => immediate_annuity(assumptions, request),
        Modality::GuaranteedAnnuity => guaranteed_annuity(assumptions, request),
        Modality::IncreasedAnnuity => increased_annuity(assumptions, request),
        Modality::GuaranteedIncreasedAnnuity => guaranteed_increased_annuity(assumptions, request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::{
        BenefitCategory, Beneficiary, IncreasePercent, Person, Relationship, ScenarioParameters,
        Sex,
    };
    use crate::assumptions::Cohort;
    use crate::valuation::{CnuCalculator, Life};

    const BALANCE: f64 = 50_000_000.0;
    const RATE: f64 = 0.0341;

    fn request(modality: Modality) -> ScenarioRequest {
        ScenarioRequest::new(
            BenefitCategory::OldAge,
            modality,
            Person::new(65, Sex::Male),
            ScenarioParameters::new(BALANCE, RATE, 37_000.0)
                .with_guaranteed_months(120)
                .with_increase(24, IncreasePercent::WholePercent(50.0)),
        )
    }

    fn cnu_65_male() -> f64 {
        let assumptions = Assumptions::statutory();
        CnuCalculator::new(&assumptions.mortality, RATE)
            .single_life(Life::new(Cohort::General, Sex::Male, 65))
            .unwrap()
    }

    #[test]
    fn test_scheduled_withdrawal() {
        let result = scheduled_withdrawal(Assumptions::statutory(), &request(Modality::ScheduledWithdrawal)).unwrap();
        let summary = result.summary();

        assert_eq!(summary.monthly_benefit, (BALANCE / cnu_65_male()).round());
        assert_eq!(summary.annual_benefit, summary.monthly_benefit * 12.0);
        assert_eq!(summary.life_expectancy_years, 21.0);
        assert!(summary.monthly_benefit > 0.0);

        let projection = result.projection().unwrap();
        assert_eq!(projection.first().unwrap().remaining_balance, BALANCE);
        assert_eq!(projection.first().unwrap().monthly_benefit, summary.monthly_benefit);
    }

    #[test]
    fn test_immediate_annuity_deducts_premium() {
        let result = immediate_annuity(Assumptions::statutory(), &request(Modality::ImmediateAnnuity)).unwrap();

        assert_eq!(result.monthly_benefit(), (BALANCE * 0.97 / cnu_65_male()).round());
        match result {
            ScenarioResult::ImmediateAnnuity { premium_deducted, .. } => {
                assert_eq!(premium_deducted, 1_500_000.0)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_guaranteed_period_reduces_benefit() {
        let assumptions = Assumptions::statutory();
        let annuity = immediate_annuity(assumptions, &request(Modality::ImmediateAnnuity)).unwrap();
        let guaranteed = guaranteed_annuity(assumptions, &request(Modality::GuaranteedAnnuity)).unwrap();

        assert_eq!(
            guaranteed.monthly_benefit(),
            (BALANCE * 0.97 / cnu_65_male() * 0.955).round()
        );
        assert!(guaranteed.monthly_benefit() < annuity.monthly_benefit());
    }

    #[test]
    fn test_increased_annuity() {
        let assumptions = Assumptions::statutory();
        let annuity = immediate_annuity(assumptions, &request(Modality::ImmediateAnnuity)).unwrap();
        let result = increased_annuity(assumptions, &request(Modality::IncreasedAnnuity)).unwrap();

        match &result {
            ScenarioResult::TemporaryIncrease {
                increase,
                guaranteed_months,
                projection,
                ..
            } => {
                assert_eq!(increase.months, 24);
                assert_eq!(increase.percent, 0.5);
                assert!(increase.adjustment_factor < 1.0 && increase.adjustment_factor > 0.5);
                assert!(increase.steady_state_amount < annuity.monthly_benefit());
                assert!(increase.increased_amount > annuity.monthly_benefit());
                assert_eq!(result.monthly_benefit(), increase.increased_amount);
                assert!(guaranteed_months.is_none());
                assert_eq!(projection.len(), 30);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_combined_clauses_cost_more_than_increase_alone() {
        let assumptions = Assumptions::statutory();
        let increased = increased_annuity(assumptions, &request(Modality::IncreasedAnnuity)).unwrap();
        let combined =
            guaranteed_increased_annuity(assumptions, &request(Modality::GuaranteedIncreasedAnnuity)).unwrap();

        assert!(combined.monthly_benefit() < increased.monthly_benefit());
        match combined {
            ScenarioResult::TemporaryIncrease {
                guaranteed_months,
                guaranteed_factor,
                ..
            } => {
                assert_eq!(guaranteed_months, Some(120));
                assert_eq!(guaranteed_factor, Some(0.955));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_spouse_lowers_benefit() {
        let assumptions = Assumptions::statutory();
        let alone = immediate_annuity(assumptions, &request(Modality::ImmediateAnnuity)).unwrap();
        let with_spouse = immediate_annuity(
            assumptions,
            &request(Modality::ImmediateAnnuity).with_beneficiaries(vec![Beneficiary::new(
                Person::new(62, Sex::Female),
                Relationship::Spouse,
            )]),
        )
        .unwrap();

        assert!(with_spouse.monthly_benefit() < alone.monthly_benefit());
        assert!(
            with_spouse.summary().necessary_unit_capital > alone.summary().necessary_unit_capital
        );
    }

    #[test]
    fn test_repeated_calls_identical() {
        let assumptions = Assumptions::statutory();
        for modality in Modality::ALL {
            let request = request(modality);
            let first = calculate(assumptions, &request).unwrap();
            let second = calculate(assumptions, &request).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_zero_balance_pays_nothing() {
        let mut request = request(Modality::ImmediateAnnuity);
        request.parameters.accumulated_balance = 0.0;

        let result = calculate(Assumptions::statutory(), &request).unwrap();
        assert!(result.is_usable());
        assert_eq!(result.monthly_benefit(), 0.0);
    }
}
