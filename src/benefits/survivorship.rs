//! Survivorship pensions paid to the beneficiaries of a deceased affiliate
//!
//! The reference pension is the one the deceased (the causant) received or
//! would have received. Each eligible beneficiary is paid the reference times
//! their statutory share; the pension is valued on the beneficiaries' own lives.
//!
//! Clause annuities scale every beneficiary's amount by the same adjustment
//! factor. Scheduled withdrawal also projects the draw-down of the fundable
//! balance over the beneficiaries' lives.

use log::{debug, info};

use super::{
    annuity_capital, affiliate_life, dependents, BeneficiaryAmount, BenefitSummary, ReferenceSource,
    ScenarioResult, TemporaryIncrease, UnavailableReason,
};
use crate::affiliate::{CausantTerms, Modality, ScenarioRequest};
use crate::assumptions::Assumptions;
use crate::error::{EngineError, EngineResult, ValuationError};
use crate::projection::{IncreaseSchedule, Projection, ProjectionConfig, ProjectionEngine};
use crate::rounding::{round_amount, round_ratio};
use crate::valuation::{
    combined_factor, guaranteed_period_factor, temporary_increase_factor, CnuCalculator,
};

fn unavailable(request: &ScenarioRequest, modality: Modality, error: ValuationError) -> ScenarioResult {
    let reason = match error {
        ValuationError::NoDependents => UnavailableReason::NoEligibleBeneficiaries,
        ValuationError::Degenerate(_) => UnavailableReason::DegeneratePresentValue,
    };
    info!("survivorship {} unavailable: {}", modality, error);
    ScenarioResult::Unavailable {
        summary: BenefitSummary::zero(request)
            .relabel(modality)
            .with_advisory(reason.advisory()),
        reason,
    }
}

/// How a modality reshapes the survivors' pensions
struct Shaping {
    factor: f64,
    uplift: f64,
    guaranteed_months: Option<u32>,
    increase: Option<TemporaryIncrease>,
    projection: Option<Projection>,
}

fn price(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
    modality: Modality,
) -> EngineResult<ScenarioResult> {
    let params = &request.parameters;
    let statutory = &assumptions.statutory;
    let (dependents, distribution) = dependents(assumptions, request);
    let mut calculator = CnuCalculator::new(&assumptions.mortality, params.interest_rate);

    let cnu = match calculator.survivorship(&dependents) {
        Ok(cnu) => cnu,
        Err(e) => return Ok(unavailable(request, modality, e)),
    };

    let balance = params.accumulated_balance;
    let capital = if modality.is_annuity() {
        annuity_capital(assumptions, balance).0
    } else {
        balance
    };

    let causant = params.causant.unwrap_or_default();
    let (reference, source) = match causant {
        CausantTerms {
            reference_pension: Some(pension),
            ..
        } => (pension, ReferenceSource::Explicit),
        CausantTerms {
            income_base: Some(income),
            ..
        } => (
            income * statutory.survivor_reference_pct,
            ReferenceSource::IncomeBase,
        ),
        _ => match calculator.single_life(affiliate_life(request)) {
            Ok(causant_cnu) => (capital / causant_cnu, ReferenceSource::SelfFunded),
            Err(e) => return Ok(unavailable(request, modality, e)),
        },
    };
    debug!("survivorship reference {:.2} from {:?}", reference, source);

    let base = reference * distribution.total();
    let curve = *calculator.curve();
    let engine = ProjectionEngine::new(ProjectionConfig::from_statutory(statutory));
    let mut advisories: Vec<String> = distribution.advisory().into_iter().collect();

    let mut shaping = Shaping {
        factor: 1.0,
        uplift: 1.0,
        guaranteed_months: None,
        increase: None,
        projection: None,
    };

    match modality {
        Modality::ScheduledWithdrawal => {
            match engine.survivor_withdrawal(&mut calculator, &dependents, capital) {
                Ok(projection) => shaping.projection = Some(projection),
                Err(e) => return Ok(unavailable(request, modality, e)),
            }
        }
        Modality::ImmediateAnnuity => {}
        Modality::GuaranteedAnnuity => {
            shaping.factor = guaranteed_period_factor(statutory, params.guaranteed_months);
            shaping.guaranteed_months = Some(params.guaranteed_months);
        }
        Modality::IncreasedAnnuity | Modality::GuaranteedIncreasedAnnuity => {
            let clause = params
                .increase
                .ok_or(EngineError::MissingTerms("temporary increase"))?;

            let adjustment = if modality == Modality::GuaranteedIncreasedAnnuity {
                shaping.guaranteed_months = Some(params.guaranteed_months);
                combined_factor(statutory, base, capital, &curve, params.guaranteed_months, &clause)
            } else {
                temporary_increase_factor(statutory, base, capital, &curve, &clause)
            };
            advisories.extend(adjustment.advisory());

            let percent = clause.percent.as_fraction();
            let steady = base * adjustment.factor;
            let increased = steady * (1.0 + percent);
            shaping.factor = adjustment.factor;
            shaping.uplift = 1.0 + percent;

            if let Some(lead) = calculator.longest_lived(&dependents) {
                shaping.projection = Some(engine.temporary_increase(
                    calculator.table(&lead.life),
                    lead.life.age,
                    IncreaseSchedule {
                        months: clause.months,
                        increased_amount: increased,
                        steady_amount: steady,
                    },
                ));
            }
            shaping.increase = Some(TemporaryIncrease {
                months: clause.months,
                percent: round_ratio(percent),
                increased_amount: round_amount(increased),
                steady_state_amount: round_amount(steady),
                adjustment_factor: round_ratio(adjustment.factor),
            });
        }
    }

    let breakdown: Vec<BeneficiaryAmount> = distribution
        .shares
        .iter()
        .map(|s| BeneficiaryAmount {
            relationship: s.beneficiary.relationship,
            age: s.beneficiary.person.age,
            share: round_ratio(s.share),
            monthly_amount: round_amount(reference * s.share * shaping.factor * shaping.uplift),
        })
        .collect();
    let monthly: f64 = breakdown.iter().map(|b| b.monthly_amount).sum();

    let life_expectancy = dependents
        .iter()
        .map(|d| calculator.table(&d.life).life_expectancy(d.life.age))
        .fold(0.0, f64::max);

    let required_capital = reference * cnu;
    if capital < required_capital {
        advisories.push(format!(
            "the balance of {:.0} covers {:.0}% of the {:.0} needed to fund these pensions",
            round_amount(capital),
            (capital / required_capital * 100.0).floor(),
            round_amount(required_capital)
        ));
    }

    let summary = BenefitSummary::new(request, monthly, cnu, life_expectancy)
        .relabel(modality)
        .with_advisories(advisories);

    Ok(ScenarioResult::Survivorship {
        summary,
        reference_pension: round_amount(reference),
        reference_source: source,
        breakdown,
        adjustment_factor: round_ratio(shaping.factor),
        guaranteed_months: shaping.guaranteed_months,
        increase: shaping.increase,
        projection: shaping.projection,
    })
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

/// Every survivorship modality the request's terms allow
///
/// Guaranteed modalities need guaranteed months and increase modalities need
/// a clause; modalities missing their terms are left out.
pub fn all_options(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
) -> EngineResult<Vec<ScenarioResult>> {
    let params = &request.parameters;
    Modality::ALL
        .iter()
        .filter(|m| !(m.has_guaranteed_period() && params.guaranteed_months == 0))
        .filter(|m| !(m.has_temporary_increase() && params.increase.is_none()))
        .map(|&modality| price(assumptions, request, modality))
        .collect()
}

/// Dispatch on the request's modality
pub fn calculate(assumptions: &Assumptions, request: &ScenarioRequest) -> EngineResult<ScenarioResult> {
    price(assumptions, request, request.modality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::{
        BenefitCategory, Beneficiary, IncreasePercent, Person, Relationship, ScenarioParameters,
        Sex,
    };
    use crate::assumptions::{Cohort, StatutoryParameters};
    use crate::projection::Phase;
    use crate::valuation::{DiscountCurve, Life};

    fn spouse() -> Beneficiary {
        Beneficiary::new(Person::new(58, Sex::Female), Relationship::Spouse)
    }

    fn request(modality: Modality, causant: CausantTerms, beneficiaries: Vec<Beneficiary>) -> ScenarioRequest {
        ScenarioRequest::new(
            BenefitCategory::Survivorship,
            modality,
            Person::new(60, Sex::Male),
            ScenarioParameters::new(30_000_000.0, 0.03, 37_000.0).with_causant(causant),
        )
        .with_beneficiaries(beneficiaries)
    }

    fn income_base(amount: f64) -> CausantTerms {
        CausantTerms {
            reference_pension: None,
            income_base: Some(amount),
        }
    }

    #[test]
    fn test_spouse_from_income_base() {
        let request = request(Modality::ImmediateAnnuity, income_base(1_000_000.0), vec![spouse()]);
        let result = calculate(Assumptions::statutory(), &request).unwrap();

        match &result {
            ScenarioResult::Survivorship {
                reference_pension,
                reference_source,
                breakdown,
                ..
            } => {
                assert_eq!(*reference_pension, 700_000.0);
                assert_eq!(*reference_source, ReferenceSource::IncomeBase);
                assert_eq!(breakdown.len(), 1);
                assert_eq!(breakdown[0].share, 0.6);
                assert_eq!(breakdown[0].monthly_amount, 420_000.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(result.monthly_benefit(), 420_000.0);
        assert_eq!(
            result.summary().label,
            "Survivorship pension - Immediate life annuity"
        );
    }

    #[test]
    fn test_explicit_reference_wins() {
        let causant = CausantTerms {
            reference_pension: Some(500_000.0),
            income_base: Some(1_000_000.0),
        };
        let request = request(Modality::ScheduledWithdrawal, causant, vec![spouse()]);
        let result = calculate(Assumptions::statutory(), &request).unwrap();

        assert_eq!(result.monthly_benefit(), 300_000.0);
    }

    #[test]
    fn test_self_funded_reference() {
        let assumptions = Assumptions::statutory();
        let request = request(Modality::ScheduledWithdrawal, CausantTerms::default(), vec![spouse()]);
        let causant_cnu = CnuCalculator::new(&assumptions.mortality, 0.03)
            .single_life(Life::new(Cohort::General, Sex::Male, 60))
            .unwrap();

        let result = calculate(assumptions, &request).unwrap();
        match result {
            ScenarioResult::Survivorship {
                reference_pension,
                reference_source,
                ..
            } => {
                assert_eq!(reference_source, ReferenceSource::SelfFunded);
                assert_eq!(reference_pension, (30_000_000.0 / causant_cnu).round());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_cnu_values_beneficiaries() {
        let assumptions = Assumptions::statutory();
        let request = request(Modality::ImmediateAnnuity, income_base(1_000_000.0), vec![spouse()]);
        let spouse_cnu = CnuCalculator::new(&assumptions.mortality, 0.03)
            .single_life(Life::new(Cohort::General, Sex::Female, 58))
            .unwrap();

        let result = calculate(assumptions, &request).unwrap();
        assert_eq!(
            result.summary().necessary_unit_capital,
            round_ratio(0.6 * spouse_cnu)
        );
        assert_eq!(
            result.summary().life_expectancy_years,
            assumptions.mortality.table(Cohort::General, Sex::Female).life_expectancy(58)
        );
    }

    #[test]
    fn test_no_eligible_beneficiaries_is_unavailable() {
        let mut assumptions = Assumptions::built_in();
        assumptions.statutory = StatutoryParameters {
            child_age_limit: Some(24),
            ..StatutoryParameters::default()
        };
        let adult_child = Beneficiary::new(Person::new(30, Sex::Male), Relationship::Child);

        for beneficiaries in [vec![], vec![adult_child]] {
            let request = request(Modality::ImmediateAnnuity, income_base(1_000_000.0), beneficiaries);
            let result = calculate(&assumptions, &request).unwrap();

            assert!(!result.is_usable());
            assert_eq!(result.monthly_benefit(), 0.0);
            match result {
                ScenarioResult::Unavailable { reason, summary } => {
                    assert_eq!(reason, UnavailableReason::NoEligibleBeneficiaries);
                    assert_eq!(summary.advisories.len(), 1);
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_adult_children_share_by_default() {
        let children: Vec<_> = (0..3)
            .map(|_| Beneficiary::new(Person::new(30, Sex::Female), Relationship::Child))
            .collect();
        let request = request(Modality::ImmediateAnnuity, income_base(1_000_000.0), children);

        let result = calculate(Assumptions::statutory(), &request).unwrap();
        assert!(result.is_usable());
        assert_eq!(result.monthly_benefit(), 3.0 * 105_000.0);
    }

    #[test]
    fn test_guaranteed_annuity_scales_every_beneficiary() {
        let child = Beneficiary::new(Person::new(12, Sex::Male), Relationship::Child);
        let mut request = request(
            Modality::GuaranteedAnnuity,
            income_base(1_000_000.0),
            vec![spouse(), child],
        );
        request.parameters.guaranteed_months = 120;

        let result = guaranteed_annuity(Assumptions::statutory(), &request).unwrap();
        match &result {
            ScenarioResult::Survivorship {
                breakdown,
                adjustment_factor,
                guaranteed_months,
                projection,
                ..
            } => {
                assert_eq!(*adjustment_factor, 0.955);
                assert_eq!(*guaranteed_months, Some(120));
                assert_eq!(breakdown[0].monthly_amount, 334_250.0);
                assert_eq!(breakdown[1].monthly_amount, 100_275.0);
                assert!(projection.is_none());
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(result.monthly_benefit(), 334_250.0 + 100_275.0);
    }

    #[test]
    fn test_increased_annuity_pays_increase_first() {
        let mut request = request(Modality::IncreasedAnnuity, income_base(1_000_000.0), vec![spouse()]);
        request.parameters = request
            .parameters
            .with_increase(24, IncreasePercent::WholePercent(50.0));
        let clause = request.parameters.increase.unwrap();

        let statutory = &Assumptions::statutory().statutory;
        let base = 700_000.0 * 0.6;
        let factor = temporary_increase_factor(
            statutory,
            base,
            annuity_capital(Assumptions::statutory(), 30_000_000.0).0,
            &DiscountCurve::new(0.03),
            &clause,
        )
        .factor;

        let result = increased_annuity(Assumptions::statutory(), &request).unwrap();
        match &result {
            ScenarioResult::Survivorship {
                breakdown,
                increase,
                projection,
                ..
            } => {
                let increase = increase.unwrap();
                assert!(factor < 1.0);
                assert_eq!(increase.adjustment_factor, round_ratio(factor));
                assert_eq!(increase.steady_state_amount, round_amount(base * factor));
                assert_eq!(breakdown[0].monthly_amount, round_amount(700_000.0 * 0.6 * factor * 1.5));

                let projection = projection.as_ref().unwrap();
                assert_eq!(projection.points[0].phase, Phase::Increase);
                assert_eq!(projection.points[2].phase, Phase::Steady);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_scheduled_withdrawal_projects_balance() {
        let request = request(Modality::ScheduledWithdrawal, income_base(1_000_000.0), vec![spouse()]);
        let result = scheduled_withdrawal(Assumptions::statutory(), &request).unwrap();

        let projection = result.projection().unwrap();
        assert_eq!(projection.first().unwrap().remaining_balance, 30_000_000.0);
        assert_eq!(projection.first().unwrap().age, 58);
        assert!(projection.last().unwrap().remaining_balance < 30_000_000.0);

        let annuity = immediate_annuity(Assumptions::statutory(), &request).unwrap();
        assert!(annuity.projection().is_none());
    }

    #[test]
    fn test_all_options() {
        let mut request = request(Modality::ScheduledWithdrawal, CausantTerms::default(), vec![spouse()]);
        let options = all_options(Assumptions::statutory(), &request).unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].summary().modality, Modality::ScheduledWithdrawal);
        assert_eq!(options[1].summary().modality, Modality::ImmediateAnnuity);

        // Premium deducted before the self-funded reference is computed
        assert!(options[1].monthly_benefit() < options[0].monthly_benefit());

        request.parameters = request
            .parameters
            .with_guaranteed_months(120)
            .with_increase(24, IncreasePercent::Fraction(0.2));
        let options = all_options(Assumptions::statutory(), &request).unwrap();
        let modalities: Vec<_> = options.iter().map(|o| o.summary().modality).collect();
        assert_eq!(modalities, Modality::ALL.to_vec());
    }

    #[test]
    fn test_shortfall_and_normalization_disclosed() {
        let mut beneficiaries = vec![spouse()];
        beneficiaries.extend((0..4).map(|i| {
            Beneficiary::new(Person::new(5 + i, Sex::Male), Relationship::Child)
        }));
        let request = request(Modality::ImmediateAnnuity, income_base(10_000_000.0), beneficiaries);

        let result = calculate(Assumptions::statutory(), &request).unwrap();
        let advisories = &result.summary().advisories;

        assert_eq!(advisories.len(), 2);
        assert!(advisories[0].contains("scaled down"));
        assert!(advisories[1].contains("needed to fund"));
    }
}
