//! Disability pensions
//!
//! The reference amount is the income base times the statutory percentage for
//! the degree of disability. An insured affiliate receives the reference
//! amount, with the insurer contributing whatever capital the balance lacks.
//! An uninsured affiliate receives only what the balance funds. Disability
//! claims are always valued on the disabled-lives tables.

use log::{info, warn};

use super::{DisabilityCoverage, Funding, Pricing, ScenarioResult, UnavailableReason};
use crate::affiliate::{DisabilityTerms, Modality, ScenarioRequest};
use crate::assumptions::Assumptions;
use crate::error::{EngineError, EngineResult};
use crate::rounding::round_amount;

/// Funding of a disability pension given the CNU for the chosen modality
pub fn coverage(
    assumptions: &Assumptions,
    terms: &DisabilityTerms,
    modality: Modality,
    balance: f64,
    cnu: f64,
) -> (DisabilityCoverage, Vec<String>) {
    let own = Funding::self_funded(assumptions, modality, balance, cnu);
    let reference = terms.income_base * assumptions.statutory.disability_pct(terms.degree);
    let required_capital = reference * cnu;

    let shortfall = (required_capital - own.capital).max(0.0);
    let surplus = (own.base_monthly - reference).max(0.0);

    let mut advisories = Vec::new();
    if terms.insured {
        if shortfall > 0.0 {
            info!(
                "disability reference {:.0} needs capital {:.0}, insurer adds {:.0}",
                reference, required_capital, shortfall
            );
            advisories.push(format!(
                "the balance funds {:.0} of the {:.0} reference amount; the insurer contributes {:.0} of additional capital",
                round_amount(own.base_monthly),
                round_amount(reference),
                round_amount(shortfall)
            ));
        } else if surplus > 0.0 {
            advisories.push(format!(
                "the balance funds {:.0} above the reference amount",
                round_amount(surplus)
            ));
        }
    } else if shortfall > 0.0 {
        warn!("uninsured disability claim is below its reference amount");
        advisories.push(format!(
            "not insured: the benefit is limited to what the balance funds, {:.0} below the reference amount",
            round_amount(reference - own.base_monthly)
        ));
    }

    let coverage = DisabilityCoverage {
        degree: terms.degree,
        income_base: round_amount(terms.income_base),
        reference_amount: round_amount(reference),
        self_funded_amount: round_amount(own.base_monthly),
        insured: terms.insured,
        required_capital: round_amount(required_capital),
        shortfall: round_amount(shortfall),
        surplus: round_amount(surplus),
    };

    (coverage, advisories)
}

fn price(
    assumptions: &Assumptions,
    request: &ScenarioRequest,
    modality: Modality,
) -> EngineResult<ScenarioResult> {
    let terms = request
        .parameters
        .disability
        .ok_or(EngineError::MissingTerms("disability"))?;

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

    let balance = request.parameters.accumulated_balance;
    let (coverage, advisories) = coverage(assumptions, &terms, modality, balance, cnu);
    let own = Funding::self_funded(assumptions, modality, balance, cnu);

    let funding = if terms.insured {
        let reference = terms.income_base * assumptions.statutory.disability_pct(terms.degree);
        Funding {
            capital: reference * cnu,
            base_monthly: reference,
            premium: own.premium,
            disability: Some(coverage),
            advisories,
        }
    } else {
        Funding {
            disability: Some(coverage),
            advisories,
            ..own
        }
    };

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
    use crate::affiliate::{BenefitCategory, DisabilityDegree, Person, ScenarioParameters, Sex};
    use crate::assumptions::Cohort;
    use crate::valuation::{CnuCalculator, Life};

    fn terms(degree: DisabilityDegree, insured: bool) -> DisabilityTerms {
        DisabilityTerms {
            income_base: 800_000.0,
            degree,
            insured,
        }
    }

    fn request(modality: Modality, balance: f64, terms: DisabilityTerms) -> ScenarioRequest {
        ScenarioRequest::new(
            BenefitCategory::Disability,
            modality,
            Person::new(45, Sex::Male),
            ScenarioParameters::new(balance, 0.03, 37_000.0)
                .with_guaranteed_months(120)
                .with_disability(terms),
        )
    }

    #[test]
    fn test_insured_total_disability_pays_reference() {
        let assumptions = Assumptions::statutory();
        let request = request(
            Modality::ScheduledWithdrawal,
            20_000_000.0,
            terms(DisabilityDegree::Total, true),
        );

        let result = calculate(assumptions, &request).unwrap();
        assert_eq!(result.monthly_benefit(), 560_000.0);

        let coverage = result.disability().unwrap();
        assert_eq!(coverage.reference_amount, 560_000.0);
        assert!(coverage.shortfall > 0.0);
        assert!(coverage.self_funded_amount < 560_000.0);
        assert_eq!(result.summary().advisories.len(), 1);
        assert_eq!(result.projection().unwrap().first().unwrap().monthly_benefit, 560_000.0);
    }

    #[test]
    fn test_degree_percentages() {
        let assumptions = Assumptions::statutory();
        for (degree, expected) in [
            (DisabilityDegree::Total, 560_000.0),
            (DisabilityDegree::TwoThirds, 400_000.0),
            (DisabilityDegree::Partial, 280_000.0),
        ] {
            let request = request(Modality::ImmediateAnnuity, 1_000_000.0, terms(degree, true));
            assert_eq!(calculate(assumptions, &request).unwrap().monthly_benefit(), expected);
        }
    }

    #[test]
    fn test_uninsured_is_self_funded() {
        let assumptions = Assumptions::statutory();
        let request = request(
            Modality::ImmediateAnnuity,
            20_000_000.0,
            terms(DisabilityDegree::Total, false),
        );
        let cnu = CnuCalculator::new(&assumptions.mortality, 0.03)
            .single_life(Life::new(Cohort::Disabled, Sex::Male, 45))
            .unwrap();

        let result = calculate(assumptions, &request).unwrap();
        assert_eq!(result.monthly_benefit(), (20_000_000.0 * 0.97 / cnu).round());
        assert!(!result.disability().unwrap().insured);
        assert_eq!(result.summary().necessary_unit_capital, (cnu * 10_000.0).round() / 10_000.0);
    }

    #[test]
    fn test_surplus_is_disclosed() {
        let assumptions = Assumptions::statutory();
        let request = request(
            Modality::ImmediateAnnuity,
            500_000_000.0,
            terms(DisabilityDegree::Partial, true),
        );

        let result = calculate(assumptions, &request).unwrap();
        let coverage = result.disability().unwrap();
        assert_eq!(coverage.shortfall, 0.0);
        assert!(coverage.surplus > 0.0);
        assert_eq!(result.monthly_benefit(), 280_000.0);
        assert!(result.summary().advisories[0].contains("above the reference"));
    }

    #[test]
    fn test_missing_terms_rejected() {
        let mut request = request(
            Modality::ImmediateAnnuity,
            1_000_000.0,
            terms(DisabilityDegree::Total, true),
        );
        request.parameters.disability = None;

        let result = calculate(Assumptions::statutory(), &request);
        assert!(matches!(result, Err(EngineError::MissingTerms("disability"))));
    }

    #[test]
    fn test_guaranteed_period_on_reference() {
        let assumptions = Assumptions::statutory();
        let request = request(
            Modality::GuaranteedAnnuity,
            20_000_000.0,
            terms(DisabilityDegree::Total, true),
        );

        let result = calculate(assumptions, &request).unwrap();
        assert_eq!(result.monthly_benefit(), (560_000.0_f64 * 0.955).round());
    }
}
