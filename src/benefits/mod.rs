//! Benefit formula library
//!
//! One function per benefit category and payment modality. Old-age and
//! disability pensions share the same payout path once the capital and base
//! monthly amount are known:
//! - scheduled withdrawal pays `balance / CNU` and projects the draw-down
//! - annuities pay `balance × (1 − premium) / CNU`
//! - clause annuities apply the adjustment solvers on top of the annuity base

pub mod disability;
pub mod distribution;
pub mod old_age;
pub mod survivorship;
mod types;

pub use distribution::{distribute, BeneficiaryShare, Distribution};
pub use types::{
    label, BeneficiaryAmount, BenefitSummary, DisabilityCoverage, ReferenceSource, ScenarioResult,
    TemporaryIncrease, UnavailableReason,
};

use log::debug;

use crate::affiliate::{BenefitCategory, Modality, Person, ScenarioRequest};
use crate::assumptions::{Assumptions, Cohort};
use crate::error::{EngineError, EngineResult, ValuationError};
use crate::projection::{IncreaseSchedule, ProjectionConfig, ProjectionEngine};
use crate::rounding::{round_amount, round_ratio};
use crate::valuation::{
    combined_factor, guaranteed_period_factor, temporary_increase_factor, CnuCalculator, Dependent,
    Life,
};

/// Mortality cohort for a person outside the disability category
fn person_cohort(person: &Person) -> Cohort {
    if person.is_disabled {
        Cohort::Disabled
    } else {
        Cohort::General
    }
}

/// The affiliate's life: disabled tables for disability claims or disabled affiliates
pub fn affiliate_life(request: &ScenarioRequest) -> Life {
    let cohort = match request.category {
        BenefitCategory::Disability => Cohort::Disabled,
        _ => person_cohort(&request.affiliate),
    };
    Life::new(cohort, request.affiliate.sex, request.affiliate.age)
}

/// Eligible beneficiaries as valued dependents, with their distribution
pub fn dependents(assumptions: &Assumptions, request: &ScenarioRequest) -> (Vec<Dependent>, Distribution) {
    let distribution = distribute(&assumptions.statutory, &request.beneficiaries);
    let dependents = distribution
        .shares
        .iter()
        .map(|s| Dependent {
            life: Life::new(
                person_cohort(&s.beneficiary.person),
                s.beneficiary.person.sex,
                s.beneficiary.person.age,
            ),
            share: s.share,
        })
        .collect();
    (dependents, distribution)
}

/// Capital available to buy an annuity and the premium withheld from it
pub fn annuity_capital(assumptions: &Assumptions, balance: f64) -> (f64, f64) {
    let premium = balance * assumptions.statutory.annuity_premium_rate;
    (balance - premium, premium)
}

/// Capital and base monthly amount a payout is built on
#[derive(Debug, Clone)]
pub(crate) struct Funding {
    /// Capital backing the benefit
    pub capital: f64,

    /// Monthly amount before clause adjustments
    pub base_monthly: f64,

    /// Premium withheld for annuities
    pub premium: f64,

    pub disability: Option<DisabilityCoverage>,

    pub advisories: Vec<String>,
}

impl Funding {
    /// Affiliate's own balance (less premium for annuities) divided by the CNU
    pub fn self_funded(assumptions: &Assumptions, modality: Modality, balance: f64, cnu: f64) -> Self {
        let (capital, premium) = if modality.is_annuity() {
            annuity_capital(assumptions, balance)
        } else {
            (balance, 0.0)
        };

        Self {
            capital,
            base_monthly: capital / cnu,
            premium,
            disability: None,
            advisories: Vec::new(),
        }
    }
}

/// Per-request valuation context for the affiliate's own pension
pub(crate) struct Pricing<'a> {
    pub request: &'a ScenarioRequest,
    pub assumptions: &'a Assumptions,
    pub calculator: CnuCalculator<'a>,
    pub affiliate: Life,
    pub dependents: Vec<Dependent>,
    pub distribution: Distribution,
}

impl<'a> Pricing<'a> {
    pub fn new(assumptions: &'a Assumptions, request: &'a ScenarioRequest) -> Self {
        let (dependents, distribution) = dependents(assumptions, request);
        Self {
            request,
            assumptions,
            calculator: CnuCalculator::new(&assumptions.mortality, request.parameters.interest_rate),
            affiliate: affiliate_life(request),
            dependents,
            distribution,
        }
    }

    /// CNU of the affiliate's pension, joint when dependents are covered
    pub fn cnu(&mut self) -> Result<f64, ValuationError> {
        self.calculator.for_affiliate(self.affiliate, &self.dependents)
    }

    pub fn life_expectancy(&self) -> f64 {
        self.calculator.table(&self.affiliate).life_expectancy(self.affiliate.age)
    }

    fn summary(&self, modality: Modality, monthly: f64, cnu: f64, advisories: Vec<String>) -> BenefitSummary {
        BenefitSummary::new(self.request, monthly, cnu, self.life_expectancy())
            .relabel(modality)
            .with_advisories(self.distribution.advisory())
            .with_advisories(advisories)
    }

    /// Build the result for `modality` from a CNU and its funding
    pub fn payout(&mut self, modality: Modality, cnu: f64, funding: Funding) -> EngineResult<ScenarioResult> {
        let (request, assumptions) = (self.request, self.assumptions);
        let params = &request.parameters;
        let statutory = &assumptions.statutory;
        let mut advisories = funding.advisories;

        debug!(
            "{} {}: capital {:.2}, CNU {:.4}, base {:.2}",
            request.category,
            modality,
            funding.capital,
            cnu,
            funding.base_monthly
        );

        let result = match modality {
            Modality::ScheduledWithdrawal => {
                let engine = ProjectionEngine::new(ProjectionConfig::from_statutory(statutory));
                let projection = match engine.scheduled_withdrawal(
                    &mut self.calculator,
                    self.affiliate,
                    &self.dependents,
                    funding.capital,
                ) {
                    Ok(projection) => projection,
                    Err(_) => {
                        return Ok(ScenarioResult::unavailable(
                            request,
                            UnavailableReason::DegeneratePresentValue,
                        ))
                    }
                };
                ScenarioResult::ScheduledWithdrawal {
                    summary: self.summary(modality, funding.base_monthly, cnu, advisories),
                    disability: funding.disability,
                    projection,
                }
            }
            Modality::ImmediateAnnuity => ScenarioResult::ImmediateAnnuity {
                summary: self.summary(modality, funding.base_monthly, cnu, advisories),
                disability: funding.disability,
                premium_deducted: round_amount(funding.premium),
            },
            Modality::GuaranteedAnnuity => {
                let factor = guaranteed_period_factor(statutory, params.guaranteed_months);
                ScenarioResult::GuaranteedPeriod {
                    summary: self.summary(modality, funding.base_monthly * factor, cnu, advisories),
                    disability: funding.disability,
                    guaranteed_months: params.guaranteed_months,
                    guaranteed_factor: round_ratio(factor),
                }
            }
            Modality::IncreasedAnnuity | Modality::GuaranteedIncreasedAnnuity => {
                let clause = params
                    .increase
                    .ok_or(EngineError::MissingTerms("temporary increase"))?;
                let curve = *self.calculator.curve();

                let (adjustment, guaranteed) = if modality == Modality::GuaranteedIncreasedAnnuity {
                    let adjustment = combined_factor(
                        statutory,
                        funding.base_monthly,
                        funding.capital,
                        &curve,
                        params.guaranteed_months,
                        &clause,
                    );
                    let g = guaranteed_period_factor(statutory, params.guaranteed_months);
                    (adjustment, Some((params.guaranteed_months, round_ratio(g))))
                } else {
                    let adjustment = temporary_increase_factor(
                        statutory,
                        funding.base_monthly,
                        funding.capital,
                        &curve,
                        &clause,
                    );
                    (adjustment, None)
                };
                advisories.extend(adjustment.advisory());

                let percent = clause.percent.as_fraction();
                let steady = funding.base_monthly * adjustment.factor;
                let increased = steady * (1.0 + percent);

                let engine = ProjectionEngine::new(ProjectionConfig::from_statutory(statutory));
                let projection = engine.temporary_increase(
                    self.calculator.table(&self.affiliate),
                    self.affiliate.age,
                    IncreaseSchedule {
                        months: clause.months,
                        increased_amount: increased,
                        steady_amount: steady,
                    },
                );

                ScenarioResult::TemporaryIncrease {
                    summary: self.summary(modality, increased, cnu, advisories),
                    disability: funding.disability,
                    guaranteed_months: guaranteed.map(|(months, _)| months),
                    guaranteed_factor: guaranteed.map(|(_, factor)| factor),
                    increase: TemporaryIncrease {
                        months: clause.months,
                        percent: round_ratio(percent),
                        increased_amount: round_amount(increased),
                        steady_state_amount: round_amount(steady),
                        adjustment_factor: round_ratio(adjustment.factor),
                    },
                    projection,
                }
            }
        };

        Ok(result)
    }
}
