//! Result records returned by the formula library

use serde::{Deserialize, Serialize};

use crate::affiliate::{BenefitCategory, DisabilityDegree, Modality, Relationship, ScenarioRequest};
use crate::projection::Projection;
use crate::rounding::{round_amount, round_index, round_ratio};

/// Fields every result carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitSummary {
    /// Display label, e.g. "Old-age pension - Immediate life annuity"
    pub label: String,

    pub category: BenefitCategory,

    pub modality: Modality,

    /// Monthly benefit in currency units
    pub monthly_benefit: f64,

    /// Monthly benefit expressed in reference index units
    pub benefit_in_index_units: f64,

    pub annual_benefit: f64,

    /// Necessary unit capital used
    pub necessary_unit_capital: f64,

    pub interest_rate_used: f64,

    pub life_expectancy_years: f64,

    /// Disclosures: floors applied, shortfalls, normalization
    pub advisories: Vec<String>,
}

impl BenefitSummary {
    /// Summary with all monetary and index fields rounded
    pub fn new(
        request: &ScenarioRequest,
        monthly_benefit: f64,
        necessary_unit_capital: f64,
        life_expectancy_years: f64,
    ) -> Self {
        let monthly = round_amount(monthly_benefit);
        let p = &request.parameters;

        Self {
            label: label(request.category, request.modality),
            category: request.category,
            modality: request.modality,
            monthly_benefit: monthly,
            benefit_in_index_units: round_index(monthly / p.reference_index_value),
            annual_benefit: monthly * 12.0,
            necessary_unit_capital: round_ratio(necessary_unit_capital),
            interest_rate_used: round_ratio(p.interest_rate),
            life_expectancy_years,
            advisories: Vec::new(),
        }
    }

    /// Summary with every amount zero
    pub fn zero(request: &ScenarioRequest) -> Self {
        Self::new(request, 0.0, 0.0, 0.0)
    }

    /// Label the summary for `modality` instead of the request's own
    pub fn relabel(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self.label = label(self.category, modality);
        self
    }

    pub fn with_advisory(mut self, advisory: impl Into<String>) -> Self {
        self.advisories.push(advisory.into());
        self
    }

    pub fn with_advisories(mut self, advisories: impl IntoIterator<Item = String>) -> Self {
        self.advisories.extend(advisories);
        self
    }
}

pub fn label(category: BenefitCategory, modality: Modality) -> String {
    let category = match category {
        BenefitCategory::OldAge => "Old-age pension",
        BenefitCategory::Disability => "Disability pension",
        BenefitCategory::Survivorship => "Survivorship pension",
    };
    format!("{} - {}", category, modality.label())
}

/// How a disability benefit relates to the insured reference amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisabilityCoverage {
    pub degree: DisabilityDegree,

    pub income_base: f64,

    /// Income base times the statutory percentage for the degree
    pub reference_amount: f64,

    /// What the affiliate's own balance funds
    pub self_funded_amount: f64,

    pub insured: bool,

    /// Capital needed to fund the reference amount
    pub required_capital: f64,

    /// Capital the insurer must add, zero when self-funded
    pub shortfall: f64,

    /// Self-funded amount above the reference amount
    pub surplus: f64,
}

/// Terms of a temporary increase actually granted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporaryIncrease {
    pub months: u32,

    /// Increase as a fraction of the steady-state amount
    pub percent: f64,

    /// Monthly amount while the increase lasts
    pub increased_amount: f64,

    /// Monthly amount after the increase ends
    pub steady_state_amount: f64,

    pub adjustment_factor: f64,
}

/// Where a survivorship reference pension came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Supplied by the caller
    Explicit,
    /// Percentage of the deceased's income base
    IncomeBase,
    /// Funded by the deceased's balance
    SelfFunded,
}

/// One beneficiary's survivorship pension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryAmount {
    pub relationship: Relationship,
    pub age: u32,
    pub share: f64,
    pub monthly_amount: f64,
}

/// Why a scenario could not be valued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    NoEligibleBeneficiaries,
    DegeneratePresentValue,
}

impl UnavailableReason {
    pub fn advisory(&self) -> &'static str {
        match self {
            UnavailableReason::NoEligibleBeneficiaries => {
                "no beneficiary is eligible for a survivorship pension"
            }
            UnavailableReason::DegeneratePresentValue => {
                "the present value of the benefit could not be computed"
            }
        }
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioResult {
    ScheduledWithdrawal {
        summary: BenefitSummary,
        disability: Option<DisabilityCoverage>,
        projection: Projection,
    },
    ImmediateAnnuity {
        summary: BenefitSummary,
        disability: Option<DisabilityCoverage>,
        /// Insurance premium taken from the balance
        premium_deducted: f64,
    },
    GuaranteedPeriod {
        summary: BenefitSummary,
        disability: Option<DisabilityCoverage>,
        guaranteed_months: u32,
        guaranteed_factor: f64,
    },
    TemporaryIncrease {
        summary: BenefitSummary,
        disability: Option<DisabilityCoverage>,
        guaranteed_months: Option<u32>,
        guaranteed_factor: Option<f64>,
        increase: TemporaryIncrease,
        projection: Projection,
    },
    Survivorship {
        summary: BenefitSummary,
        reference_pension: f64,
        reference_source: ReferenceSource,
        /// Amounts first paid to each beneficiary, after any modality adjustment
        breakdown: Vec<BeneficiaryAmount>,
        /// Factor applied to every beneficiary's amount, 1 when unadjusted
        adjustment_factor: f64,
        guaranteed_months: Option<u32>,
        increase: Option<TemporaryIncrease>,
        projection: Option<Projection>,
    },
    Unavailable {
        summary: BenefitSummary,
        reason: UnavailableReason,
    },
}

impl ScenarioResult {
    /// Flagged zero-value result
    pub fn unavailable(request: &ScenarioRequest, reason: UnavailableReason) -> Self {
        ScenarioResult::Unavailable {
            summary: BenefitSummary::zero(request).with_advisory(reason.advisory()),
            reason,
        }
    }

    pub fn summary(&self) -> &BenefitSummary {
        match self {
            ScenarioResult::ScheduledWithdrawal { summary, .. }
            | ScenarioResult::ImmediateAnnuity { summary, .. }
            | ScenarioResult::GuaranteedPeriod { summary, .. }
            | ScenarioResult::TemporaryIncrease { summary, .. }
            | ScenarioResult::Survivorship { summary, .. }
            | ScenarioResult::Unavailable { summary, .. } => summary,
        }
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self, ScenarioResult::Unavailable { .. })
    }

    pub fn projection(&self) -> Option<&Projection> {
        match self {
            ScenarioResult::ScheduledWithdrawal { projection, .. }
            | ScenarioResult::TemporaryIncrease { projection, .. } => Some(projection),
            ScenarioResult::Survivorship { projection, .. } => projection.as_ref(),
            _ => None,
        }
    }

    pub fn disability(&self) -> Option<&DisabilityCoverage> {
        match self {
            ScenarioResult::ScheduledWithdrawal { disability, .. }
            | ScenarioResult::ImmediateAnnuity { disability, .. }
            | ScenarioResult::GuaranteedPeriod { disability, .. }
            | ScenarioResult::TemporaryIncrease { disability, .. } => disability.as_ref(),
            _ => None,
        }
    }

    pub fn monthly_benefit(&self) -> f64 {
        self.summary().monthly_benefit
    }
}
