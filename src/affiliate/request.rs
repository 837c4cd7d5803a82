//! Scenario request records: category, modality and calculation parameters

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use super::data::{Beneficiary, Person};
use crate::error::{EngineError, EngineResult};

/// Benefit category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCategory {
    OldAge,
    Disability,
    Survivorship,
}

impl BenefitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitCategory::OldAge => "old_age",
            BenefitCategory::Disability => "disability",
            BenefitCategory::Survivorship => "survivorship",
        }
    }
}

impl fmt::Display for BenefitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenefitCategory {
    type Err = EngineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "old_age" => Ok(BenefitCategory::OldAge),
            "disability" => Ok(BenefitCategory::Disability),
            "survivorship" => Ok(BenefitCategory::Survivorship),
            other => Err(EngineError::UnsupportedCategory(other.to_string())),
        }
    }
}

/// Payment modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Declining-balance scheduled withdrawal
    ScheduledWithdrawal,
    /// Life annuity bought from an insurer
    ImmediateAnnuity,
    /// Life annuity with a guaranteed minimum payment period
    GuaranteedAnnuity,
    /// Life annuity with a temporary payment increase
    IncreasedAnnuity,
    /// Life annuity with both clauses
    GuaranteedIncreasedAnnuity,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::ScheduledWithdrawal,
        Modality::ImmediateAnnuity,
        Modality::GuaranteedAnnuity,
        Modality::IncreasedAnnuity,
        Modality::GuaranteedIncreasedAnnuity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::ScheduledWithdrawal => "scheduled_withdrawal",
            Modality::ImmediateAnnuity => "immediate_annuity",
            Modality::GuaranteedAnnuity => "guaranteed_annuity",
            Modality::IncreasedAnnuity => "increased_annuity",
            Modality::GuaranteedIncreasedAnnuity => "guaranteed_increased_annuity",
        }
    }

    /// Human-readable label used in results
    pub fn label(&self) -> &'static str {
        match self {
            Modality::ScheduledWithdrawal => "Scheduled withdrawal",
            Modality::ImmediateAnnuity => "Immediate life annuity",
            Modality::GuaranteedAnnuity => "Life annuity with guaranteed period",
            Modality::IncreasedAnnuity => "Life annuity with temporary increase",
            Modality::GuaranteedIncreasedAnnuity => {
                "Life annuity with guaranteed period and temporary increase"
            }
        }
    }

    pub fn is_annuity(&self) -> bool {
        !matches!(self, Modality::ScheduledWithdrawal)
    }

    pub fn has_guaranteed_period(&self) -> bool {
        matches!(
            self,
            Modality::GuaranteedAnnuity | Modality::GuaranteedIncreasedAnnuity
        )
    }

    pub fn has_temporary_increase(&self) -> bool {
        matches!(
            self,
            Modality::IncreasedAnnuity | Modality::GuaranteedIncreasedAnnuity
        )
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = EngineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Modality::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == tag)
            .ok_or_else(|| EngineError::UnsupportedModality(tag.to_string()))
    }
}

/// Degree of disability, selecting the statutory percentage of the income base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabilityDegree {
    /// Total disability
    Total,
    /// Total disability at two thirds or more of working capacity lost
    TwoThirds,
    /// Partial disability
    Partial,
}

/// Size of a temporary increase, with an explicit unit
///
/// Serialized as `{"unit": "fraction", "value": 0.5}` or
/// `{"unit": "whole_percent", "value": 50}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum IncreasePercent {
    Fraction(f64),
    WholePercent(f64),
}

impl IncreasePercent {
    pub fn as_fraction(&self) -> f64 {
        match *self {
            IncreasePercent::Fraction(value) => value,
            IncreasePercent::WholePercent(value) => value / 100.0,
        }
    }

    /// Interpret a unitless value the way older callers sent it: anything
    /// above 1 is a whole percent. A value of exactly 1 is read as 100%.
    pub fn from_legacy(value: f64) -> Self {
        if value > 1.0 {
            warn!(
                "increase percent {} has no unit, reading it as a whole percent",
                value
            );
            IncreasePercent::WholePercent(value)
        } else {
            warn!(
                "increase percent {} has no unit, reading it as a fraction",
                value
            );
            IncreasePercent::Fraction(value)
        }
    }
}

/// Temporary-increase clause
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporaryIncreaseClause {
    /// Months during which the increased amount is paid
    pub months: u32,

    pub percent: IncreasePercent,
}

/// Disability claim terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisabilityTerms {
    /// Reference monthly income
    pub income_base: f64,

    pub degree: DisabilityDegree,

    /// Whether the affiliate was covered by disability and survivorship insurance
    #[serde(default = "default_insured")]
    pub insured: bool,
}

fn default_insured() -> bool {
    true
}

/// Terms describing the deceased primary (causante) in survivorship scenarios
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CausantTerms {
    /// Explicit reference pension of the deceased
    #[serde(default)]
    pub reference_pension: Option<f64>,

    /// Reference monthly income of the deceased
    #[serde(default)]
    pub income_base: Option<f64>,
}

/// Rate, index and modality parameters for one calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub accumulated_balance: f64,

    /// Annual technical interest rate (fraction)
    pub interest_rate: f64,

    /// Value of one index unit in currency
    pub reference_index_value: f64,

    #[serde(default)]
    pub guaranteed_months: u32,

    #[serde(default)]
    pub increase: Option<TemporaryIncreaseClause>,

    #[serde(default)]
    pub disability: Option<DisabilityTerms>,

    #[serde(default)]
    pub causant: Option<CausantTerms>,
}

impl ScenarioParameters {
    pub fn new(accumulated_balance: f64, interest_rate: f64, reference_index_value: f64) -> Self {
        Self {
            accumulated_balance,
            interest_rate,
            reference_index_value,
            guaranteed_months: 0,
            increase: None,
            disability: None,
            causant: None,
        }
    }

    pub fn with_guaranteed_months(mut self, months: u32) -> Self {
        self.guaranteed_months = months;
        self
    }

    pub fn with_increase(mut self, months: u32, percent: IncreasePercent) -> Self {
        self.increase = Some(TemporaryIncreaseClause { months, percent });
        self
    }

    pub fn with_disability(mut self, terms: DisabilityTerms) -> Self {
        self.disability = Some(terms);
        self
    }

    pub fn with_causant(mut self, terms: CausantTerms) -> Self {
        self.causant = Some(terms);
        self
    }
}

/// One calculation request as received from the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub category: BenefitCategory,

    pub modality: Modality,

    /// The affiliate; for survivorship this is the deceased primary
    pub affiliate: Person,

    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,

    pub parameters: ScenarioParameters,
}

impl ScenarioRequest {
    pub fn new(
        category: BenefitCategory,
        modality: Modality,
        affiliate: Person,
        parameters: ScenarioParameters,
    ) -> Self {
        Self {
            category,
            modality,
            affiliate,
            beneficiaries: Vec::new(),
            parameters,
        }
    }

    pub fn with_beneficiaries(mut self, beneficiaries: Vec<Beneficiary>) -> Self {
        self.beneficiaries = beneficiaries;
        self
    }

    /// Copy of this request with another modality, for side-by-side comparisons
    pub fn for_modality(&self, modality: Modality) -> Self {
        Self {
            modality,
            ..self.clone()
        }
    }

    /// Reject inputs no formula can compute
    pub fn validate(&self) -> EngineResult<()> {
        let p = &self.parameters;

        if !p.accumulated_balance.is_finite() || p.accumulated_balance < 0.0 {
            return Err(EngineError::invalid(format!(
                "accumulated balance must be a non-negative amount, got {}",
                p.accumulated_balance
            )));
        }
        if !p.interest_rate.is_finite() || p.interest_rate <= 0.0 {
            return Err(EngineError::invalid(format!(
                "interest rate must be positive, got {}",
                p.interest_rate
            )));
        }
        if !p.reference_index_value.is_finite() || p.reference_index_value <= 0.0 {
            return Err(EngineError::invalid(format!(
                "reference index value must be positive, got {}",
                p.reference_index_value
            )));
        }

        for beneficiary in &self.beneficiaries {
            if let Some(share) = beneficiary.assigned_share {
                if !(share > 0.0 && share <= 1.0) {
                    return Err(EngineError::invalid(format!(
                        "assigned share for {} must be in (0, 1], got {}",
                        beneficiary.relationship, share
                    )));
                }
            }
        }

        match self.category {
            BenefitCategory::Survivorship => {
                if let Some(causant) = &p.causant {
                    let amounts = [causant.reference_pension, causant.income_base];
                    if amounts.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(EngineError::invalid(
                            "causant reference pension and income base must be non-negative",
                        ));
                    }
                }
            }
            BenefitCategory::Disability => {
                let terms = p.disability.ok_or(EngineError::MissingTerms("disability"))?;
                if !terms.income_base.is_finite() || terms.income_base < 0.0 {
                    return Err(EngineError::invalid(format!(
                        "income base must be non-negative, got {}",
                        terms.income_base
                    )));
                }
            }
            BenefitCategory::OldAge => {}
        }

        if self.modality.has_guaranteed_period() && p.guaranteed_months == 0 {
            return Err(EngineError::invalid(
                "guaranteed-period modality requires guaranteed months",
            ));
        }

        if self.modality.has_temporary_increase() {
            let clause = p.increase.ok_or(EngineError::MissingTerms("temporary increase"))?;
            let fraction = clause.percent.as_fraction();
            if clause.months == 0 || !fraction.is_finite() || fraction <= 0.0 {
                return Err(EngineError::invalid(
                    "temporary increase requires a positive duration and percent",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::Sex;

    fn old_age_request(modality: Modality) -> ScenarioRequest {
        ScenarioRequest::new(
            BenefitCategory::OldAge,
            modality,
            Person::new(65, Sex::Male),
            ScenarioParameters::new(50_000_000.0, 0.0341, 37_000.0),
        )
    }

    #[test]
    fn test_modality_tags_round_trip() {
        for modality in Modality::ALL {
            assert_eq!(modality.as_str().parse::<Modality>().unwrap(), modality);
        }
    }

    #[test]
    fn test_unknown_modality_rejected() {
        let err = "programmed_withdrawal".parse::<Modality>().unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedModality(_)));
    }

    #[test]
    fn test_increase_percent_units() {
        assert_eq!(IncreasePercent::Fraction(0.5).as_fraction(), 0.5);
        assert_eq!(IncreasePercent::WholePercent(50.0).as_fraction(), 0.5);

        // The legacy reading is ambiguous exactly at 1: it means 100%
        assert_eq!(IncreasePercent::from_legacy(1.0).as_fraction(), 1.0);
        assert_eq!(IncreasePercent::from_legacy(100.0).as_fraction(), 1.0);
        assert_eq!(IncreasePercent::from_legacy(0.25).as_fraction(), 0.25);
    }

    #[test]
    fn test_increase_percent_serialized_with_unit() {
        let json = serde_json::to_string(&IncreasePercent::WholePercent(50.0)).unwrap();
        assert_eq!(json, r#"{"unit":"whole_percent","value":50.0}"#);
    }

    #[test]
    fn test_negative_balance_rejected() {
        let mut request = old_age_request(Modality::ScheduledWithdrawal);
        request.parameters.accumulated_balance = -1.0;
        assert!(matches!(request.validate(), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut request = old_age_request(Modality::ImmediateAnnuity);
        request.parameters.interest_rate = 0.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_survivorship_accepts_clause_modalities() {
        let mut request = old_age_request(Modality::GuaranteedAnnuity);
        request.category = BenefitCategory::Survivorship;
        assert!(request.validate().is_err());

        request.parameters.guaranteed_months = 120;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_disability_requires_terms() {
        let mut request = old_age_request(Modality::ImmediateAnnuity);
        request.category = BenefitCategory::Disability;
        assert!(matches!(
            request.validate(),
            Err(EngineError::MissingTerms("disability"))
        ));
    }

    #[test]
    fn test_increase_modality_requires_clause() {
        let request = old_age_request(Modality::IncreasedAnnuity);
        assert!(request.validate().is_err());

        let mut request = old_age_request(Modality::IncreasedAnnuity);
        request.parameters = request
            .parameters
            .with_increase(24, IncreasePercent::WholePercent(50.0));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_assigned_share_out_of_range_rejected() {
        use crate::affiliate::{Beneficiary, Relationship};

        let request = old_age_request(Modality::ScheduledWithdrawal).with_beneficiaries(vec![
            Beneficiary::new(Person::new(60, Sex::Female), Relationship::Spouse)
                .with_assigned_share(1.5),
        ]);
        assert!(request.validate().is_err());
    }
}
