//! Affiliate data, beneficiaries and scenario requests

mod data;
mod request;
pub mod loader;

pub use data::{Beneficiary, Person, Relationship, Sex};
pub use request::{
    BenefitCategory, CausantTerms, DisabilityDegree, DisabilityTerms, IncreasePercent, Modality,
    ScenarioParameters, ScenarioRequest, TemporaryIncreaseClause,
};
pub use loader::{load_beneficiaries, load_beneficiaries_from_reader};
