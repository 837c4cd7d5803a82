//! Pension Engine - benefit estimation for individually-funded pension accounts
//!
//! This library provides:
//! - Statutory mortality tables for general and disabled lives
//! - Necessary unit capital (CNU) for single, joint and survivorship pensions
//! - Guaranteed-period and temporary-increase adjustment solvers
//! - Old-age, disability and survivorship benefit formulas
//! - Statutory distribution of pensions among beneficiaries
//! - Year-by-year benefit projections

pub mod affiliate;
pub mod assumptions;
pub mod benefits;
pub mod error;
pub mod projection;
pub mod rounding;
pub mod scenario;
pub mod valuation;

// Re-export commonly used types
pub use affiliate::{
    BenefitCategory, Beneficiary, Modality, Person, Relationship, ScenarioParameters,
    ScenarioRequest, Sex,
};
pub use assumptions::{Assumptions, MortalityTable, MortalityTables};
pub use benefits::{BenefitSummary, ScenarioResult};
pub use error::{EngineError, EngineResult};
pub use projection::{Projection, ProjectionPoint};
pub use scenario::ScenarioRunner;
