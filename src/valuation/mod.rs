//! Present-value engine: discounting, necessary unit capital and clause solvers

pub mod adjustments;
pub mod cache;
pub mod cnu;
pub mod discount;

pub use adjustments::{combined_factor, guaranteed_period_factor, temporary_increase_factor, Adjustment};
pub use cache::{CnuCache, CnuKey};
pub use cnu::{reversionary_annuity, single_life_cnu, CnuCalculator, Dependent, Life};
pub use discount::DiscountCurve;
