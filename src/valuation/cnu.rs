//! Necessary unit capital (CNU)
//!
//! The CNU is the capital needed to fund one currency unit of monthly pension
//! for life, so that `monthly_benefit = balance / CNU`:
//!
//! ```text
//! CNU(x) = 12 × Σ_{t=0}^{ω-x} [l(x+t) / l(x)] × (1+i)^-(t+0.5)
//! ```
//!
//! When the pension also covers dependents after the affiliate dies, each
//! dependent adds the value of a reversionary annuity paid only in years where
//! the affiliate is dead and the dependent alive:
//!
//! ```text
//! 12 × Σ_t [1 − ₜp_affiliate] × ₜp_dependent × (1+i)^-(t+0.5) × share
//! ```
//!
//! For survivorship pensions (affiliate already deceased) the dependents'
//! own single-life CNUs are weighted by their shares instead.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cache::{CnuCache, CnuKey};
use super::discount::DiscountCurve;
use crate::affiliate::Sex;
use crate::assumptions::{Cohort, MortalityTable, MortalityTables, TableKey};
use crate::error::ValuationError;

/// A life to be valued: which table, at what age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Life {
    pub table: TableKey,
    pub age: u32,
}

impl Life {
    pub fn new(cohort: Cohort, sex: Sex, age: u32) -> Self {
        Self {
            table: TableKey::new(cohort, sex),
            age,
        }
    }

    /// The same life `years` later, saturating at `u32::MAX`
    pub fn aged(&self, years: u32) -> Self {
        Self {
            table: self.table,
            age: self.age.saturating_add(years),
        }
    }
}

/// A dependent covered by the affiliate's pension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dependent {
    pub life: Life,

    /// Fraction of the affiliate's pension paid to this dependent
    pub share: f64,
}

impl Dependent {
    pub fn aged(&self, years: u32) -> Self {
        Self {
            life: self.life.aged(years),
            share: self.share,
        }
    }
}

/// Single-life CNU for `age` on `table`
pub fn single_life_cnu(table: &MortalityTable, age: u32, curve: &DiscountCurve) -> f64 {
    let age = table.clamp_age(age);
    let annuity: f64 = (0..=table.horizon(age))
        .map(|t| table.survival_probability(age, t) * curve.mid_year_factor(t))
        .sum();

    12.0 * annuity
}

/// Annual reversionary annuity factor: paid while `dependent` lives and `primary` does not
pub fn reversionary_annuity(
    primary: &MortalityTable,
    primary_age: u32,
    dependent: &MortalityTable,
    dependent_age: u32,
    curve: &DiscountCurve,
) -> f64 {
    let primary_age = primary.clamp_age(primary_age);
    let dependent_age = dependent.clamp_age(dependent_age);
    let horizon = primary
        .horizon(primary_age)
        .max(dependent.horizon(dependent_age));

    (0..=horizon)
        .map(|t| {
            let primary_dead = 1.0 - primary.survival_probability(primary_age, t);
            let dependent_alive = dependent.survival_probability(dependent_age, t);
            primary_dead * dependent_alive * curve.mid_year_factor(t)
        })
        .sum()
}

fn checked(cnu: f64) -> Result<f64, ValuationError> {
    if cnu.is_finite() && cnu > 0.0 {
        Ok(cnu)
    } else {
        warn!("degenerate necessary unit capital: {}", cnu);
        Err(ValuationError::Degenerate(cnu))
    }
}

/// Per-request CNU calculator with memoized single-life values
pub struct CnuCalculator<'a> {
    tables: &'a MortalityTables,
    curve: DiscountCurve,
    cache: CnuCache,
}

impl<'a> CnuCalculator<'a> {
    pub fn new(tables: &'a MortalityTables, annual_rate: f64) -> Self {
        Self {
            tables,
            curve: DiscountCurve::new(annual_rate),
            cache: CnuCache::new(),
        }
    }

    pub fn curve(&self) -> &DiscountCurve {
        &self.curve
    }

    pub fn tables(&self) -> &'a MortalityTables {
        self.tables
    }

    pub fn table(&self, life: &Life) -> &'a MortalityTable {
        self.tables.get(life.table)
    }

    pub fn cache(&self) -> &CnuCache {
        &self.cache
    }

    /// Single-life CNU
    pub fn single_life(&mut self, life: Life) -> Result<f64, ValuationError> {
        let key = CnuKey::new(life.table, life.age, self.curve.annual_rate);
        if let Some(cnu) = self.cache.get(&key) {
            return checked(cnu);
        }

        let cnu = single_life_cnu(self.tables.get(life.table), life.age, &self.curve);
        debug!(
            "CNU {:?}/{:?} age {} at {:.4}: {:.4}",
            life.table.cohort, life.table.sex, life.age, self.curve.annual_rate, cnu
        );
        self.cache.insert(key, cnu);
        checked(cnu)
    }

    /// CNU of the affiliate's pension including reversion to dependents
    pub fn joint(&mut self, primary: Life, dependents: &[Dependent]) -> Result<f64, ValuationError> {
        let base = self.single_life(primary)?;

        let primary_table = self.tables.get(primary.table);
        let reversion: f64 = dependents
            .iter()
            .map(|d| {
                let dependent_table = self.tables.get(d.life.table);
                reversionary_annuity(
                    primary_table,
                    primary.age,
                    dependent_table,
                    d.life.age,
                    &self.curve,
                ) * d.share
            })
            .sum();

        checked(base + 12.0 * reversion)
    }

    /// Single-life CNU when there are no dependents, joint otherwise
    pub fn for_affiliate(
        &mut self,
        primary: Life,
        dependents: &[Dependent],
    ) -> Result<f64, ValuationError> {
        if dependents.is_empty() {
            self.single_life(primary)
        } else {
            self.joint(primary, dependents)
        }
    }

    /// Dependent whose table runs the most years past their current age
    pub fn longest_lived<'d>(&self, dependents: &'d [Dependent]) -> Option<&'d Dependent> {
        dependents
            .iter()
            .max_by_key(|d| self.table(&d.life).horizon(d.life.age))
    }

    /// CNU of a survivorship pension: dependents' CNUs weighted by share
    pub fn survivorship(&mut self, dependents: &[Dependent]) -> Result<f64, ValuationError> {
        if dependents.is_empty() {
            return Err(ValuationError::NoDependents);
        }

        let mut total = 0.0;
        for dependent in dependents {
            total += dependent.share * self.single_life(dependent.life)?;
        }

        checked(total)
    }
}
