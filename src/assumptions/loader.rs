//! CSV-based assumption loader
//!
//! Loads mortality tables from CSV files in data/assumptions/, and optionally
//! statutory overrides from `statutory.json` in the same directory.

use std::io::Read;
use std::path::Path;

use log::info;

use super::mortality::Cohort;
use super::statutory::StatutoryParameters;
use crate::error::{EngineError, EngineResult};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

pub const GENERAL_MORTALITY_FILE: &str = "mortality_general.csv";
pub const DISABLED_MORTALITY_FILE: &str = "mortality_disabled.csv";
pub const STATUTORY_FILE: &str = "statutory.json";

#[derive(Debug, serde::Deserialize)]
struct RateRow {
    age: u32,
    female: f64,
    male: f64,
}

/// Load mortality rates for one cohort from CSV (`age,female,male`)
/// Returns Vec<(female_rate, male_rate)> indexed from the cohort's first age
pub fn load_mortality_rates(path: &Path, cohort: Cohort) -> EngineResult<Vec<(f64, f64)>> {
    let file_name = match cohort {
        Cohort::General => GENERAL_MORTALITY_FILE,
        Cohort::Disabled => DISABLED_MORTALITY_FILE,
    };
    let file = std::fs::File::open(path.join(file_name))?;
    load_mortality_rates_from_reader(file, cohort)
}

/// Load mortality rates from any reader
pub fn load_mortality_rates_from_reader<R: Read>(
    reader: R,
    cohort: Cohort,
) -> EngineResult<Vec<(f64, f64)>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<RateRow> = csv_reader.deserialize().collect::<Result<_, _>>()?;
    rows.sort_by_key(|row| row.age);

    let min_age = cohort.min_age();
    let mut rates = Vec::with_capacity(rows.len());

    for (offset, row) in rows.iter().enumerate() {
        let expected_age = min_age + offset as u32;
        if row.age != expected_age {
            return Err(EngineError::invalid(format!(
                "{:?} mortality rates must cover consecutive ages from {}; expected age {}, found {}",
                cohort, min_age, expected_age, row.age
            )));
        }
        rates.push((row.female, row.male));
    }

    if rates.is_empty() {
        return Err(EngineError::invalid(format!("{:?} mortality file is empty", cohort)));
    }

    Ok(rates)
}

/// Load statutory overrides if `statutory.json` exists, defaults otherwise
pub fn load_statutory_parameters(path: &Path) -> EngineResult<StatutoryParameters> {
    let file_path = path.join(STATUTORY_FILE);
    if !file_path.exists() {
        return Ok(StatutoryParameters::default());
    }

    info!("loading statutory overrides from {}", file_path.display());
    let file = std::fs::File::open(file_path)?;
    Ok(serde_json::from_reader(file)?)
}
