//! Actuarial assumptions: mortality tables and statutory parameters

mod mortality;
mod statutory;
pub mod loader;

pub use mortality::{
    disabled_rates, general_rates, Cohort, MortalityTable, MortalityTables, TableKey, RADIX,
};
pub use statutory::{GuaranteedPeriodTable, StatutoryParameters};

use std::path::Path;
use std::sync::OnceLock;

use crate::error::EngineResult;

/// Container for all calculation assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub mortality: MortalityTables,
    pub statutory: StatutoryParameters,
}

impl Assumptions {
    /// Process-wide built-in assumptions, initialized on first use
    pub fn statutory() -> &'static Assumptions {
        static REGISTRY: OnceLock<Assumptions> = OnceLock::new();
        REGISTRY.get_or_init(Assumptions::built_in)
    }

    /// Fresh copy of the built-in tables and parameters
    pub fn built_in() -> Self {
        Self {
            mortality: MortalityTables::statutory(),
            statutory: StatutoryParameters::default(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> EngineResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        let general = loader::load_mortality_rates(path, Cohort::General)?;
        let disabled = loader::load_mortality_rates(path, Cohort::Disabled)?;

        Ok(Self {
            mortality: MortalityTables::from_rates(&general, &disabled)?,
            statutory: loader::load_statutory_parameters(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_shared() {
        let first = Assumptions::statutory() as *const Assumptions;
        let second = Assumptions::statutory() as *const Assumptions;
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_csv_path_round_trip() {
        let dir = std::env::temp_dir().join(format!("pension_engine_assumptions_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let write_rates = |name: &str, min_age: u32, rates: &[(f64, f64)]| {
            let mut csv = String::from("age,female,male\n");
            for (offset, (female, male)) in rates.iter().enumerate() {
                csv.push_str(&format!("{},{},{}\n", min_age + offset as u32, female, male));
            }
            std::fs::write(dir.join(name), csv).unwrap();
        };
        write_rates(loader::GENERAL_MORTALITY_FILE, 0, &general_rates());
        write_rates(loader::DISABLED_MORTALITY_FILE, 18, &disabled_rates());

        let loaded = Assumptions::from_csv_path(&dir).unwrap();
        let built_in = Assumptions::built_in();
        let key = TableKey::new(Cohort::General, crate::affiliate::Sex::Male);

        assert_eq!(
            loaded.mortality.get(key).life_expectancy(65),
            built_in.mortality.get(key).life_expectancy(65)
        );
        assert_eq!(loaded.statutory, built_in.statutory);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_default_data_directory_matches_built_in() {
        let loaded = Assumptions::from_csv().unwrap();
        let built_in = Assumptions::built_in();

        for key in [
            TableKey::new(Cohort::General, crate::affiliate::Sex::Male),
            TableKey::new(Cohort::Disabled, crate::affiliate::Sex::Female),
        ] {
            let (a, b) = (loaded.mortality.get(key), built_in.mortality.get(key));
            for age in [20, 45, 65] {
                approx::assert_relative_eq!(
                    a.life_expectancy(age),
                    b.life_expectancy(age),
                    max_relative = 1e-3
                );
            }
        }
        assert_eq!(loaded.statutory, built_in.statutory);
    }
}
