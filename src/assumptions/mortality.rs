//! Mortality tables for general and disabled lives
//!
//! Each table stores annual death probabilities `qx` over a bounded age domain
//! and derives the survivor column `lx` once, at construction:
//!
//! ```text
//! l(min_age) = 100000
//! l(x + 1)   = l(x) × (1 − qx(x))
//! ```
//!
//! The last age of every table is terminal (`qx = 1.0`), so survival beyond it
//! is zero. Ages below the domain clamp up to the first age.

use serde::{Deserialize, Serialize};

use crate::affiliate::Sex;
use crate::error::{EngineError, EngineResult};

/// Synthetic cohort size at the first age of a table
pub const RADIX: f64 = 100_000.0;

/// Population a table was graduated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    General,
    Disabled,
}

impl Cohort {
    /// First age of the table domain. The terminal age comes from the rates.
    pub fn min_age(&self) -> u32 {
        match self {
            Cohort::General => 0,
            Cohort::Disabled => 18,
        }
    }
}

/// Identifies one of the four tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub cohort: Cohort,
    pub sex: Sex,
}

impl TableKey {
    pub fn new(cohort: Cohort, sex: Sex) -> Self {
        Self { cohort, sex }
    }
}

/// One immutable mortality table with its derived survivor column
#[derive(Debug, Clone)]
pub struct MortalityTable {
    key: TableKey,
    min_age: u32,
    /// Annual death probability, index = age − min_age
    qx: Vec<f64>,
    /// Survivors, index = age − min_age; one entry longer than `qx`
    lx: Vec<f64>,
}

impl MortalityTable {
    /// Build a table from rates starting at `min_age`.
    /// The last rate is forced to 1.0.
    pub fn new(key: TableKey, min_age: u32, mut qx: Vec<f64>) -> EngineResult<Self> {
        if qx.is_empty() {
            return Err(EngineError::invalid("mortality table has no rates"));
        }
        if let Some(bad) = qx.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(EngineError::invalid(format!(
                "mortality rate {} is outside [0, 1]",
                bad
            )));
        }

        if let Some(last) = qx.last_mut() {
            *last = 1.0;
        }

        let mut lx = Vec::with_capacity(qx.len() + 1);
        let mut survivors = RADIX;
        lx.push(survivors);
        for q in &qx {
            survivors *= 1.0 - q;
            lx.push(survivors);
        }

        Ok(Self {
            key,
            min_age,
            qx,
            lx,
        })
    }

    pub fn key(&self) -> TableKey {
        self.key
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    pub fn max_age(&self) -> u32 {
        self.min_age + self.qx.len() as u32 - 1
    }

    /// Clamp an age into the table domain
    pub fn clamp_age(&self, age: u32) -> u32 {
        age.clamp(self.min_age, self.max_age())
    }

    /// Years from `age` to the terminal age
    pub fn horizon(&self, age: u32) -> u32 {
        self.max_age() - self.clamp_age(age)
    }

    /// Annual probability of death at `age`
    pub fn qx(&self, age: u32) -> f64 {
        if age >= self.max_age() {
            return 1.0;
        }
        self.qx[(self.clamp_age(age) - self.min_age) as usize]
    }

    /// Synthetic cohort size at `age`: 100000 × Π (1 − qx(a)) for a in [min_age, age)
    pub fn survival_count(&self, age: u32) -> f64 {
        let idx = (age.max(self.min_age) - self.min_age) as usize;
        self.lx.get(idx).copied().unwrap_or(0.0)
    }

    /// Probability that a life aged `age` survives `t` more years
    pub fn survival_probability(&self, age: u32, t: u32) -> f64 {
        let age = self.clamp_age(age);
        let alive = self.survival_count(age);
        if alive <= 0.0 {
            return 0.0;
        }
        self.survival_count(age.saturating_add(t)) / alive
    }

    /// Curtate life expectancy in years, rounded to one decimal
    pub fn life_expectancy(&self, age: u32) -> f64 {
        let age = self.clamp_age(age);
        let mut survival = 1.0;
        let mut expectancy = 0.0;

        for k in 0..self.horizon(age) {
            survival *= 1.0 - self.qx(age + k);
            expectancy += survival;
        }

        (expectancy * 10.0).round() / 10.0
    }
}

/// The four statutory tables: general and disabled lives, by sex
#[derive(Debug, Clone)]
pub struct MortalityTables {
    general_male: MortalityTable,
    general_female: MortalityTable,
    disabled_male: MortalityTable,
    disabled_female: MortalityTable,
}

impl MortalityTables {
    /// Built-in tables
    pub fn statutory() -> Self {
        // Constant rates, checked by test_built_in_rates_valid
        Self::from_rates(&general_rates(), &disabled_rates())
            .unwrap_or_else(|e| panic!("built-in mortality rates are invalid: {}", e))
    }

    /// Build from `(female, male)` rate pairs indexed from each cohort's first age
    pub fn from_rates(general: &[(f64, f64)], disabled: &[(f64, f64)]) -> EngineResult<Self> {
        let build = |cohort: Cohort, sex: Sex, rates: &[(f64, f64)]| {
            let qx = rates
                .iter()
                .map(|&(female, male)| match sex {
                    Sex::Female => female,
                    Sex::Male => male,
                })
                .collect();
            MortalityTable::new(TableKey::new(cohort, sex), cohort.min_age(), qx)
        };

        Ok(Self {
            general_male: build(Cohort::General, Sex::Male, general)?,
            general_female: build(Cohort::General, Sex::Female, general)?,
            disabled_male: build(Cohort::Disabled, Sex::Male, disabled)?,
            disabled_female: build(Cohort::Disabled, Sex::Female, disabled)?,
        })
    }

    pub fn get(&self, key: TableKey) -> &MortalityTable {
        match (key.cohort, key.sex) {
            (Cohort::General, Sex::Male) => &self.general_male,
            (Cohort::General, Sex::Female) => &self.general_female,
            (Cohort::Disabled, Sex::Male) => &self.disabled_male,
            (Cohort::Disabled, Sex::Female) => &self.disabled_female,
        }
    }

    pub fn table(&self, cohort: Cohort, sex: Sex) -> &MortalityTable {
        self.get(TableKey::new(cohort, sex))
    }
}

/// General-population rates (IAM 2012 Basic), ages 0-110, as (female, male)
pub fn general_rates() -> Vec<(f64, f64)> {
    vec![
        // Age 0-9
        (0.001801, 0.001783), (0.00045, 0.000446), (0.000287, 0.000306),
        (0.000199, 0.000254), (0.000152, 0.000193), (0.000139, 0.000186),
        (0.00013, 0.000184), (0.000122, 0.000177), (0.000105, 0.000159),
        (0.000098, 0.000143),
        // Age 10-19
        (0.000094, 0.000126), (0.000096, 0.000123), (0.000105, 0.000147),
        (0.00012, 0.000188), (0.000146, 0.000236), (0.000174, 0.000282),
        (0.000199, 0.000325), (0.00022, 0.000364), (0.000234, 0.000399),
        (0.000245, 0.00043),
        // Age 20-29
        (0.000253, 0.000459), (0.00026, 0.000492), (0.000266, 0.000526),
        (0.000272, 0.000569), (0.000275, 0.000616), (0.000277, 0.000669),
        (0.000284, 0.000728), (0.00029, 0.000764), (0.0003, 0.000789),
        (0.000313, 0.000808),
        // Age 30-39
        (0.000333, 0.000824), (0.000357, 0.000834), (0.000375, 0.000838),
        (0.00039, 0.000828), (0.000405, 0.000808), (0.000424, 0.000789),
        (0.000447, 0.000783), (0.000476, 0.0008), (0.000514, 0.000837),
        (0.00056, 0.000889),
        // Age 40-49
        (0.000613, 0.000955), (0.000667, 0.001029), (0.000723, 0.00111),
        (0.000774, 0.001188), (0.000823, 0.001268), (0.000866, 0.001355),
        (0.000917, 0.001464), (0.000983, 0.001615), (0.001072, 0.001808),
        (0.001168, 0.002032),
        // Age 50-59
        (0.00129, 0.002285), (0.001453, 0.002557), (0.001622, 0.002828),
        (0.001792, 0.003088), (0.001972, 0.003345), (0.002166, 0.003616),
        (0.002393, 0.003922), (0.002666, 0.004272), (0.003, 0.004681),
        (0.003393, 0.005146),
        // Age 60-69
        (0.003844, 0.005662), (0.004352, 0.006237), (0.004899, 0.006854),
        (0.005482, 0.00751), (0.006118, 0.00822), (0.006829, 0.009007),
        (0.007279, 0.009497), (0.007821, 0.010085), (0.008475, 0.010787),
        (0.009234, 0.011625),
        // Age 70-79
        (0.010083, 0.012619), (0.011011, 0.013798), (0.01203, 0.015195),
        (0.013154, 0.016834), (0.014415, 0.018733), (0.015869, 0.020905),
        (0.017555, 0.023367), (0.0195, 0.026155), (0.021758, 0.029306),
        (0.024412, 0.032858),
        // Age 80-89
        (0.027579, 0.036927), (0.031501, 0.041703), (0.036122, 0.046957),
        (0.041477, 0.052713), (0.047589, 0.059148), (0.054441, 0.066505),
        (0.061972, 0.075015), (0.070155, 0.084823), (0.078963, 0.095987),
        (0.088336, 0.108482),
        // Age 90-99
        (0.098197, 0.122214), (0.108323, 0.136799), (0.119188, 0.152409),
        (0.131334, 0.169078), (0.145521, 0.186882), (0.162722, 0.205844),
        (0.18212, 0.219247), (0.199661, 0.238612), (0.217946, 0.258341),
        (0.236834, 0.278219),
        // Age 100-109
        (0.256357, 0.298452), (0.283802, 0.32361), (0.304716, 0.344191),
        (0.325819, 0.364633), (0.346936, 0.384783), (0.367898, 0.4),
        (0.387607, 0.4), (0.4, 0.4), (0.4, 0.4), (0.4, 0.4),
        // Age 110 (terminal)
        (1.0, 1.0),
    ]
}

/// Disabled-lives rates, ages 18-81, as (female, male)
pub fn disabled_rates() -> Vec<(f64, f64)> {
    vec![
        // Age 18-27
        (0.003853, 0.005444), (0.003912, 0.005527), (0.003977, 0.005619),
        (0.004047, 0.005718), (0.004124, 0.005826), (0.004207, 0.005943),
        (0.004298, 0.006071), (0.004398, 0.00621), (0.004506, 0.006361),
        (0.004624, 0.006526),
        // Age 28-37
        (0.004752, 0.006705), (0.004892, 0.0069), (0.005045, 0.007111),
        (0.005211, 0.007342), (0.005392, 0.007592), (0.00559, 0.007865),
        (0.005805, 0.008161), (0.00604, 0.008484), (0.006295, 0.008835),
        (0.006574, 0.009216),
        // Age 38-47
        (0.006877, 0.009631), (0.007208, 0.010082), (0.007569, 0.010573),
        (0.007961, 0.011106), (0.008389, 0.011686), (0.008855, 0.012317),
        (0.009363, 0.013003), (0.009916, 0.013748), (0.010519, 0.014559),
        (0.011176, 0.01544),
        // Age 48-57
        (0.011891, 0.016398), (0.01267, 0.017439), (0.013518, 0.01857),
        (0.014442, 0.0198), (0.015448, 0.021136), (0.016543, 0.022587),
        (0.017735, 0.024164), (0.019034, 0.025877), (0.020447, 0.027737),
        (0.021985, 0.029756),
        // Age 58-67
        (0.023658, 0.031949), (0.025479, 0.034328), (0.02746, 0.036911),
        (0.029615, 0.039713), (0.031958, 0.042752), (0.034506, 0.046048),
        (0.037275, 0.049621), (0.040285, 0.053494), (0.043554, 0.057689),
        (0.047105, 0.062232),
        // Age 68-77
        (0.050961, 0.06715), (0.055146, 0.072471), (0.059687, 0.078227),
        (0.064611, 0.084448), (0.069949, 0.091169), (0.075734, 0.098425),
        (0.081997, 0.106255), (0.088776, 0.114696), (0.096108, 0.123789),
        (0.104033, 0.133576),
        // Age 78-81
        (0.112592, 0.144101), (0.121828, 0.155407), (0.131786, 0.167538),
        (1.0, 1.0),
    ]
}
