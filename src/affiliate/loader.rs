//! Load beneficiary lists from CSV
//!
//! Expected columns: `Relationship,Age,Sex,Disabled,AssignedShare`
//! (`Disabled` and `AssignedShare` may be left empty).

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{Beneficiary, Person, Relationship, Sex};
use crate::error::{EngineError, EngineResult};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Relationship")]
    relationship: String,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Disabled", default)]
    disabled: Option<String>,
    #[serde(rename = "AssignedShare", default)]
    assigned_share: Option<f64>,
}

impl CsvRow {
    fn into_beneficiary(self) -> EngineResult<Beneficiary> {
        let relationship = match self.relationship.trim().to_ascii_lowercase().as_str() {
            "spouse" => Relationship::Spouse,
            "domestic_partner" | "partner" => Relationship::DomesticPartner,
            "child" => Relationship::Child,
            "father" => Relationship::Father,
            "mother" => Relationship::Mother,
            other => {
                return Err(EngineError::invalid(format!("unknown relationship: {}", other)))
            }
        };

        let sex = match self.sex.trim() {
            "M" | "Male" => Sex::Male,
            "F" | "Female" => Sex::Female,
            other => return Err(EngineError::invalid(format!("unknown sex: {}", other))),
        };

        let is_disabled = match self.disabled.as_deref().map(str::trim) {
            None | Some("") | Some("N") | Some("false") | Some("0") => false,
            Some("Y") | Some("true") | Some("1") => true,
            Some(other) => {
                return Err(EngineError::invalid(format!("unknown disabled flag: {}", other)))
            }
        };

        Ok(Beneficiary {
            person: Person {
                age: self.age,
                sex,
                is_disabled,
            },
            relationship,
            assigned_share: self.assigned_share,
        })
    }
}

/// Load beneficiaries from a CSV file
pub fn load_beneficiaries(path: &Path) -> EngineResult<Vec<Beneficiary>> {
    let file = std::fs::File::open(path)?;
    load_beneficiaries_from_reader(file)
}

/// Load beneficiaries from any reader (for testing)
pub fn load_beneficiaries_from_reader<R: Read>(reader: R) -> EngineResult<Vec<Beneficiary>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut beneficiaries = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        beneficiaries.push(row.into_beneficiary()?);
    }

    Ok(beneficiaries)
}
