//! Affiliate and beneficiary records supplied by the caller

use serde::{Deserialize, Serialize};

/// Sex of a person, selecting the male or female mortality table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(alias = "M", alias = "male")]
    Male,
    #[serde(alias = "F", alias = "female")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

/// A life whose survival is modeled: the affiliate or any dependent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Age in completed years
    pub age: u32,

    pub sex: Sex,

    /// Disabled lives are valued on the disabled-cohort tables
    #[serde(default)]
    pub is_disabled: bool,
}

impl Person {
    pub fn new(age: u32, sex: Sex) -> Self {
        Self {
            age,
            sex,
            is_disabled: false,
        }
    }

    pub fn disabled(age: u32, sex: Sex) -> Self {
        Self {
            age,
            sex,
            is_disabled: true,
        }
    }
}

/// Relationship of a beneficiary to the affiliate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    DomesticPartner,
    Child,
    Father,
    Mother,
}

impl Relationship {
    /// Spouse or domestic partner
    pub fn is_partner(&self) -> bool {
        matches!(self, Relationship::Spouse | Relationship::DomesticPartner)
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, Relationship::Father | Relationship::Mother)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Spouse => "spouse",
            Relationship::DomesticPartner => "domestic_partner",
            Relationship::Child => "child",
            Relationship::Father => "father",
            Relationship::Mother => "mother",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependent entitled to part of the affiliate's pension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    #[serde(flatten)]
    pub person: Person,

    pub relationship: Relationship,

    /// Share fixed by the caller (e.g. by court order), overriding the
    /// statutory rule for this beneficiary. Fraction in (0, 1].
    #[serde(default)]
    pub assigned_share: Option<f64>,
}

impl Beneficiary {
    pub fn new(person: Person, relationship: Relationship) -> Self {
        Self {
            person,
            relationship,
            assigned_share: None,
        }
    }

    pub fn with_assigned_share(mut self, share: f64) -> Self {
        self.assigned_share = Some(share);
        self
    }
}
