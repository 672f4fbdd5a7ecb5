use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::DEFAULT_CRS;

/// User supplied attributes of a plan.
///
/// Optional text fields distinguish "not supplied" (`None`, settings defaults
/// may fill them in) from an explicitly empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAttributes {
    pub name: String,
    pub number: Option<String>,
    pub municipality: Option<String>,
    /// Ortsteil.
    pub district: Option<String>,
    /// Amtlicher Gemeindeschlüssel (AGS), eight digits.
    pub municipality_key: Option<String>,
    /// Plangeber.
    pub authority: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub plan_type: u16,
    pub legal_status: u16,
    pub status_date: Option<NaiveDate>,
    pub crs: String,
    pub scale: Option<u32>,
    pub production_date: Option<NaiveDate>,
    pub federal_state: Option<u16>,
    pub external_effect: Option<bool>,
}

impl Default for PlanAttributes {
    fn default() -> Self {
        Self {
            name: String::new(),
            number: None,
            municipality: None,
            district: None,
            municipality_key: None,
            authority: None,
            description: None,
            comment: None,
            plan_type: 1000,
            legal_status: 1000,
            status_date: None,
            crs: DEFAULT_CRS.to_string(),
            scale: None,
            production_date: None,
            federal_state: None,
            external_effect: None,
        }
    }
}

impl PlanAttributes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy with surrounding whitespace removed from the identifying text
    /// fields. Description and comment are taken as entered.
    pub fn trimmed(&self) -> Self {
        let trim = |value: &Option<String>| value.as_deref().map(|v| v.trim().to_string());
        Self {
            name: self.name.trim().to_string(),
            number: trim(&self.number),
            municipality: trim(&self.municipality),
            district: trim(&self.district),
            municipality_key: trim(&self.municipality_key),
            authority: trim(&self.authority),
            crs: self.crs.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Non-blocking problems found while assembling a document.
///
/// Downstream systems (the xPlanBox) may reject such documents, the document
/// is produced anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    InvalidNameCharacters { characters: Vec<char> },
    NameTooLong { length: usize, limit: usize },
    MunicipalityKeyFormat { value: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidNameCharacters { characters } => {
                let found: String = characters.iter().collect();
                write!(
                    f,
                    "Plan name contains characters not allowed by the xPlanBox ({found}). Allowed are: A-Z a-z 0-9 . () _ - ä ü ö Ä Ü Ö ß and spaces"
                )
            }
            Warning::NameTooLong { length, limit } => write!(
                f,
                "Plan name has {length} characters, the xPlanBox allows at most {limit}"
            ),
            Warning::MunicipalityKeyFormat { value } => write!(
                f,
                "Municipality key '{value}' is not an 8-digit AGS"
            ),
        }
    }
}
