//! Soft checks against the limits of the xPlanBox import.
//!
//! Nothing here fails; every finding becomes a [`Warning`] that the caller
//! logs and the document is still produced.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::Warning;

pub const NAME_LENGTH_LIMIT: usize = 100;

static DISALLOWED_NAME_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9.()_\-äüöÄÜÖß\s]").expect("name character pattern is valid")
});

static MUNICIPALITY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("AGS pattern is valid"));

/// Checks the plan name for characters and length the xPlanBox rejects.
pub fn check_plan_name(name: &str) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let mut characters: Vec<char> = Vec::new();
    for found in DISALLOWED_NAME_CHARACTERS.find_iter(name) {
        for c in found.as_str().chars() {
            if !characters.contains(&c) {
                characters.push(c);
            }
        }
    }
    if !characters.is_empty() {
        warnings.push(Warning::InvalidNameCharacters { characters });
    }

    let length = name.chars().count();
    if length > NAME_LENGTH_LIMIT {
        warnings.push(Warning::NameTooLong {
            length,
            limit: NAME_LENGTH_LIMIT,
        });
    }

    warnings
}

/// An empty key is accepted, anything else has to be eight ASCII digits.
pub fn check_municipality_key(key: &str) -> Option<Warning> {
    if key.is_empty() || MUNICIPALITY_KEY.is_match(key) {
        None
    } else {
        Some(Warning::MunicipalityKeyFormat {
            value: key.to_string(),
        })
    }
}
