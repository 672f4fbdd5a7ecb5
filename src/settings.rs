//! Persisted user preferences.
//!
//! Settings are an explicit value: the caller loads them, hands them to the
//! assembler and saves the updated copy it gets back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::model::PlanAttributes;
use crate::schema::{PlanCategory, DISTRICT_DEFAULT_KEY_PREFIXES};

/// Environment variable overriding the settings location.
pub const SETTINGS_ENV: &str = "XPLAN_UMRING_SETTINGS";

/// The operation used last, preselected next time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    #[serde(rename = "bebauungsplan60")]
    Bebauungsplan60,
    #[serde(rename = "flaechennutzungsplan60")]
    Flaechennutzungsplan60,
    #[serde(rename = "landschaftsplan60")]
    Landschaftsplan60,
    #[serde(rename = "replacegeometry")]
    ReplaceGeometry,
}

impl From<PlanCategory> for Tool {
    fn from(category: PlanCategory) -> Self {
        match category {
            PlanCategory::Bebauungsplan => Tool::Bebauungsplan60,
            PlanCategory::Flaechennutzungsplan => Tool::Flaechennutzungsplan60,
            PlanCategory::Landschaftsplan => Tool::Landschaftsplan60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub municipality: String,
    /// AGS of the municipality.
    pub municipality_key: String,
    pub last_tool: Tool,
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `$XPLAN_UMRING_SETTINGS`, else `$HOME/.config/xplan-umring/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(path));
        }
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("xplan-umring")
                .join("settings.json")
        })
    }

    /// Takes a municipality selection such as `"Viersen (05166032)"`.
    /// A label without parentheses is a name without key.
    pub fn select_municipality(&mut self, label: &str) {
        match label.find('(') {
            Some(open) => {
                self.municipality = label[..open].trim().to_string();
                self.municipality_key = label[open + 1..]
                    .find(')')
                    .map(|close| label[open + 1..open + 1 + close].trim().to_string())
                    .unwrap_or_default();
            }
            None => {
                self.municipality = label.trim().to_string();
                self.municipality_key.clear();
            }
        }
    }

    /// Inverse of [`Settings::select_municipality`].
    pub fn municipality_label(&self) -> String {
        if self.municipality_key.is_empty() {
            self.municipality.clone()
        } else {
            format!("{} ({})", self.municipality, self.municipality_key)
        }
    }

    /// Fills attributes the caller left unset from the stored preferences.
    pub fn apply_defaults(&self, category: PlanCategory, attributes: &PlanAttributes) -> PlanAttributes {
        let mut resolved = attributes.clone();

        if resolved.municipality.is_none() && !self.municipality.is_empty() {
            resolved.municipality = Some(self.municipality.clone());
        }
        if resolved.municipality_key.is_none() && !self.municipality_key.is_empty() {
            resolved.municipality_key = Some(self.municipality_key.clone());
        }

        if resolved.district.is_none() && category.schema().defaults_district_to_municipality {
            let key = resolved.municipality_key.as_deref().unwrap_or_default();
            if DISTRICT_DEFAULT_KEY_PREFIXES
                .iter()
                .any(|prefix| key.starts_with(prefix))
            {
                resolved.district = resolved.municipality.clone();
            }
        }

        resolved
    }

    /// Copy updated with the municipality actually used and the tool.
    pub fn remember(&self, tool: Tool, attributes: Option<&PlanAttributes>) -> Settings {
        let mut updated = self.clone();
        updated.last_tool = tool;
        if let Some(attributes) = attributes {
            if let Some(municipality) = &attributes.municipality {
                updated.municipality = municipality.clone();
            }
            if let Some(key) = &attributes.municipality_key {
                updated.municipality_key = key.clone();
            }
        }
        updated
    }
}
