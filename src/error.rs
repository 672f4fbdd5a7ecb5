use thiserror::Error;

/// Hard failures of assembling, reading or rewriting an XPlanGML document.
///
/// Soft problems (unusual characters in the plan name, overlong names) are
/// reported as [`crate::model::Warning`] values instead.
#[derive(Debug, Error)]
pub enum XPlanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidAttribute { field: String, reason: String },

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("{0} namespace could not be found in the document")]
    NamespaceNotFound(String),

    #[error("No supported *_Plan record found in the document")]
    NoPlanRecord,

    #[error("{count} {record} records found, only documents with a single area are supported")]
    MultipleAreas { record: String, count: usize },

    #[error("{record} has no raeumlicherGeltungsbereich")]
    MissingExtent { record: String },

    #[error("raeumlicherGeltungsbereich of {record} has no srsName attribute")]
    MissingSrsName { record: String },
}

impl XPlanError {
    pub fn invalid_attribute(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for XPlanError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XPlanError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for XPlanError {
    fn from(e: quick_xml::escape::EscapeError) -> Self {
        Self::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XPlanError>;
