//! Per-category schema table of the XPlanGML 6.0 documents.
//!
//! Every plan category (Bebauungsplan, Flächennutzungsplan, Landschaftsplan)
//! shares one assembler. What differs between them lives here as data: the
//! record type names, the element layout of the plan record, the closed code
//! lists and the lifecycle-date element that belongs to each legal status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::XPlanError;

pub const XPLAN_NS: &str = "http://www.xplanung.de/xplangml/6/0";
pub const XPLAN_NS_BASE: &str = "http://www.xplanung.de/xplangml/";
pub const GML_NS: &str = "http://www.opengis.net/gml/3.2";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Namespace declarations carried by the root element of a generated document.
pub const ROOT_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns:adv", "http://www.adv-online.de/nas"),
    ("xmlns:gml", GML_NS),
    ("xmlns:xlink", XLINK_NS),
    ("xmlns:xplan", XPLAN_NS),
    ("xmlns:xs", "http://www.w3.org/2001/XMLSchema"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xmlns:wfs", "http://www.opengis.net/wfs/2.0"),
];

/// Coordinate reference systems accepted by the xPlanBox.
pub const SUPPORTED_CRS: &[&str] = &[
    "EPSG:25831",
    "EPSG:25832",
    "EPSG:25833",
    "EPSG:5649",
    "EPSG:4647",
    "EPSG:5650",
    "EPSG:5651",
    "EPSG:5652",
    "EPSG:5653",
    "EPSG:31466",
    "EPSG:31467",
    "EPSG:31468",
    "EPSG:31469",
];

pub const DEFAULT_CRS: &str = "EPSG:25832";

/// AGS prefixes of municipalities whose district name is usually the
/// municipality name itself (Kreis Viersen and neighbours).
pub const DISTRICT_DEFAULT_KEY_PREFIXES: &[&str] = &["05114", "05154", "05158", "05166", "05170"];

/// Plan record prefixes searched for when an existing document is edited.
pub const KNOWN_PLAN_PREFIXES: &[&str] = &["BP", "FP", "LP", "RP", "SO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub code: u16,
    pub label: &'static str,
}

/// A legal status (`rechtsstand`) and the lifecycle-date element it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalStatus {
    pub code: u16,
    pub label: &'static str,
    pub alias: &'static str,
    pub date_field: &'static str,
}

/// Elements of a plan record, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanField {
    Envelope,
    Name,
    Number,
    Description,
    Comment,
    ProductionDate,
    Scale,
    Extent,
    Municipality,
    Authority,
    FederalState,
    ExternalEffect,
    PlanType,
    LegalStatus,
    LifecycleDate(&'static str),
    AreaLink,
}

impl PlanField {
    /// Local element name inside the XPlanung namespace. The envelope is a GML
    /// element and has none.
    pub fn local_name(&self) -> Option<&'static str> {
        match self {
            PlanField::Envelope => None,
            PlanField::Name => Some("name"),
            PlanField::Number => Some("nummer"),
            PlanField::Description => Some("beschreibung"),
            PlanField::Comment => Some("kommentar"),
            PlanField::ProductionDate => Some("technHerstellDatum"),
            PlanField::Scale => Some("erstellungsMassstab"),
            PlanField::Extent => Some("raeumlicherGeltungsbereich"),
            PlanField::Municipality => Some("gemeinde"),
            PlanField::Authority => Some("plangeber"),
            PlanField::FederalState => Some("bundesland"),
            PlanField::ExternalEffect => Some("rechtlicheAussenwirkung"),
            PlanField::PlanType => Some("planArt"),
            PlanField::LegalStatus => Some("rechtsstand"),
            PlanField::LifecycleDate(name) => Some(*name),
            PlanField::AreaLink => Some("bereich"),
        }
    }
}

#[derive(Debug)]
pub struct CategorySchema {
    pub prefix: &'static str,
    pub display_name: &'static str,
    pub plan_types: &'static [Code],
    pub statuses: &'static [LegalStatus],
    pub fields: &'static [PlanField],
    /// `ortsteilName` is removed instead of written empty.
    pub drops_empty_district: bool,
    /// `ortsteilName` defaults to the municipality name for municipalities of
    /// [`DISTRICT_DEFAULT_KEY_PREFIXES`].
    pub defaults_district_to_municipality: bool,
    /// `rechtsstand` is written even when no status date is given. Every
    /// XPlanGML 6.0 category sets this; `false` would drop the code as well.
    pub keeps_status_without_date: bool,
}

impl CategorySchema {
    pub fn plan_record(&self) -> String {
        format!("{}_Plan", self.prefix)
    }

    pub fn area_record(&self) -> String {
        format!("{}_Bereich", self.prefix)
    }

    pub fn has_field(&self, field: PlanField) -> bool {
        self.fields.contains(&field)
    }

    /// Names of every lifecycle-date element declared for this category.
    pub fn lifecycle_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(|field| match field {
            PlanField::LifecycleDate(name) => Some(*name),
            _ => None,
        })
    }

    pub fn status_by_code(&self, code: u16) -> Option<&'static LegalStatus> {
        self.statuses.iter().find(|status| status.code == code)
    }

    /// Looks a status up by code (`"4000"`, `"4000 (InkraftGetreten)"`),
    /// label (`"InkraftGetreten"`) or alias (`"in-force"`).
    pub fn status(&self, input: &str) -> Option<&'static LegalStatus> {
        let token = input.split_whitespace().next()?;
        if let Ok(code) = token.parse::<u16>() {
            return self.status_by_code(code);
        }
        self.statuses.iter().find(|status| {
            status.label.eq_ignore_ascii_case(input.trim()) || status.alias == input.trim()
        })
    }

    pub fn plan_type(&self, code: u16) -> Option<&'static Code> {
        self.plan_types.iter().find(|plan_type| plan_type.code == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanCategory {
    /// Zoning plan.
    Bebauungsplan,
    /// Land-use plan.
    Flaechennutzungsplan,
    /// Landscape plan.
    Landschaftsplan,
}

impl PlanCategory {
    pub const ALL: [PlanCategory; 3] = [
        PlanCategory::Bebauungsplan,
        PlanCategory::Flaechennutzungsplan,
        PlanCategory::Landschaftsplan,
    ];

    pub fn schema(&self) -> &'static CategorySchema {
        match self {
            PlanCategory::Bebauungsplan => &BP_SCHEMA,
            PlanCategory::Flaechennutzungsplan => &FP_SCHEMA,
            PlanCategory::Landschaftsplan => &LP_SCHEMA,
        }
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().display_name)
    }
}

impl FromStr for PlanCategory {
    type Err = XPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bp" | "bebauungsplan" | "zoning" | "zoning-plan" => Ok(PlanCategory::Bebauungsplan),
            "fp" | "flaechennutzungsplan" | "land-use" | "land-use-plan" => {
                Ok(PlanCategory::Flaechennutzungsplan)
            }
            "lp" | "landschaftsplan" | "landscape" | "landscape-plan" => {
                Ok(PlanCategory::Landschaftsplan)
            }
            other => Err(XPlanError::invalid_attribute(
                "category",
                format!("unknown plan category '{other}'"),
            )),
        }
    }
}

/// Federal states (`bundesland`) of landscape plans.
pub const FEDERAL_STATES: &[Code] = &[
    Code { code: 1000, label: "Brandenburg" },
    Code { code: 1100, label: "Berlin" },
    Code { code: 1200, label: "Baden-Württemberg" },
    Code { code: 1300, label: "Bayern" },
    Code { code: 1400, label: "Bremen" },
    Code { code: 1500, label: "Hessen" },
    Code { code: 1600, label: "Hamburg" },
    Code { code: 1700, label: "Mecklenburg-Vorpommern" },
    Code { code: 1800, label: "Niedersachsen" },
    Code { code: 1900, label: "Nordrhein-Westfalen" },
    Code { code: 2000, label: "Rheinland-Pfalz" },
    Code { code: 2100, label: "Schleswig-Holstein" },
    Code { code: 2200, label: "Saarland" },
    Code { code: 2300, label: "Sachsen" },
    Code { code: 2400, label: "Sachsen-Anhalt" },
    Code { code: 2500, label: "Thüringen" },
    Code { code: 3000, label: "Der Bund" },
];

pub fn federal_state(code: u16) -> Option<&'static Code> {
    FEDERAL_STATES.iter().find(|state| state.code == code)
}

static BP_SCHEMA: CategorySchema = CategorySchema {
    prefix: "BP",
    display_name: "Bebauungsplan",
    plan_types: &[
        Code { code: 1000, label: "BPlan" },
        Code { code: 10000, label: "EinfacherBPlan" },
        Code { code: 10001, label: "QualifizierterBPlan" },
        Code { code: 3000, label: "VorhabenbezogenerBPlan" },
        Code { code: 4000, label: "InnenbereichsSatzung" },
        Code { code: 40000, label: "KlarstellungsSatzung" },
        Code { code: 40001, label: "EntwicklungsSatzung" },
        Code { code: 40002, label: "ErgaenzungsSatzung" },
        Code { code: 5000, label: "AussenbereichsSatzung" },
        Code { code: 7000, label: "OertlicheBauvorschrift" },
        Code { code: 9999, label: "Sonstiges" },
    ],
    statuses: &[
        LegalStatus {
            code: 1000,
            label: "Aufstellungsbeschluss",
            alias: "proposal-resolution",
            date_field: "aufstellungsbeschlussDatum",
        },
        LegalStatus {
            code: 2000,
            label: "ImVerfahren",
            alias: "in-process",
            date_field: "aenderungenBisDatum",
        },
        LegalStatus {
            code: 3000,
            label: "Satzung",
            alias: "statute-adopted",
            date_field: "satzungsbeschlussDatum",
        },
        LegalStatus {
            code: 4000,
            label: "InkraftGetreten",
            alias: "in-force",
            date_field: "inkrafttretensDatum",
        },
    ],
    fields: &[
        PlanField::Envelope,
        PlanField::Name,
        PlanField::Number,
        PlanField::ProductionDate,
        PlanField::Scale,
        PlanField::Extent,
        PlanField::Municipality,
        PlanField::Authority,
        PlanField::PlanType,
        PlanField::LegalStatus,
        PlanField::LifecycleDate("aenderungenBisDatum"),
        PlanField::LifecycleDate("aufstellungsbeschlussDatum"),
        PlanField::LifecycleDate("inkrafttretensDatum"),
        PlanField::LifecycleDate("satzungsbeschlussDatum"),
        PlanField::AreaLink,
    ],
    drops_empty_district: true,
    defaults_district_to_municipality: true,
    keeps_status_without_date: true,
};

static FP_SCHEMA: CategorySchema = CategorySchema {
    prefix: "FP",
    display_name: "Flächennutzungsplan",
    plan_types: &[
        Code { code: 1000, label: "FPlan" },
        Code { code: 2000, label: "GemeinsamerFPlan" },
        Code { code: 3000, label: "RegionalerFPlan" },
        Code { code: 4000, label: "FPlanRegPlan" },
        Code { code: 5000, label: "SachlicherTeilplan" },
        Code { code: 9999, label: "Sonstiges" },
    ],
    statuses: &[
        LegalStatus {
            code: 1000,
            label: "Aufstellungsbeschluss",
            alias: "proposal-resolution",
            date_field: "aufstellungsbeschlussDatum",
        },
        LegalStatus {
            code: 2000,
            label: "ImVerfahren",
            alias: "in-process",
            date_field: "entwurfsbeschlussDatum",
        },
        LegalStatus {
            code: 4000,
            label: "Wirksamkeit",
            alias: "in-force",
            date_field: "wirksamkeitsDatum",
        },
        LegalStatus {
            code: 5000,
            label: "Untergegangen",
            alias: "repealed",
            date_field: "untergangsDatum",
        },
    ],
    fields: &[
        PlanField::Envelope,
        PlanField::Name,
        PlanField::Number,
        PlanField::Description,
        PlanField::Comment,
        PlanField::LifecycleDate("untergangsDatum"),
        PlanField::ProductionDate,
        PlanField::Scale,
        PlanField::Extent,
        PlanField::Municipality,
        PlanField::PlanType,
        PlanField::LegalStatus,
        PlanField::LifecycleDate("aufstellungsbeschlussDatum"),
        PlanField::LifecycleDate("entwurfsbeschlussDatum"),
        PlanField::LifecycleDate("wirksamkeitsDatum"),
        PlanField::AreaLink,
    ],
    drops_empty_district: false,
    defaults_district_to_municipality: true,
    keeps_status_without_date: true,
};

static LP_SCHEMA: CategorySchema = CategorySchema {
    prefix: "LP",
    display_name: "Landschaftsplan",
    plan_types: &[
        Code { code: 1000, label: "Landschaftsprogramm" },
        Code { code: 2000, label: "Landschaftsrahmenplan" },
        Code { code: 3000, label: "Landschaftsplan" },
        Code { code: 4000, label: "Gruenordnungsplan" },
        Code { code: 9999, label: "Sonstiges" },
    ],
    statuses: &[
        LegalStatus {
            code: 1000,
            label: "Aufstellungsbeschluss",
            alias: "proposal-resolution",
            date_field: "aufstellungsbeschlussDatum",
        },
        LegalStatus {
            code: 4000,
            label: "Wirksamkeit",
            alias: "in-force",
            date_field: "inkrafttretenDatum",
        },
        LegalStatus {
            code: 5000,
            label: "Untergegangen",
            alias: "repealed",
            date_field: "untergangsDatum",
        },
    ],
    fields: &[
        PlanField::Envelope,
        PlanField::Name,
        PlanField::Number,
        PlanField::LifecycleDate("untergangsDatum"),
        PlanField::Extent,
        PlanField::FederalState,
        PlanField::ExternalEffect,
        PlanField::PlanType,
        PlanField::Municipality,
        PlanField::Authority,
        PlanField::LegalStatus,
        PlanField::LifecycleDate("aufstellungsbeschlussDatum"),
        PlanField::LifecycleDate("inkrafttretenDatum"),
        PlanField::AreaLink,
    ],
    drops_empty_district: false,
    defaults_district_to_municipality: false,
    keeps_status_without_date: true,
};
