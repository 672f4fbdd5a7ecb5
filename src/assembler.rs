//! Builds a fresh XPlanGML 6.0 document for one plan.
//!
//! One assembler serves every category; the record names, the element layout
//! of the plan record and the status/date table come from
//! [`CategorySchema`]. The plan record is laid out with every lifecycle-date
//! element present and then pruned down to the one matching the status.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive;
use crate::document::{Document, Element};
use crate::error::{Result, XPlanError};
use crate::geometry::NormalizedGeometry;
use crate::gml;
use crate::identifiers::{href, IdGenerator};
use crate::model::{PlanAttributes, Warning};
use crate::sanitize;
use crate::schema::{
    federal_state, CategorySchema, LegalStatus, PlanCategory, PlanField, ROOT_NAMESPACES,
    SUPPORTED_CRS,
};
use crate::settings::{Settings, Tool};
use crate::validation;

const XPLAN: &str = "xplan";
const GML: &str = "gml";

/// `nummer` of the single area record.
pub const AREA_NUMBER: &str = "0";

#[derive(Debug, Clone)]
pub struct AssembledPlan {
    pub category: PlanCategory,
    pub document: Document,
    /// Sanitized plan name, the archive is `<file_stem>.zip`.
    pub file_stem: String,
    pub warnings: Vec<Warning>,
    /// Settings updated with this run, to be saved by the caller.
    pub settings: Settings,
}

impl AssembledPlan {
    /// Writes `<output_dir>/<file_stem>.zip` and returns its path.
    pub fn write_archive(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = archive::archive_path(output_dir, &self.file_stem);
        archive::write_archive(&path, &self.document)?;
        info!("XPlan archive written to {}", path.display());
        Ok(path)
    }
}

/// Field values after defaults and validation.
struct ResolvedPlan<'a> {
    schema: &'static CategorySchema,
    attributes: PlanAttributes,
    status: &'static LegalStatus,
    geometry: &'a NormalizedGeometry,
}

pub fn assemble(
    category: PlanCategory,
    attributes: &PlanAttributes,
    geometry: &NormalizedGeometry,
    settings: &Settings,
) -> Result<AssembledPlan> {
    let schema = category.schema();
    let attributes = settings.apply_defaults(category, &attributes.trimmed());
    let status = validate(schema, &attributes)?;

    let mut warnings = validation::check_plan_name(&attributes.name);
    if let Some(warning) = attributes
        .municipality_key
        .as_deref()
        .and_then(validation::check_municipality_key)
    {
        warnings.push(warning);
    }
    for warning in &warnings {
        warn!("{warning}");
    }

    info!(
        "Assembling {} '{}' ({}, rechtsstand {})",
        schema.display_name, attributes.name, attributes.crs, status.code
    );

    let plan = ResolvedPlan {
        schema,
        attributes,
        status,
        geometry,
    };
    let document = build_document(&plan)?;

    let file_stem = sanitize::file_stem(&plan.attributes.name);
    let settings = settings.remember(Tool::from(category), Some(&plan.attributes));

    Ok(AssembledPlan {
        category,
        document,
        file_stem,
        warnings,
        settings,
    })
}

/// Hard validation. Returns the selected legal status.
fn validate(
    schema: &'static CategorySchema,
    attributes: &PlanAttributes,
) -> Result<&'static LegalStatus> {
    if attributes.name.trim().is_empty() {
        return Err(XPlanError::invalid_attribute("name", "plan name is required"));
    }

    let status = schema.status_by_code(attributes.legal_status).ok_or_else(|| {
        XPlanError::invalid_attribute(
            "legal_status",
            format!(
                "{} is not a {} status, expected one of {}",
                attributes.legal_status,
                schema.display_name,
                codes(schema.statuses.iter().map(|s| s.code))
            ),
        )
    })?;

    if schema.plan_type(attributes.plan_type).is_none() {
        return Err(XPlanError::invalid_attribute(
            "plan_type",
            format!(
                "{} is not a {} plan type, expected one of {}",
                attributes.plan_type,
                schema.display_name,
                codes(schema.plan_types.iter().map(|t| t.code))
            ),
        ));
    }

    if !SUPPORTED_CRS.contains(&attributes.crs.as_str()) {
        return Err(XPlanError::invalid_attribute(
            "crs",
            format!(
                "{} is not supported, expected one of {}",
                attributes.crs,
                SUPPORTED_CRS.join(", ")
            ),
        ));
    }

    if schema.has_field(PlanField::FederalState) {
        let code = attributes.federal_state.ok_or_else(|| {
            XPlanError::invalid_attribute("federal_state", "required for this plan category")
        })?;
        if federal_state(code).is_none() {
            return Err(XPlanError::invalid_attribute(
                "federal_state",
                format!("unknown federal state code {code}"),
            ));
        }
    }

    if schema.has_field(PlanField::ExternalEffect) && attributes.external_effect.is_none() {
        return Err(XPlanError::invalid_attribute(
            "external_effect",
            "required for this plan category",
        ));
    }

    Ok(status)
}

fn codes(codes: impl Iterator<Item = u16>) -> String {
    codes.map(|code| code.to_string()).collect::<Vec<_>>().join(", ")
}

fn build_document(plan: &ResolvedPlan) -> Result<Document> {
    let mut ids = IdGenerator::new();
    let document_id = ids.document_id();
    let area_id = ids.record_id();
    let plan_id = ids.record_id();

    let schema = plan.schema;
    let crs = plan.attributes.crs.as_str();
    let bbox = plan.geometry.bbox();

    let area = Element::new(xplan(&schema.area_record()))
        .with_attribute("gml:id", area_id.as_str())
        .with_child(Element::new(xplan("nummer")).with_text(AREA_NUMBER))
        .with_child(Element::new(xplan("name")).with_text(plan.attributes.name.as_str()))
        .with_child(Element::new(xplan("gehoertZuPlan")).with_attribute("xlink:href", href(&plan_id)));

    let mut plan_record = Element::new(xplan(&schema.plan_record())).with_attribute("gml:id", plan_id.as_str());
    for field in schema.fields {
        if let Some(element) = field_element(*field, plan, &area_id, &mut ids) {
            plan_record = plan_record.with_child(element);
        }
    }
    prune_lifecycle_dates(&mut plan_record, schema, plan.status, plan.attributes.status_date)?;

    let mut root = Element::new(xplan("XPlanAuszug"));
    for (key, value) in ROOT_NAMESPACES {
        root.set_attribute(*key, *value);
    }
    root.set_attribute("gml:id", document_id);
    let root = root
        .with_child(gml::bounded_by(GML, crs, bbox))
        .with_child(Element::new(format!("{GML}:featureMember")).with_child(area))
        .with_child(Element::new(format!("{GML}:featureMember")).with_child(plan_record));

    Ok(Document::new(root))
}

fn xplan(local: &str) -> String {
    format!("{XPLAN}:{local}")
}

/// Element for one plan field, `None` when the field is left out.
fn field_element(
    field: PlanField,
    plan: &ResolvedPlan,
    area_id: &str,
    ids: &mut IdGenerator,
) -> Option<Element> {
    let attributes = &plan.attributes;
    let crs = attributes.crs.as_str();
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    let name = field.local_name().map(xplan);
    let element = || Element::new(name.clone().unwrap_or_default());

    let built = match field {
        PlanField::Envelope => gml::bounded_by(GML, crs, plan.geometry.bbox()),
        PlanField::Name => element().with_text(attributes.name.as_str()),
        PlanField::Number => element().with_text(text(&attributes.number)),
        PlanField::Description => element().with_text(text(&attributes.description)),
        PlanField::Comment => {
            let mut comment = element();
            comment.set_cdata(text(&attributes.comment));
            comment
        }
        PlanField::ProductionDate => element().with_text(format_date(attributes.production_date?)),
        PlanField::Scale => element().with_text(attributes.scale?.to_string()),
        PlanField::Extent => {
            element().with_child(gml::multi_surface(GML, plan.geometry, crs, ids))
        }
        PlanField::Municipality => {
            let district = text(&attributes.district);
            let mut municipality = Element::new(xplan("XP_Gemeinde"))
                .with_child(Element::new(xplan("ags")).with_text(text(&attributes.municipality_key)))
                .with_child(
                    Element::new(xplan("gemeindeName")).with_text(text(&attributes.municipality)),
                );
            if !(district.is_empty() && plan.schema.drops_empty_district) {
                municipality =
                    municipality.with_child(Element::new(xplan("ortsteilName")).with_text(district));
            }
            element().with_child(municipality)
        }
        PlanField::Authority => element().with_child(
            Element::new(xplan("XP_Plangeber"))
                .with_child(Element::new(xplan("name")).with_text(text(&attributes.authority))),
        ),
        PlanField::FederalState => element().with_text(attributes.federal_state?.to_string()),
        PlanField::ExternalEffect => element().with_text(attributes.external_effect?.to_string()),
        PlanField::PlanType => element().with_text(attributes.plan_type.to_string()),
        PlanField::LegalStatus => element().with_text(plan.status.code.to_string()),
        PlanField::LifecycleDate(_) => element(),
        PlanField::AreaLink => element().with_attribute("xlink:href", href(area_id)),
    };
    Some(built)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Keeps only the lifecycle-date element of `status` and fills in `date`.
///
/// Without a date every lifecycle-date element goes and `rechtsstand` stays,
/// unless the category clears [`CategorySchema::keeps_status_without_date`].
pub fn prune_lifecycle_dates(
    plan_record: &mut Element,
    schema: &CategorySchema,
    status: &LegalStatus,
    date: Option<NaiveDate>,
) -> Result<()> {
    for field in schema.lifecycle_fields() {
        let name = xplan(field);
        match date {
            Some(date) if field == status.date_field => {
                let element = plan_record.child_mut(&name).ok_or_else(|| {
                    XPlanError::Xml(format!("{} has no {name} element", schema.plan_record()))
                })?;
                element.set_text(format_date(date));
                debug!("{name} set to {date}");
            }
            _ => {
                if plan_record.remove_child(&name).is_some() {
                    debug!("{name} removed");
                }
            }
        }
    }

    if date.is_none() && !schema.keeps_status_without_date {
        plan_record.remove_child(&xplan("rechtsstand"));
        debug!("rechtsstand removed, no status date given");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> NormalizedGeometry {
        NormalizedGeometry::from_coords(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap()
    }

    fn zoning_attributes() -> PlanAttributes {
        let mut attributes = PlanAttributes::new("Bebauungsplan Nr. 12/Ä");
        attributes.number = Some("12".to_string());
        attributes.municipality = Some("Viersen".to_string());
        attributes.municipality_key = Some("05166032".to_string());
        attributes.authority = Some("Stadt Viersen".to_string());
        attributes.legal_status = 4000;
        attributes.status_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        attributes
    }

    fn landscape_attributes() -> PlanAttributes {
        let mut attributes = PlanAttributes::new("Landschaftsplan Grenzwald");
        attributes.plan_type = 3000;
        attributes.federal_state = Some(1900);
        attributes.external_effect = Some(true);
        attributes
    }

    fn plan_record<'a>(document: &'a Document, category: PlanCategory) -> &'a Element {
        document
            .root
            .find(&xplan(&category.schema().plan_record()))
            .unwrap()
    }

    fn child_names(element: &Element) -> Vec<&str> {
        element.child_elements().map(|child| child.local_name()).collect()
    }

    #[test]
    fn test_zoning_plan_layout() {
        let mut attributes = zoning_attributes();
        attributes.scale = Some(1000);
        attributes.production_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &attributes,
            &ring(),
            &Settings::default(),
        )
        .unwrap();

        let plan = plan_record(&assembled.document, PlanCategory::Bebauungsplan);
        assert_eq!(
            child_names(plan),
            vec![
                "boundedBy",
                "name",
                "nummer",
                "technHerstellDatum",
                "erstellungsMassstab",
                "raeumlicherGeltungsbereich",
                "gemeinde",
                "plangeber",
                "planArt",
                "rechtsstand",
                "inkrafttretensDatum",
                "bereich",
            ]
        );
        assert_eq!(plan.child("xplan:inkrafttretensDatum").unwrap().text(), "2024-01-01");
        assert_eq!(plan.child("xplan:technHerstellDatum").unwrap().text(), "2024-02-01");
        assert_eq!(plan.child("xplan:erstellungsMassstab").unwrap().text(), "1000");
        assert_eq!(plan.find("xplan:ortsteilName").unwrap().text(), "Viersen");
        assert_eq!(
            plan.find("xplan:XP_Plangeber").unwrap().child("xplan:name").unwrap().text(),
            "Stadt Viersen"
        );
        assert_eq!(assembled.file_stem, "Bebauungsplan_Nr._12_Ae");
        assert_eq!(
            assembled.warnings,
            vec![Warning::InvalidNameCharacters {
                characters: vec!['/']
            }]
        );
    }

    #[test]
    fn test_zoning_plan_drops_unset_optional_fields() {
        let mut attributes = zoning_attributes();
        attributes.municipality_key = Some("05315000".to_string());
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &attributes,
            &ring(),
            &Settings::default(),
        )
        .unwrap();

        let plan = plan_record(&assembled.document, PlanCategory::Bebauungsplan);
        assert!(plan.child("xplan:technHerstellDatum").is_none());
        assert!(plan.child("xplan:erstellungsMassstab").is_none());
        assert!(plan.find("xplan:ortsteilName").is_none());
    }

    #[test]
    fn test_land_use_plan_keeps_empty_fields_and_cdata_comment() {
        let mut attributes = PlanAttributes::new("FNP 2. Änderung");
        attributes.comment = Some("<b>Entwurf</b>".to_string());
        attributes.legal_status = 5000;
        attributes.status_date = NaiveDate::from_ymd_opt(2020, 5, 17);
        let assembled = assemble(
            PlanCategory::Flaechennutzungsplan,
            &attributes,
            &ring(),
            &Settings::default(),
        )
        .unwrap();

        let plan = plan_record(&assembled.document, PlanCategory::Flaechennutzungsplan);
        assert_eq!(
            child_names(plan),
            vec![
                "boundedBy",
                "name",
                "nummer",
                "beschreibung",
                "kommentar",
                "untergangsDatum",
                "raeumlicherGeltungsbereich",
                "gemeinde",
                "planArt",
                "rechtsstand",
                "bereich",
            ]
        );
        assert_eq!(plan.child("xplan:untergangsDatum").unwrap().text(), "2020-05-17");
        assert_eq!(plan.find("xplan:ortsteilName").unwrap().text(), "");

        let xml = assembled.document.to_xml().unwrap();
        assert!(xml.contains("<![CDATA[<b>Entwurf</b>]]>"), "{xml}");
    }

    #[test]
    fn test_comment_with_cdata_end_marker_survives() {
        let mut attributes = PlanAttributes::new("FNP");
        attributes.comment = Some("see a[b]]>c".to_string());
        let assembled = assemble(
            PlanCategory::Flaechennutzungsplan,
            &attributes,
            &ring(),
            &Settings::default(),
        )
        .unwrap();

        let xml = assembled.document.to_xml().unwrap();
        let reparsed = Document::parse(&xml).unwrap();
        let plan = plan_record(&reparsed, PlanCategory::Flaechennutzungsplan);
        assert_eq!(plan.child("xplan:kommentar").unwrap().text(), "see a[b]]>c");
        assert_eq!(reparsed, assembled.document);
    }

    #[test]
    fn test_identifying_fields_are_trimmed() {
        let mut attributes = PlanAttributes::new(" Plan ");
        attributes.number = Some(" 12 ".to_string());
        attributes.municipality = Some(" Viersen ".to_string());
        attributes.municipality_key = Some(" 05166032 ".to_string());
        attributes.authority = Some("\tStadt Viersen\n".to_string());
        attributes.description = Some(" frei ".to_string());
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &attributes,
            &ring(),
            &Settings::default(),
        )
        .unwrap();

        let root = &assembled.document.root;
        let plan = plan_record(&assembled.document, PlanCategory::Bebauungsplan);
        assert_eq!(plan.child("xplan:name").unwrap().text(), "Plan");
        assert_eq!(plan.child("xplan:nummer").unwrap().text(), "12");
        assert_eq!(root.find("xplan:gemeindeName").unwrap().text(), "Viersen");
        assert_eq!(root.find("xplan:ags").unwrap().text(), "05166032");
        assert_eq!(root.find("xplan:ortsteilName").unwrap().text(), "Viersen");
        assert_eq!(
            plan.find("xplan:XP_Plangeber").unwrap().child("xplan:name").unwrap().text(),
            "Stadt Viersen"
        );
        let area = root.find("xplan:BP_Bereich").unwrap();
        assert_eq!(area.child("xplan:name").unwrap().text(), "Plan");
        assert_eq!(assembled.file_stem, "Plan");
        assert!(assembled.warnings.is_empty(), "{:?}", assembled.warnings);
        assert_eq!(assembled.settings.municipality, "Viersen");
    }

    #[test]
    fn test_landscape_plan_requires_state_and_effect() {
        let assembled = assemble(
            PlanCategory::Landschaftsplan,
            &landscape_attributes(),
            &ring(),
            &Settings::default(),
        )
        .unwrap();
        let plan = plan_record(&assembled.document, PlanCategory::Landschaftsplan);
        assert_eq!(plan.child("xplan:bundesland").unwrap().text(), "1900");
        assert_eq!(plan.child("xplan:rechtlicheAussenwirkung").unwrap().text(), "true");

        let mut without_state = landscape_attributes();
        without_state.federal_state = None;
        assert!(matches!(
            assemble(PlanCategory::Landschaftsplan, &without_state, &ring(), &Settings::default()),
            Err(XPlanError::InvalidAttribute { ref field, .. }) if field == "federal_state"
        ));

        let mut unknown_state = landscape_attributes();
        unknown_state.federal_state = Some(1950);
        assert!(assemble(PlanCategory::Landschaftsplan, &unknown_state, &ring(), &Settings::default()).is_err());

        let mut without_effect = landscape_attributes();
        without_effect.external_effect = None;
        assert!(matches!(
            assemble(PlanCategory::Landschaftsplan, &without_effect, &ring(), &Settings::default()),
            Err(XPlanError::InvalidAttribute { ref field, .. }) if field == "external_effect"
        ));
    }

    #[test]
    fn test_hard_validation() {
        let settings = Settings::default();
        let category = PlanCategory::Bebauungsplan;

        let mut blank = zoning_attributes();
        blank.name = "   ".to_string();
        assert!(assemble(category, &blank, &ring(), &settings).is_err());

        let mut status = zoning_attributes();
        status.legal_status = 5000;
        let err = assemble(category, &status, &ring(), &settings).unwrap_err();
        assert!(err.to_string().contains("1000, 2000, 3000, 4000"), "{err}");

        let mut plan_type = zoning_attributes();
        plan_type.plan_type = 2000;
        assert!(assemble(category, &plan_type, &ring(), &settings).is_err());

        let mut crs = zoning_attributes();
        crs.crs = "EPSG:4326".to_string();
        assert!(assemble(category, &crs, &ring(), &settings).is_err());
    }

    #[test]
    fn test_no_date_prunes_every_lifecycle_date() {
        for category in PlanCategory::ALL {
            let schema = category.schema();
            for status in schema.statuses {
                let mut attributes = landscape_attributes();
                attributes.legal_status = status.code;
                attributes.plan_type = 1000;
                attributes.status_date = None;
                let assembled = assemble(category, &attributes, &ring(), &Settings::default()).unwrap();
                let plan = plan_record(&assembled.document, category);

                for field in schema.lifecycle_fields() {
                    assert!(
                        plan.child(&xplan(field)).is_none(),
                        "{} {} kept {field} without a date",
                        schema.prefix,
                        status.code
                    );
                }
                assert_eq!(
                    plan.child("xplan:rechtsstand").is_some(),
                    schema.keeps_status_without_date,
                    "{} rechtsstand without date",
                    schema.prefix
                );
            }
        }
    }

    #[test]
    fn test_status_can_be_dropped_without_date() {
        let schema = PlanCategory::Bebauungsplan.schema();
        let strict = CategorySchema {
            keeps_status_without_date: false,
            ..*schema
        };
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &zoning_attributes(),
            &ring(),
            &Settings::default(),
        )
        .unwrap();
        let mut plan = plan_record(&assembled.document, PlanCategory::Bebauungsplan).clone();
        let status = schema.status_by_code(4000).unwrap();

        let mut kept = plan.clone();
        prune_lifecycle_dates(&mut kept, schema, status, None).unwrap();
        assert!(kept.child("xplan:rechtsstand").is_some());

        prune_lifecycle_dates(&mut plan, &strict, status, None).unwrap();
        assert!(plan.child("xplan:rechtsstand").is_none());
        assert!(plan.child("xplan:inkrafttretensDatum").is_none());
    }

    #[test]
    fn test_dated_status_keeps_exactly_its_date() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 30);
        for category in PlanCategory::ALL {
            let schema = category.schema();
            for status in schema.statuses {
                let mut attributes = landscape_attributes();
                attributes.legal_status = status.code;
                attributes.plan_type = 1000;
                attributes.status_date = date;
                let assembled = assemble(category, &attributes, &ring(), &Settings::default()).unwrap();
                let plan = plan_record(&assembled.document, category);

                let kept: Vec<&str> = schema
                    .lifecycle_fields()
                    .filter(|field| plan.child(&xplan(field)).is_some())
                    .collect();
                assert_eq!(kept, vec![status.date_field], "{} {}", schema.prefix, status.code);
                assert_eq!(
                    plan.child(&xplan(status.date_field)).unwrap().text(),
                    "2023-06-30"
                );
                assert_eq!(plan.child("xplan:rechtsstand").unwrap().text(), status.code.to_string());
            }
        }
    }

    #[test]
    fn test_cross_references_and_unique_ids() {
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &zoning_attributes(),
            &ring(),
            &Settings::default(),
        )
        .unwrap();
        let root = &assembled.document.root;

        assert!(root.attribute("gml:id").unwrap().starts_with("GML_"));
        let area = root.find("xplan:BP_Bereich").unwrap();
        let plan = root.find("xplan:BP_Plan").unwrap();
        assert_eq!(root.find_all("xplan:BP_Bereich").len(), 1);
        assert_eq!(root.find_all("xplan:BP_Plan").len(), 1);

        let area_id = area.attribute("gml:id").unwrap();
        let plan_id = plan.attribute("gml:id").unwrap();
        assert_eq!(
            area.child("xplan:gehoertZuPlan").unwrap().attribute("xlink:href"),
            Some(format!("#{plan_id}").as_str())
        );
        assert_eq!(
            plan.child("xplan:bereich").unwrap().attribute("xlink:href"),
            Some(format!("#{area_id}").as_str())
        );
        assert_eq!(area.child("xplan:nummer").unwrap().text(), AREA_NUMBER);
        assert_eq!(area.child("xplan:name").unwrap().text(), "Bebauungsplan Nr. 12/Ä");

        let ids = [
            root.attribute("gml:id").unwrap(),
            area_id,
            plan_id,
            root.find("gml:MultiSurface").unwrap().attribute("gml:id").unwrap(),
            root.find("gml:Polygon").unwrap().attribute("gml:id").unwrap(),
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_envelopes_match_geometry() {
        let assembled = assemble(
            PlanCategory::Bebauungsplan,
            &zoning_attributes(),
            &ring(),
            &Settings::default(),
        )
        .unwrap();
        let envelopes = assembled.document.root.find_all("gml:Envelope");
        assert_eq!(envelopes.len(), 2);
        for envelope in envelopes {
            assert_eq!(envelope.attribute("srsName"), Some("EPSG:25832"));
            assert_eq!(envelope.child("gml:lowerCorner").unwrap().text(), "0 0");
            assert_eq!(envelope.child("gml:upperCorner").unwrap().text(), "10 10");
        }
    }

    #[test]
    fn test_settings_are_applied_and_returned() {
        let settings = Settings {
            municipality: "Viersen".to_string(),
            municipality_key: "05166032".to_string(),
            last_tool: Tool::ReplaceGeometry,
        };
        let mut attributes = PlanAttributes::new("Plan");
        attributes.legal_status = 1000;
        let assembled = assemble(PlanCategory::Bebauungsplan, &attributes, &ring(), &settings).unwrap();

        let root = &assembled.document.root;
        assert_eq!(root.find("xplan:ags").unwrap().text(), "05166032");
        assert_eq!(root.find("xplan:gemeindeName").unwrap().text(), "Viersen");
        assert_eq!(root.find("xplan:ortsteilName").unwrap().text(), "Viersen");
        assert_eq!(assembled.settings.last_tool, Tool::Bebauungsplan60);
        assert_eq!(assembled.settings.municipality, "Viersen");
    }
}
