//! Swaps the boundary geometry of an existing XPlanGML document.
//!
//! Everything except the geometry blocks and the envelopes is left as it was.
//! The new ring is expected in the CRS of the document; the CRS is taken from
//! the `srsName` of the current boundary geometry.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::document::{Document, Element, Node};
use crate::error::{Result, XPlanError};
use crate::geometry::NormalizedGeometry;
use crate::gml::{self, qualify};
use crate::identifiers::IdGenerator;
use crate::schema::{GML_NS, KNOWN_PLAN_PREFIXES, XPLAN_NS_BASE};

/// What was found in the document while replacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceReport {
    /// XPlanung version from the namespace URI, e.g. `6.0`.
    pub version: String,
    /// Local name of the plan record, e.g. `BP_Plan`.
    pub plan_record: String,
    pub crs: String,
    pub area_geometry_removed: bool,
    pub area_envelope_removed: bool,
}

#[derive(Debug, Clone)]
struct Namespaces {
    xplan: Option<String>,
    gml: Option<String>,
    version: String,
}

impl Namespaces {
    fn resolve(root: &Element) -> Result<Self> {
        let (xplan, uri) = resolve_xplan(root)
            .ok_or_else(|| XPlanError::NamespaceNotFound("XPlanung".to_string()))?;
        let version = uri
            .strip_prefix(XPLAN_NS_BASE)
            .unwrap_or_default()
            .trim_matches('/')
            .replace('/', ".");

        let gml = root
            .namespace_prefix(GML_NS)
            .ok_or_else(|| XPlanError::NamespaceNotFound("GML 3.2".to_string()))?
            .map(str::to_string);

        Ok(Self {
            xplan,
            gml,
            version,
        })
    }

    fn xplan(&self, local: &str) -> String {
        qualify(self.xplan.as_deref(), local)
    }

    fn gml(&self, local: &str) -> String {
        qualify(self.gml.as_deref(), local)
    }
}

/// `xmlns:xplan` first, then any prefix bound to an XPlanung URI, then the
/// default namespace.
fn resolve_xplan(root: &Element) -> Option<(Option<String>, String)> {
    let is_xplan = |uri: &str| uri.starts_with(XPLAN_NS_BASE);

    if let Some(uri) = root.attribute("xmlns:xplan").filter(|uri| is_xplan(*uri)) {
        return Some((Some("xplan".to_string()), uri.to_string()));
    }
    let prefix = root.namespace_prefix_matching(is_xplan)?;
    let key = match prefix {
        Some(prefix) => format!("xmlns:{prefix}"),
        None => "xmlns".to_string(),
    };
    let uri = root.attribute(&key)?.to_string();
    Some((prefix.map(str::to_string), uri))
}

/// Replaces the geometry of the plan in `document` with `geometry`.
pub fn replace_geometry(
    document: &mut Document,
    geometry: &NormalizedGeometry,
) -> Result<ReplaceReport> {
    let root = &mut document.root;
    let ns = Namespaces::resolve(root)?;
    info!("XPlanung version {} detected", ns.version);

    let (prefix, plan_name) = KNOWN_PLAN_PREFIXES
        .iter()
        .map(|prefix| (*prefix, ns.xplan(&format!("{prefix}_Plan"))))
        .find(|(_, name)| root.find(name).is_some())
        .ok_or(XPlanError::NoPlanRecord)?;
    let plan_record = format!("{prefix}_Plan");
    info!("{plan_record} found");

    let area_name = ns.xplan(&format!("{prefix}_Bereich"));
    let area_count = root.find_all(&area_name).len();
    if area_count > 1 {
        return Err(XPlanError::MultipleAreas {
            record: format!("{prefix}_Bereich"),
            count: area_count,
        });
    }

    let extent_name = ns.xplan("raeumlicherGeltungsbereich");
    let crs = {
        let plan = root.find(&plan_name).ok_or(XPlanError::NoPlanRecord)?;
        let extent = plan.child(&extent_name).ok_or_else(|| XPlanError::MissingExtent {
            record: plan_record.clone(),
        })?;
        extent
            .child_elements()
            .next()
            .and_then(|geometry| geometry.attribute("srsName"))
            .ok_or_else(|| XPlanError::MissingSrsName {
                record: plan_record.clone(),
            })?
            .to_string()
    };
    info!("Document CRS is {crs}");

    let mut ids = IdGenerator::new();
    reserve_ids(root, &ns.gml("id"), &mut ids);

    let bounded_by = ns.gml("boundedBy");
    if let Some(envelope) = root.child_mut(&bounded_by) {
        if gml::update_envelope(envelope, ns.gml.as_deref(), &crs, geometry.bbox()) {
            debug!("Document envelope updated");
        }
    }

    let surface = match ns.gml.as_deref() {
        Some(gml_prefix) => gml::multi_surface(gml_prefix, geometry, &crs, &mut ids),
        // GML is the default namespace, ids still need a prefixed attribute.
        None => gml::multi_surface("gml", geometry, &crs, &mut ids).with_attribute("xmlns:gml", GML_NS),
    };

    let plan = root.find_mut(&plan_name).ok_or(XPlanError::NoPlanRecord)?;
    if let Some(envelope) = plan.child_mut(&bounded_by) {
        if gml::update_envelope(envelope, ns.gml.as_deref(), &crs, geometry.bbox()) {
            debug!("{plan_record} envelope updated");
        }
    }
    let extent = plan
        .child_mut(&extent_name)
        .ok_or_else(|| XPlanError::MissingExtent {
            record: plan_record.clone(),
        })?;
    extent.children = vec![Node::Element(surface)];

    let (area_geometry_removed, area_envelope_removed) = match root.find_mut(&area_name) {
        Some(area) => (
            area.remove_child(&ns.xplan("geltungsbereich")).is_some(),
            area.remove_child(&bounded_by).is_some(),
        ),
        None => (false, false),
    };
    if area_geometry_removed {
        debug!("geltungsbereich of {prefix}_Bereich removed");
    }
    if area_envelope_removed {
        debug!("boundedBy of {prefix}_Bereich removed");
    }

    Ok(ReplaceReport {
        version: ns.version,
        plan_record,
        crs,
        area_geometry_removed,
        area_envelope_removed,
    })
}

fn reserve_ids(element: &Element, id_key: &str, ids: &mut IdGenerator) {
    if let Some(id) = element.attribute(id_key) {
        ids.reserve(id);
    }
    for child in element.child_elements() {
        reserve_ids(child, id_key, ids);
    }
}

/// Reads `input`, replaces the geometry and writes the result to `output`.
///
/// Nothing is written when any step fails.
pub fn replace_geometry_file(
    input: &Path,
    geometry: &NormalizedGeometry,
    output: &Path,
) -> Result<ReplaceReport> {
    let bytes = fs::read(input)?;
    let mut document = Document::parse_bytes(&bytes)?;
    let report = replace_geometry(&mut document, geometry)?;
    let xml = document.to_xml()?;
    fs::write(output, xml)?;
    info!("Updated document written to {}", output.display());
    Ok(report)
}
