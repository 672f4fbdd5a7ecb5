//! GML 3.2 building blocks shared by the assembler and geometry replace.

use crate::document::{Element, Node};
use crate::geometry::{BoundingBox, NormalizedGeometry};
use crate::identifiers::IdGenerator;

/// `prefix:local`, or just `local` for the default namespace.
pub fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// `gml:boundedBy/gml:Envelope` with both corners.
pub fn bounded_by(gml: &str, crs: &str, bbox: &BoundingBox) -> Element {
    Element::new(format!("{gml}:boundedBy")).with_child(
        Element::new(format!("{gml}:Envelope"))
            .with_attribute("srsName", crs)
            .with_child(Element::new(format!("{gml}:lowerCorner")).with_text(bbox.lower_corner()))
            .with_child(Element::new(format!("{gml}:upperCorner")).with_text(bbox.upper_corner())),
    )
}

/// Rewrites `srsName` and the corners of the envelope inside an existing
/// `boundedBy`. Missing corner elements are created. Returns `false` when the
/// element holds no envelope.
pub fn update_envelope(
    bounded_by: &mut Element,
    gml: Option<&str>,
    crs: &str,
    bbox: &BoundingBox,
) -> bool {
    let Some(envelope) = bounded_by.child_mut(&qualify(gml, "Envelope")) else {
        return false;
    };
    envelope.set_attribute("srsName", crs);

    for (local, value) in [
        ("lowerCorner", bbox.lower_corner()),
        ("upperCorner", bbox.upper_corner()),
    ] {
        let name = qualify(gml, local);
        match envelope.child_mut(&name) {
            Some(corner) => corner.set_text(value),
            None => envelope
                .children
                .push(Node::Element(Element::new(name).with_text(value))),
        }
    }
    true
}

/// Single-member `MultiSurface` for the boundary ring.
///
/// `MultiSurface` and `Polygon` get fresh ids and the `srsName`; the
/// `posList` is written two-dimensional.
pub fn multi_surface(
    gml: &str,
    geometry: &NormalizedGeometry,
    crs: &str,
    ids: &mut IdGenerator,
) -> Element {
    let id_key = format!("{gml}:id");

    let pos_list = Element::new(format!("{gml}:posList"))
        .with_attribute("srsDimension", "2")
        .with_text(geometry.pos_list());

    let polygon = Element::new(format!("{gml}:Polygon"))
        .with_attribute(id_key.as_str(), ids.record_id())
        .with_attribute("srsName", crs)
        .with_child(
            Element::new(format!("{gml}:exterior"))
                .with_child(Element::new(format!("{gml}:LinearRing")).with_child(pos_list)),
        );

    Element::new(format!("{gml}:MultiSurface"))
        .with_attribute(id_key.as_str(), ids.record_id())
        .with_attribute("srsName", crs)
        .with_child(Element::new(format!("{gml}:surfaceMember")).with_child(polygon))
}
