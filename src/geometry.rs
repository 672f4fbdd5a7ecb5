//! Boundary ring handling.
//!
//! The host GIS normally reprojects and dissolves the digitized boundary. What
//! is left for this crate is reading the result (GeoJSON), making sure it is a
//! single exterior ring, removing consecutive duplicate vertices, forcing
//! counter-clockwise orientation and computing the bounding box.

use geo::{BoundingRect, Coord, Geometry, LineString, Polygon, Winding};
use geojson::GeoJson;
use std::fs;
use std::path::Path;

use crate::error::{Result, XPlanError};

/// Vertices closer than this are treated as duplicates.
pub const DUPLICATE_TOLERANCE: f64 = 1e-6;

/// Number of decimals written for coordinates.
pub const COORDINATE_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl BoundingBox {
    pub fn lower_corner(&self) -> String {
        format!(
            "{} {}",
            format_coordinate(self.min.x),
            format_coordinate(self.min.y)
        )
    }

    pub fn upper_corner(&self) -> String {
        format!(
            "{} {}",
            format_coordinate(self.max.x),
            format_coordinate(self.max.y)
        )
    }
}

/// A single closed, counter-clockwise exterior ring and its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    ring: LineString<f64>,
    bbox: BoundingBox,
}

impl NormalizedGeometry {
    pub fn from_ring(ring: LineString<f64>) -> Result<Self> {
        if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(XPlanError::UnsupportedGeometry(
                "ring contains non-finite coordinates".to_string(),
            ));
        }

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len() + 1);
        for coord in ring.0 {
            match coords.last() {
                Some(last) if coords_equal(*last, coord) => {}
                _ => coords.push(coord),
            }
        }

        match (coords.first().copied(), coords.last().copied()) {
            (Some(first), Some(last)) if coords.len() > 1 && coords_equal(first, last) => {
                let n = coords.len();
                coords[n - 1] = first;
            }
            (Some(first), Some(_)) => coords.push(first),
            _ => {}
        }

        if coords.len() < 4 {
            return Err(XPlanError::UnsupportedGeometry(format!(
                "ring needs at least 3 distinct vertices, got {}",
                coords.len().saturating_sub(1)
            )));
        }

        let mut ring = LineString::new(coords);
        ring.make_ccw_winding();

        let rect = ring.bounding_rect().ok_or_else(|| {
            XPlanError::UnsupportedGeometry("ring has no bounding box".to_string())
        })?;

        Ok(Self {
            ring,
            bbox: BoundingBox {
                min: rect.min(),
                max: rect.max(),
            },
        })
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::from_ring(LineString::from(coords.to_vec()))
    }

    /// Only polygons without holes are accepted; several parts have to be
    /// dissolved before.
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        if !polygon.interiors().is_empty() {
            return Err(XPlanError::UnsupportedGeometry(format!(
                "polygon has {} interior ring(s), only a single exterior ring is supported",
                polygon.interiors().len()
            )));
        }
        let (exterior, _) = polygon.into_inner();
        Self::from_ring(exterior)
    }

    pub fn from_geometry(geometry: Geometry<f64>) -> Result<Self> {
        let mut polygons = Vec::new();
        collect_polygons(geometry, &mut polygons)?;

        match polygons.len() {
            0 => Err(XPlanError::UnsupportedGeometry(
                "input contains no polygon".to_string(),
            )),
            1 => Self::from_polygon(polygons.remove(0)),
            n => Err(XPlanError::UnsupportedGeometry(format!(
                "input contains {n} polygons, dissolve them into a single ring first"
            ))),
        }
    }

    pub fn from_geojson_str(input: &str) -> Result<Self> {
        let geojson: GeoJson = input.parse()?;
        let collection = geo::GeometryCollection::<f64>::try_from(&geojson)?;
        Self::from_geometry(Geometry::GeometryCollection(collection))
    }

    pub fn read_geojson(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_geojson_str(&content)
    }

    pub fn ring(&self) -> &LineString<f64> {
        &self.ring
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Coordinates as a GML `posList` (`x y x y ...`).
    pub fn pos_list(&self) -> String {
        self.ring
            .coords()
            .map(|c| format!("{} {}", format_coordinate(c.x), format_coordinate(c.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn collect_polygons(geometry: Geometry<f64>, polygons: &mut Vec<Polygon<f64>>) -> Result<()> {
    match geometry {
        Geometry::Polygon(polygon) => polygons.push(polygon),
        Geometry::MultiPolygon(multi) => polygons.extend(multi.0),
        Geometry::Rect(rect) => polygons.push(rect.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for member in collection.0 {
                collect_polygons(member, polygons)?;
            }
        }
        other => {
            return Err(XPlanError::UnsupportedGeometry(format!(
                "expected polygon geometries, found {}",
                geometry_kind(&other)
            )))
        }
    }
    Ok(())
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn coords_equal(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() < DUPLICATE_TOLERANCE && (a.y - b.y).abs() < DUPLICATE_TOLERANCE
}

/// Formats a coordinate with six decimals, dropping trailing zeros.
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{:.*}", COORDINATE_PRECISION, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]
    }

    #[test]
    fn test_clockwise_ring_is_reoriented() {
        let geometry = NormalizedGeometry::from_coords(&square()).unwrap();
        assert!(geometry.ring().is_ccw());
        assert_eq!(geometry.ring().0.len(), 5);
        assert_eq!(geometry.ring().0.first(), geometry.ring().0.last());
    }

    #[test]
    fn test_bbox_matches_ring_extent() {
        let coords = vec![
            (356_000.25, 5_690_000.5),
            (356_100.0, 5_690_010.0),
            (356_050.125, 5_690_200.75),
            (356_000.25, 5_690_000.5),
        ];
        let geometry = NormalizedGeometry::from_coords(&coords).unwrap();
        let bbox = geometry.bbox();
        assert_eq!(bbox.min.x, 356_000.25);
        assert_eq!(bbox.min.y, 5_690_000.5);
        assert_eq!(bbox.max.x, 356_100.0);
        assert_eq!(bbox.max.y, 5_690_200.75);
        assert_eq!(bbox.lower_corner(), "356000.25 5690000.5");
        assert_eq!(bbox.upper_corner(), "356100 5690200.75");
    }

    #[test]
    fn test_consecutive_duplicates_are_removed_and_ring_closed() {
        let coords = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 0.0000001),
            (10.0, 10.0),
            (0.0, 10.0),
        ];
        let geometry = NormalizedGeometry::from_coords(&coords).unwrap();
        assert_eq!(geometry.ring().0.len(), 5);
        assert_eq!(geometry.pos_list(), "0 0 10 0 10 10 0 10 0 0");
    }

    #[test]
    fn test_degenerate_ring_is_rejected() {
        let coords = vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)];
        assert!(matches!(
            NormalizedGeometry::from_coords(&coords),
            Err(XPlanError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn test_geojson_feature_collection() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Umring"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]
                }
            }]
        }"#;
        let geometry = NormalizedGeometry::from_geojson_str(input).unwrap();
        assert_eq!(geometry.bbox().lower_corner(), "0 0");
        assert_eq!(geometry.bbox().upper_corner(), "10 10");
    }

    #[test]
    fn test_geojson_single_feature_and_features_without_geometry() {
        let feature = r#"{
            "type": "Feature",
            "properties": null,
            "geometry": {"type": "Polygon", "coordinates": [[[2, 2], [4, 2], [4, 5], [2, 2]]]}
        }"#;
        let geometry = NormalizedGeometry::from_geojson_str(feature).unwrap();
        assert_eq!(geometry.bbox().upper_corner(), "4 5");

        let empty = r#"{
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {}, "geometry": null}]
        }"#;
        let err = NormalizedGeometry::from_geojson_str(empty).unwrap_err();
        assert!(err.to_string().contains("no polygon"), "{err}");
    }

    #[test]
    fn test_geojson_with_several_polygons_is_rejected() {
        let input = r#"{
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 5]]]
            ]
        }"#;
        let err = NormalizedGeometry::from_geojson_str(input).unwrap_err();
        assert!(err.to_string().contains("2 polygons"), "{err}");
    }

    #[test]
    fn test_polygon_with_hole_is_rejected() {
        let input = r#"{
            "type": "Polygon",
            "coordinates": [
                [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                [[2, 2], [3, 2], [3, 3], [2, 2]]
            ]
        }"#;
        assert!(NormalizedGeometry::from_geojson_str(input).is_err());
    }

    #[test]
    fn test_line_input_is_rejected() {
        let input = r#"{"type": "LineString", "coordinates": [[0, 0], [1, 1]]}"#;
        let err = NormalizedGeometry::from_geojson_str(input).unwrap_err();
        assert!(err.to_string().contains("LineString"), "{err}");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(0.0), "0");
        assert_eq!(format_coordinate(-0.0), "0");
        assert_eq!(format_coordinate(10.0), "10");
        assert_eq!(format_coordinate(1.5), "1.5");
        assert_eq!(format_coordinate(356123.1234567), "356123.123457");
        assert_eq!(format_coordinate(-1.36383928571428), "-1.363839");
    }
}
