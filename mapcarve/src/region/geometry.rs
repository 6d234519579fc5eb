//! Minimal GeoJSON-shaped geometry model.
//!
//! Covers exactly the geometry kinds the engine accepts in requests. The
//! serde representation reproduces GeoJSON geometry objects
//! (`{"type": "...", "coordinates": [...]}`), so request payloads and the
//! canonical stored form are plain GeoJSON without a dedicated GIS crate.

use serde::{Deserialize, Serialize};

/// A single coordinate position as `[longitude, latitude]`.
pub type Position = [f64; 2];

/// Supported request geometry.
///
/// `GeometryCollection`, additional position elements (altitude) and
/// non-GeoJSON types all fail deserialization, which surfaces to callers
/// as an invalid region at admission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    /// Rings of positions; the first ring is the outer boundary, the rest
    /// are holes.
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Applies `f` to every position in the geometry.
    fn each_position(&self, f: &mut dyn FnMut(&Position)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => {
                ps.iter().for_each(|p| f(p))
            }
            Geometry::Polygon(rings) => rings.iter().flatten().for_each(|p| f(p)),
            Geometry::MultiPolygon(polys) => {
                polys.iter().flatten().flatten().for_each(|p| f(p))
            }
        }
    }

    /// True when the geometry holds no coordinate positions at all.
    pub fn is_empty(&self) -> bool {
        let mut any = false;
        self.each_position(&mut |_| any = true);
        !any
    }

    /// True when every coordinate in the geometry is a finite number.
    pub fn is_finite(&self) -> bool {
        let mut finite = true;
        self.each_position(&mut |p| finite &= p[0].is_finite() && p[1].is_finite());
        finite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_parses_from_geojson() {
        let geometry: Geometry =
            serde_json::from_str(r#"{"type":"Point","coordinates":[-74.006,40.7128]}"#)
                .expect("valid point should parse");
        assert_eq!(geometry, Geometry::Point([-74.006, 40.7128]));
    }

    #[test]
    fn test_polygon_parses_with_hole() {
        let json = r#"{
            "type": "Polygon",
            "coordinates": [
                [[0.0,0.0],[4.0,0.0],[4.0,4.0],[0.0,4.0],[0.0,0.0]],
                [[1.0,1.0],[2.0,1.0],[2.0,2.0],[1.0,2.0],[1.0,1.0]]
            ]
        }"#;
        let geometry: Geometry = serde_json::from_str(json).expect("polygon should parse");
        match geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2, "Outer ring plus one hole");
                assert_eq!(rings[0].len(), 5);
            }
            other => panic!("expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_geometry_collection_is_rejected() {
        let result: Result<Geometry, _> = serde_json::from_str(
            r#"{"type":"GeometryCollection","geometries":[]}"#,
        );
        assert!(result.is_err(), "GeometryCollection is not supported");
    }

    #[test]
    fn test_altitude_positions_are_rejected() {
        let result: Result<Geometry, _> =
            serde_json::from_str(r#"{"type":"Point","coordinates":[1.0,2.0,3.0]}"#);
        assert!(result.is_err(), "Three-element positions are not supported");
    }

    #[test]
    fn test_serialization_round_trips_as_geojson() {
        let geometry = Geometry::LineString(vec![[0.0, 0.0], [1.0, 1.0]]);
        let json = serde_json::to_string(&geometry).expect("serializes");
        assert_eq!(json, r#"{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}"#);
    }

    #[test]
    fn test_is_empty() {
        assert!(Geometry::MultiPoint(vec![]).is_empty());
        assert!(Geometry::Polygon(vec![]).is_empty());
        assert!(!Geometry::Point([0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_is_finite() {
        assert!(Geometry::Point([1.0, 2.0]).is_finite());
        assert!(!Geometry::Point([f64::NAN, 2.0]).is_finite());
        assert!(!Geometry::MultiPoint(vec![[0.0, 0.0], [f64::INFINITY, 1.0]]).is_finite());
    }
}
