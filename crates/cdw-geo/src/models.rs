//! Geometry models for cdw-geo.
//!
//! Conversions from the canonical `cdw-core` types to the `geo` crate types
//! used for the containment predicates.

use geo::Geometry as GeoGeometry;

pub use cdw_core::models::{Geometry, GeometryType, Point};

fn line(coordinates: &[[f64; 2]]) -> geo::LineString {
    coordinates.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect()
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => {
            geo::Polygon::new(line(exterior), interiors.iter().map(|r| line(r)).collect())
        }
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(line(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        ),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| line(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()),
        ),
    }
}

/// Convert a WGS84 position to a geo::Point (x = longitude)
pub fn to_geo_point(point: Point) -> geo::Point {
    geo::Point::new(point.lng, point.lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_with_hole() {
        let geometry = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ]);

        match to_geo_geometry(&geometry) {
            GeoGeometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_point_axis_order() {
        let p = to_geo_point(Point::new(-73.98, 40.75));
        assert_eq!(p.x(), -73.98);
        assert_eq!(p.y(), 40.75);
    }
}
