//! Canonical geometry types used across all cdw crates.
//!
//! These types provide a bridge between the on-disk dataset formats and the
//! computational `geo` crate types used by `cdw-geo`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of the only reference frame the estimator works in (WGS 84)
pub const WGS84_EPSG: u32 = 4326;

/// Reference frame declared by a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredCrs {
    Epsg(u32),
    /// Any other definition PROJ accepts: WKT (ESRI or OGC), URN or proj string
    Definition(String),
}

impl DeclaredCrs {
    pub fn is_wgs84(&self) -> bool {
        matches!(self, DeclaredCrs::Epsg(WGS84_EPSG))
    }

    /// Source string handed to PROJ
    pub fn proj_definition(&self) -> String {
        match self {
            DeclaredCrs::Epsg(code) => format!("EPSG:{}", code),
            DeclaredCrs::Definition(definition) => definition.trim().to_string(),
        }
    }
}

impl fmt::Display for DeclaredCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredCrs::Epsg(code) => write!(f, "EPSG:{}", code),
            // WKT names its frame in the first quoted string
            DeclaredCrs::Definition(definition) => match definition.split('"').nth(1) {
                Some(name) if !name.is_empty() => f.write_str(name),
                _ => f.write_str(definition.trim()),
            },
        }
    }
}

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both ordinates are finite and inside the WGS84 value range
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Parse a `"lat,lon"` string into a point.
///
/// Returns `None` when the input does not hold exactly two comma separated numbers.
pub fn parse_lat_lon(input: &str) -> Option<Point> {
    let mut parts = input.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let point = Point::new(lng, lat);
    point.is_valid().then_some(point)
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

/// GeoJSON-compatible geometry representation
///
/// This enum directly maps to GeoJSON geometry types with 2D coordinate arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Create a MultiPolygon geometry
    pub fn multi_polygon(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> Self {
        Geometry::MultiPolygon { coordinates: polygons }
    }

    /// Axis-aligned rectangle as a closed polygon
    pub fn rect(min: [f64; 2], max: [f64; 2]) -> Self {
        Geometry::polygon(vec![vec![
            [min[0], min[1]],
            [max[0], min[1]],
            [max[0], max[1]],
            [min[0], max[1]],
            [min[0], min[1]],
        ]])
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
        }
    }

    /// True for Polygon and MultiPolygon
    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon { .. } | Geometry::MultiPolygon { .. })
    }

    /// Final vertex of a linear geometry.
    ///
    /// For a MultiLineString this is the last vertex of the last part.
    pub fn last_coordinate(&self) -> Option<Point> {
        let coord = match self {
            Geometry::Point { coordinates } => Some(coordinates),
            Geometry::LineString { coordinates } => coordinates.last(),
            Geometry::MultiLineString { coordinates } => {
                coordinates.last().and_then(|line| line.last())
            }
            _ => None,
        }?;
        Some(Point::new(coord[0], coord[1]))
    }

    /// Every vertex, in ring and part order
    pub fn positions(&self) -> Vec<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                coordinates.clone()
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                coordinates.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().collect()
            }
        }
    }

    /// Rebuild the geometry with every vertex passed through `f`
    pub fn try_map_positions<E, F>(&self, mut f: F) -> std::result::Result<Geometry, E>
    where
        F: FnMut([f64; 2]) -> std::result::Result<[f64; 2], E>,
    {
        fn ring<E, F>(ring: &[[f64; 2]], f: &mut F) -> std::result::Result<Vec<[f64; 2]>, E>
        where
            F: FnMut([f64; 2]) -> std::result::Result<[f64; 2], E>,
        {
            ring.iter().map(|p| f(*p)).collect()
        }

        fn rings<E, F>(rings: &[Vec<[f64; 2]>], f: &mut F) -> std::result::Result<Vec<Vec<[f64; 2]>>, E>
        where
            F: FnMut([f64; 2]) -> std::result::Result<[f64; 2], E>,
        {
            rings.iter().map(|r| ring(r, &mut *f)).collect()
        }

        Ok(match self {
            Geometry::Point { coordinates } => Geometry::Point { coordinates: f(*coordinates)? },
            Geometry::LineString { coordinates } => Geometry::LineString { coordinates: ring(coordinates, &mut f)? },
            Geometry::MultiPoint { coordinates } => Geometry::MultiPoint { coordinates: ring(coordinates, &mut f)? },
            Geometry::Polygon { coordinates } => Geometry::Polygon { coordinates: rings(coordinates, &mut f)? },
            Geometry::MultiLineString { coordinates } => {
                Geometry::MultiLineString { coordinates: rings(coordinates, &mut f)? }
            }
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|polygon| rings(polygon, &mut f))
                    .collect::<std::result::Result<_, E>>()?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lon() {
        let point = parse_lat_lon("40.7128, -74.0060").unwrap();
        assert_eq!(point.lat, 40.7128);
        assert_eq!(point.lng, -74.0060);
    }

    #[test]
    fn test_parse_lat_lon_rejects_garbage() {
        assert!(parse_lat_lon("350 5th Ave, New York").is_none());
        assert!(parse_lat_lon("40.7").is_none());
        assert!(parse_lat_lon("1,2,3").is_none());
        assert!(parse_lat_lon("95.0,-74.0").is_none());
    }

    #[test]
    fn test_last_coordinate_of_path() {
        let path = Geometry::line_string(vec![[-74.0, 40.7], [-73.99, 40.71], [-73.95, 40.72]]);
        assert_eq!(path.last_coordinate(), Some(Point::new(-73.95, 40.72)));

        let multi = Geometry::MultiLineString {
            coordinates: vec![vec![[0.0, 0.0], [1.0, 1.0]], vec![[1.0, 1.0], [2.0, 3.0]]],
        };
        assert_eq!(multi.last_coordinate(), Some(Point::new(2.0, 3.0)));

        assert!(Geometry::rect([0.0, 0.0], [1.0, 1.0]).last_coordinate().is_none());
    }

    #[test]
    fn test_geometry_serialization() {
        let polygon = Geometry::rect([0.0, 0.0], [1.0, 1.0]);
        let json = serde_json::to_value(&polygon).unwrap();
        assert_eq!(json["type"], "Polygon");

        let parsed: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, polygon);
        assert!(parsed.is_areal());
    }

    #[test]
    fn test_map_positions_keeps_structure() {
        let polygon = Geometry::multi_polygon(vec![vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]]);
        let shifted = polygon
            .try_map_positions(|[x, y]| Ok::<_, ()>([x + 10.0, y]))
            .unwrap();

        assert_eq!(shifted.positions()[1], [11.0, 0.0]);
        assert_eq!(shifted.positions().len(), 4);
        assert!(shifted.is_areal());

        let err = polygon.try_map_positions(|_| Err("out of range"));
        assert_eq!(err, Err("out of range"));
    }

    #[test]
    fn test_declared_crs_display() {
        assert_eq!(DeclaredCrs::Epsg(2263).to_string(), "EPSG:2263");
        assert!(DeclaredCrs::Epsg(4326).is_wgs84());

        let wkt = DeclaredCrs::Definition(r#"PROJCS["NAD_1983_StatePlane_New_York_Long_Isl_FIPS_3104_Feet",GEOGCS["GCS_North_American_1983"]]"#.to_string());
        assert_eq!(wkt.to_string(), "NAD_1983_StatePlane_New_York_Long_Isl_FIPS_3104_Feet");
        assert!(!wkt.is_wgs84());
    }
}
