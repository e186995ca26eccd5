//! Shapefile format reader implementation
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj)
//! and the census block and transfer route datasets ship in this format.

use async_trait::async_trait;
use shapefile::dbase::FieldValue as DbaseFieldValue;
use shapefile::{PolygonRing, Shape};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CdwError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatDataset, FormatFeature, FormatReader, FormatValidation};
use crate::models::{DeclaredCrs, Geometry};

/// Shapefile format reader
pub struct ShapefileFormatReader;

#[async_trait]
impl FormatReader for ShapefileFormatReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        self.verify_components(path)?;

        let mut reader = shapefile::Reader::from_path(path)
            .map_err(|e| CdwError::dataset_format("Shapefile", format!("Failed to open Shapefile: {}", e)))?;

        let crs = self.extract_crs(path)?;

        let mut features = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.map_err(|e| {
                CdwError::dataset_format("Shapefile", format!("Failed to read feature: {}", e))
            })?;

            features.push(FormatFeature {
                id: features.len().to_string(),
                geometry: convert_shape(&shape)?,
                properties: extract_properties(record),
            });
        }

        Ok(FormatDataset {
            name: dataset_name(path),
            format_name: "Shapefile".to_string(),
            crs,
            features,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = match self.get_shapefile_base(path) {
            Ok(b) => b,
            Err(e) => {
                validation.errors.push(format!("Invalid Shapefile path: {}", e));
                return Ok(validation);
            }
        };

        let component_validation =
            FormatValidator::validate_component_files(&base, &["shp", "shx", "dbf"], &["prj"]);

        Ok(FormatValidator::merge_validations(vec![validation, component_validation]))
    }
}

impl ShapefileFormatReader {
    /// Get the base path for a Shapefile (without extension)
    fn get_shapefile_base(&self, path: &Path) -> Result<PathBuf> {
        let is_shp = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("shp"));

        if !is_shp {
            return Err(CdwError::InvalidPath {
                path: path.to_path_buf(),
                reason: "Not a Shapefile (.shp)".to_string(),
            });
        }

        Ok(path.with_extension(""))
    }

    /// Verify that all required Shapefile component files exist
    fn verify_components(&self, path: &Path) -> Result<()> {
        let base = self.get_shapefile_base(path)?;

        let missing: Vec<String> = ["shp", "shx", "dbf"]
            .iter()
            .filter(|ext| !base.with_extension(ext).exists())
            .map(|ext| format!(".{}", ext))
            .collect();

        if !missing.is_empty() {
            return Err(CdwError::dataset_format(
                "Shapefile",
                format!("Missing required component files: {}", missing.join(", ")),
            ));
        }

        Ok(())
    }

    /// Frame declared by the .prj sidecar, `None` only when there is no sidecar
    fn extract_crs(&self, path: &Path) -> Result<Option<DeclaredCrs>> {
        let prj_path = self.get_shapefile_base(path)?.with_extension("prj");

        if !prj_path.exists() {
            return Ok(None);
        }

        let prj_content = fs::read_to_string(&prj_path).map_err(|e| {
            CdwError::dataset_format("Shapefile", format!("Failed to read .prj file: {}", e))
        })?;

        let crs = match parse_epsg_from_wkt(&prj_content) {
            Some(code) => DeclaredCrs::Epsg(code),
            None => DeclaredCrs::Definition(prj_content),
        };
        Ok(Some(crs))
    }
}

/// Parse an EPSG code out of a WKT projection string.
///
/// ESRI .prj files rarely carry an AUTHORITY clause, so the well-known
/// geographic WGS 84 definition is recognised by name as well.
fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    let trimmed = wkt.trim();

    if let Some(code) = root_authority(trimmed) {
        return Some(code);
    }

    if let Some(code) = trimmed.strip_prefix("EPSG:") {
        if let Ok(code) = code.trim().parse::<u32>() {
            return Some(code);
        }
    }

    if trimmed.starts_with("GEOGCS[\"GCS_WGS_1984\"") || trimmed.starts_with("GEOGCS[\"WGS 84\"") {
        return Some(crate::models::WGS84_EPSG);
    }

    None
}

/// EPSG code of an AUTHORITY clause sitting directly in the root definition.
///
/// Authorities nested deeper belong to the base GEOGCS, a datum or a unit.
fn root_authority(wkt: &str) -> Option<u32> {
    const PREFIX: &str = "AUTHORITY[\"EPSG\",\"";

    let mut depth = 0usize;
    let mut quoted = false;
    for (i, c) in wkt.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => depth += 1,
            ']' | ')' if !quoted => depth = depth.saturating_sub(1),
            'A' if !quoted && depth == 1 && wkt[i..].starts_with(PREFIX) => {
                let code_start = i + PREFIX.len();
                let end = wkt[code_start..].find('"')?;
                return wkt[code_start..code_start + end].parse().ok();
            }
            _ => {}
        }
    }
    None
}

/// Planar access to the shapefile point flavours
trait PlanarPoint {
    fn xy(&self) -> [f64; 2];
}

impl PlanarPoint for shapefile::Point {
    fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl PlanarPoint for shapefile::PointM {
    fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl PlanarPoint for shapefile::PointZ {
    fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

fn coords<P: PlanarPoint>(points: &[P]) -> Vec<[f64; 2]> {
    points.iter().map(PlanarPoint::xy).collect()
}

fn polyline_geometry<P: PlanarPoint>(parts: &[Vec<P>]) -> Geometry {
    let mut lines: Vec<Vec<[f64; 2]>> = parts.iter().map(|part| coords(part)).collect();
    if lines.len() == 1 {
        Geometry::line_string(lines.remove(0))
    } else {
        Geometry::MultiLineString { coordinates: lines }
    }
}

/// Group shapefile rings into polygons.
///
/// Every outer ring starts a new polygon and inner rings attach to the
/// most recent outer ring.
fn polygon_geometry<P: PlanarPoint>(rings: &[PolygonRing<P>]) -> Geometry {
    let mut polygons: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(vec![coords(points)]),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some(polygon) => polygon.push(coords(points)),
                None => polygons.push(vec![coords(points)]),
            },
        }
    }

    if polygons.len() == 1 {
        Geometry::polygon(polygons.remove(0))
    } else {
        Geometry::multi_polygon(polygons)
    }
}

/// Convert a shapefile Shape into a geometry; null shapes have none
fn convert_shape(shape: &Shape) -> Result<Option<Geometry>> {
    let geometry = match shape {
        Shape::Point(p) => Geometry::Point { coordinates: p.xy() },
        Shape::PointM(p) => Geometry::Point { coordinates: p.xy() },
        Shape::PointZ(p) => Geometry::Point { coordinates: p.xy() },
        Shape::Polyline(line) => polyline_geometry(line.parts()),
        Shape::PolylineM(line) => polyline_geometry(line.parts()),
        Shape::PolylineZ(line) => polyline_geometry(line.parts()),
        Shape::Polygon(polygon) => polygon_geometry(polygon.rings()),
        Shape::PolygonM(polygon) => polygon_geometry(polygon.rings()),
        Shape::PolygonZ(polygon) => polygon_geometry(polygon.rings()),
        Shape::Multipoint(mp) => Geometry::MultiPoint { coordinates: coords(mp.points()) },
        Shape::MultipointM(mp) => Geometry::MultiPoint { coordinates: coords(mp.points()) },
        Shape::MultipointZ(mp) => Geometry::MultiPoint { coordinates: coords(mp.points()) },
        Shape::Multipatch(_) => {
            return Err(CdwError::dataset_format(
                "Shapefile",
                "Multipatch geometry type is not supported",
            ))
        }
        Shape::NullShape => return Ok(None),
    };

    Ok(Some(geometry))
}

fn extract_properties(record: shapefile::dbase::Record) -> HashMap<String, serde_json::Value> {
    record
        .into_iter()
        .map(|(name, value)| (name, convert_dbase_value(value)))
        .collect()
}

fn number(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Convert dBase field value to JSON value
fn convert_dbase_value(value: DbaseFieldValue) -> serde_json::Value {
    match value {
        DbaseFieldValue::Character(Some(s)) => serde_json::Value::String(s),
        DbaseFieldValue::Numeric(Some(n)) => number(n),
        DbaseFieldValue::Float(Some(f)) => number(f64::from(f)),
        DbaseFieldValue::Double(d) => number(d),
        DbaseFieldValue::Currency(c) => number(c),
        DbaseFieldValue::Integer(i) => serde_json::Value::Number(i.into()),
        DbaseFieldValue::Logical(Some(b)) => serde_json::Value::Bool(b),
        DbaseFieldValue::Date(Some(date)) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        DbaseFieldValue::Memo(s) => serde_json::Value::String(s),
        _ => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_identity() {
        let reader = ShapefileFormatReader;
        assert_eq!(reader.supported_extensions(), &["shp"]);
        assert_eq!(reader.format_name(), "Shapefile");
    }

    #[tokio::test]
    async fn test_validation_missing_file() {
        let reader = ShapefileFormatReader;
        let validation = reader.validate(Path::new("/nonexistent/blocks.shp")).await.unwrap();

        assert!(!validation.is_valid());
    }

    #[tokio::test]
    async fn test_read_reports_missing_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.shp");
        fs::write(&path, b"").unwrap();

        let err = ShapefileFormatReader.read(&path).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains(".shx"));
        assert!(message.contains(".dbf"));
    }

    #[test]
    fn test_parse_epsg_from_wkt() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984"],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(parse_epsg_from_wkt(wkt), Some(4326));

        assert_eq!(parse_epsg_from_wkt("EPSG:2263"), Some(2263));

        let esri = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]]]"#;
        assert_eq!(parse_epsg_from_wkt(esri), Some(4326));

        let state_plane = r#"PROJCS["NAD_1983_StatePlane_New_York_Long_Isl_FIPS_3104_Feet",GEOGCS["GCS_North_American_1983"]]"#;
        assert_eq!(parse_epsg_from_wkt(state_plane), None);

        let ogc_state_plane = r#"PROJCS["NAD83 / New York Long Island (ftUS)",GEOGCS["NAD83",AUTHORITY["EPSG","4269"]],UNIT["US survey foot",0.3048006096012192,AUTHORITY["EPSG","9003"]],AUTHORITY["EPSG","2263"]]"#;
        assert_eq!(parse_epsg_from_wkt(ogc_state_plane), Some(2263));
    }

    #[test]
    fn test_nested_authority_is_not_the_dataset_crs() {
        // Only the geographic base and the unit carry an authority
        let wkt = r#"PROJCS["NAD83 / New York Long Island (ftUS)",GEOGCS["NAD83",AUTHORITY["EPSG","4269"]],PROJECTION["Lambert_Conformal_Conic_2SP"],UNIT["US survey foot",0.3048006096012192,AUTHORITY["EPSG","9003"]]]"#;
        assert_eq!(parse_epsg_from_wkt(wkt), None);

        let wgs84_base = r#"PROJCS["WGS 84 / UTM zone 18N",GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"]]"#;
        assert_eq!(parse_epsg_from_wkt(wgs84_base), None);
    }

    #[tokio::test]
    async fn test_unrecognised_prj_is_kept_as_definition() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shp = temp_dir.path().join("blocks.shp");
        let prj = r#"PROJCS["NAD_1983_StatePlane_New_York_Long_Isl_FIPS_3104_Feet",GEOGCS["GCS_North_American_1983"]]"#;
        fs::write(temp_dir.path().join("blocks.prj"), prj).unwrap();

        let crs = ShapefileFormatReader.extract_crs(&shp).unwrap();
        assert_eq!(crs, Some(DeclaredCrs::Definition(prj.to_string())));

        fs::remove_file(temp_dir.path().join("blocks.prj")).unwrap();
        assert_eq!(ShapefileFormatReader.extract_crs(&shp).unwrap(), None);
    }

    #[test]
    fn test_polygon_rings_grouped_by_outer() {
        let square = |o: f64| {
            vec![
                shapefile::Point::new(o, o),
                shapefile::Point::new(o, o + 1.0),
                shapefile::Point::new(o + 1.0, o + 1.0),
                shapefile::Point::new(o + 1.0, o),
                shapefile::Point::new(o, o),
            ]
        };

        let single = polygon_geometry(&[PolygonRing::Outer(square(0.0))]);
        assert!(matches!(single, Geometry::Polygon { ref coordinates } if coordinates.len() == 1));

        let multi = polygon_geometry(&[
            PolygonRing::Outer(square(0.0)),
            PolygonRing::Outer(square(5.0)),
            PolygonRing::Inner(square(5.25)),
        ]);
        match multi {
            Geometry::MultiPolygon { coordinates } => {
                assert_eq!(coordinates.len(), 2);
                assert_eq!(coordinates[1].len(), 2);
            }
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
    }
}
