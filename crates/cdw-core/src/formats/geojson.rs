//! GeoJSON format reader implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{CdwError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatDataset, FormatFeature, FormatReader, FormatValidation};
use crate::models::{DeclaredCrs, Geometry, WGS84_EPSG};

/// GeoJSON format reader
pub struct GeoJsonReader;

#[async_trait]
impl FormatReader for GeoJsonReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        let content = fs::read_to_string(path)?;

        let geojson: geojson::GeoJson = content
            .parse()
            .map_err(|e| CdwError::dataset_format("GeoJSON", format!("Failed to parse GeoJSON: {}", e)))?;

        let (features, crs) = self.extract_features_and_crs(&geojson);

        Ok(FormatDataset {
            name: dataset_name(path),
            format_name: "GeoJSON".to_string(),
            crs,
            features,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let json_validation = FormatValidator::validate_json_structure(path);
        Ok(FormatValidator::merge_validations(vec![validation, json_validation]))
    }
}

impl GeoJsonReader {
    /// Extract features and the declared CRS
    fn extract_features_and_crs(&self, geojson: &geojson::GeoJson) -> (Vec<FormatFeature>, Option<DeclaredCrs>) {
        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                let features = fc
                    .features
                    .iter()
                    .enumerate()
                    .map(|(idx, feature)| self.convert_feature(feature, idx))
                    .collect();

                let crs = fc
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(extract_crs);

                (features, crs)
            }
            geojson::GeoJson::Feature(feature) => (vec![self.convert_feature(feature, 0)], None),
            geojson::GeoJson::Geometry(geom) => {
                let feature = FormatFeature {
                    id: "0".to_string(),
                    geometry: convert_geometry(geom),
                    properties: HashMap::new(),
                };
                (vec![feature], None)
            }
        }
    }

    /// Convert a GeoJSON feature to FormatFeature
    fn convert_feature(&self, feature: &geojson::Feature, idx: usize) -> FormatFeature {
        let id = feature
            .id
            .as_ref()
            .map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            })
            .unwrap_or_else(|| idx.to_string());

        let geometry = feature.geometry.as_ref().and_then(convert_geometry);

        let properties = feature
            .properties
            .as_ref()
            .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        FormatFeature { id, geometry, properties }
    }
}

/// Convert a GeoJSON geometry, dropping any third ordinate.
///
/// Geometry collections are not used by the boundary datasets and map to `None`.
fn convert_geometry(geometry: &geojson::Geometry) -> Option<Geometry> {
    use geojson::Value;

    let geometry = match &geometry.value {
        Value::Point(p) => Geometry::Point { coordinates: position(p)? },
        Value::MultiPoint(points) => Geometry::MultiPoint { coordinates: positions(points)? },
        Value::LineString(line) => Geometry::LineString { coordinates: positions(line)? },
        Value::MultiLineString(lines) => Geometry::MultiLineString {
            coordinates: lines.iter().map(|l| positions(l)).collect::<Option<_>>()?,
        },
        Value::Polygon(rings) => Geometry::Polygon {
            coordinates: rings.iter().map(|r| positions(r)).collect::<Option<_>>()?,
        },
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon {
            coordinates: polygons
                .iter()
                .map(|rings| rings.iter().map(|r| positions(r)).collect::<Option<Vec<_>>>())
                .collect::<Option<_>>()?,
        },
        Value::GeometryCollection(_) => return None,
    };

    Some(geometry)
}

fn position(p: &[f64]) -> Option<[f64; 2]> {
    match p {
        [x, y, ..] => Some([*x, *y]),
        _ => None,
    }
}

fn positions(ps: &[Vec<f64>]) -> Option<Vec<[f64; 2]>> {
    ps.iter().map(|p| position(p)).collect()
}

/// Frame named by a legacy GeoJSON `crs` member
fn extract_crs(crs: &serde_json::Value) -> Option<DeclaredCrs> {
    let name = crs.get("properties")?.get("name")?.as_str()?.trim();

    // "urn:ogc:def:crs:OGC:1.3:CRS84" is lon/lat WGS 84
    if name.ends_with("CRS84") {
        return Some(DeclaredCrs::Epsg(WGS84_EPSG));
    }

    // "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326"
    let epsg = name.contains("EPSG").then(|| name.split(':').next_back()).flatten();
    match epsg.and_then(|code| code.parse().ok()) {
        Some(code) => Some(DeclaredCrs::Epsg(code)),
        None => Some(DeclaredCrs::Definition(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_borough_collection() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("Borough_Boundaries.geojson");

        let geojson_content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]]
                    },
                    "properties": { "boro_name": "Manhattan", "boro_code": "1" }
                }
            ]
        }"#;

        fs::write(&file_path, geojson_content).unwrap();

        let result = reader.read(&file_path).await.unwrap();

        assert_eq!(result.name, "Borough_Boundaries");
        assert_eq!(result.format_name, "GeoJSON");
        assert_eq!(result.crs, None);
        assert_eq!(result.features.len(), 1);
        assert_eq!(result.features[0].id, "0");
        assert_eq!(result.features[0].properties["boro_name"], "Manhattan");
        assert!(result.features[0].geometry.as_ref().unwrap().is_areal());
    }

    #[tokio::test]
    async fn test_three_dimensional_positions_are_flattened() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("path.geojson");

        let geojson_content = r#"{
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[1.0, 2.0, 5.0], [3.0, 4.0, 6.0]] },
            "properties": {}
        }"#;

        fs::write(&file_path, geojson_content).unwrap();

        let result = reader.read(&file_path).await.unwrap();
        let geometry = result.features[0].geometry.clone().unwrap();
        assert_eq!(geometry, Geometry::line_string(vec![[1.0, 2.0], [3.0, 4.0]]));
    }

    #[test]
    fn test_extract_crs() {
        let crs = serde_json::json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::2263"}});
        assert_eq!(extract_crs(&crs), Some(DeclaredCrs::Epsg(2263)));

        let crs = serde_json::json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}});
        assert_eq!(extract_crs(&crs), Some(DeclaredCrs::Epsg(4326)));

        // Unknown names are kept so the loader can try to resolve them
        let crs = serde_json::json!({"type": "name", "properties": {"name": "ESRI:102718"}});
        assert_eq!(extract_crs(&crs), Some(DeclaredCrs::Definition("ESRI:102718".to_string())));

        assert_eq!(extract_crs(&serde_json::json!({"type": "link"})), None);
    }

    #[tokio::test]
    async fn test_validation_rejects_invalid_json() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.geojson");
        fs::write(&file_path, "not valid json").unwrap();

        let validation = reader.validate(&file_path).await.unwrap();

        assert!(!validation.is_valid());
    }
}
