//! Typed loading of the four reference datasets
//!
//! Generic `FormatFeature`s are turned into borough and census block
//! boundaries and the two routing tables. Attribute names default to the
//! column names used by the published NYC exports.

use serde::Serialize;
use std::path::Path;

use crate::config::DatasetFiles;
use crate::error::{CdwError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{FormatDataset, FormatFeature, FormatRegistry};
use crate::models::{BoroughRecord, CensusBlockRecord, LandfillRoute, TransferRoute};
use crate::transform::normalize_dataset;

/// Attribute (column) names read from each dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    pub borough_name: String,
    pub census_geoid: String,
    pub transfer_origin: String,
    pub transfer_station: String,
    pub transfer_cost: String,
    pub landfill_origin: String,
    pub landfill_cost: String,
    pub landfill_destination: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            borough_name: "boro_name".to_string(),
            census_geoid: "GEOID".to_string(),
            transfer_origin: "origin_id".to_string(),
            // dBase truncates field names to ten characters
            transfer_station: "destinatio".to_string(),
            transfer_cost: "total_cost".to_string(),
            landfill_origin: "origin_id".to_string(),
            landfill_cost: "total_cost".to_string(),
            landfill_destination: "destination_id".to_string(),
        }
    }
}

/// Every record needed to build the spatial index
#[derive(Debug, Clone, Default)]
pub struct DatasetBundle {
    pub boroughs: Vec<BoroughRecord>,
    pub census_blocks: Vec<CensusBlockRecord>,
    pub transfer_routes: Vec<TransferRoute>,
    pub landfill_routes: Vec<LandfillRoute>,
}

impl DatasetBundle {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            boroughs: self.boroughs.len(),
            census_blocks: self.census_blocks.len(),
            transfer_routes: self.transfer_routes.len(),
            landfill_routes: self.landfill_routes.len(),
        }
    }
}

/// Record counts per dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DatasetSummary {
    pub boroughs: usize,
    pub census_blocks: usize,
    pub transfer_routes: usize,
    pub landfill_routes: usize,
}

/// Reads the reference datasets through the format registry
pub struct DatasetLoader {
    registry: FormatRegistry,
    attributes: AttributeNames,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::with_attributes(AttributeNames::default())
    }

    pub fn with_attributes(attributes: AttributeNames) -> Self {
        Self {
            registry: FormatRegistry::with_default_readers(),
            attributes,
        }
    }

    /// Load all four datasets
    pub async fn load(&self, files: &DatasetFiles) -> Result<DatasetBundle> {
        let bundle = DatasetBundle {
            boroughs: self.load_boroughs(&files.boroughs).await?,
            census_blocks: self.load_census_blocks(&files.census_blocks).await?,
            transfer_routes: self.load_transfer_routes(&files.transfer_routes).await?,
            landfill_routes: self.load_landfill_routes(&files.landfill_routes).await?,
        };

        let summary = bundle.summary();
        tracing::info!(
            boroughs = summary.boroughs,
            census_blocks = summary.census_blocks,
            transfer_routes = summary.transfer_routes,
            landfill_routes = summary.landfill_routes,
            "Loaded reference datasets"
        );

        Ok(bundle)
    }

    /// Detect the format, validate, read and normalize to EPSG:4326
    pub async fn read_dataset(&self, path: &Path) -> Result<FormatDataset> {
        if !path.exists() {
            return Err(CdwError::InvalidPath {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let reader = self.registry.detect_format(path)?;

        let validation = reader.validate(path).await?;
        for warning in &validation.warnings {
            tracing::warn!(path = %path.display(), "{}", warning);
        }
        FormatValidator::validation_to_result(&validation, reader.format_name())?;

        let dataset = normalize_dataset(reader.read(path).await?)?;

        tracing::debug!(
            dataset = %dataset.name,
            format = %dataset.format_name,
            features = dataset.features.len(),
            "Read dataset"
        );

        Ok(dataset)
    }

    pub async fn load_boroughs(&self, path: &Path) -> Result<Vec<BoroughRecord>> {
        let dataset = self.read_dataset(path).await?;
        let mut boroughs = Vec::with_capacity(dataset.features.len());

        for feature in &dataset.features {
            let Some(geometry) = areal_geometry(&dataset, feature) else {
                continue;
            };
            let name = required_identifier(&dataset, feature, &self.attributes.borough_name)?;
            boroughs.push(BoroughRecord { name, geometry });
        }

        Ok(boroughs)
    }

    pub async fn load_census_blocks(&self, path: &Path) -> Result<Vec<CensusBlockRecord>> {
        let dataset = self.read_dataset(path).await?;
        let mut blocks = Vec::with_capacity(dataset.features.len());

        for feature in &dataset.features {
            let Some(geometry) = areal_geometry(&dataset, feature) else {
                continue;
            };
            let geoid = required_identifier(&dataset, feature, &self.attributes.census_geoid)?;
            blocks.push(CensusBlockRecord { geoid, geometry });
        }

        Ok(blocks)
    }

    pub async fn load_transfer_routes(&self, path: &Path) -> Result<Vec<TransferRoute>> {
        let dataset = self.read_dataset(path).await?;
        let attrs = &self.attributes;

        dataset
            .features
            .iter()
            .map(|feature| {
                Ok(TransferRoute {
                    origin_geoid: required_identifier(&dataset, feature, &attrs.transfer_origin)?,
                    station_id: required_identifier(&dataset, feature, &attrs.transfer_station)?,
                    cost_meters: required_cost(&dataset, feature, &attrs.transfer_cost)?,
                    path: feature.geometry.clone(),
                })
            })
            .collect()
    }

    pub async fn load_landfill_routes(&self, path: &Path) -> Result<Vec<LandfillRoute>> {
        let dataset = self.read_dataset(path).await?;
        let attrs = &self.attributes;

        dataset
            .features
            .iter()
            .map(|feature| {
                Ok(LandfillRoute {
                    station_id: required_identifier(&dataset, feature, &attrs.landfill_origin)?,
                    landfill_id: feature
                        .properties
                        .get(&attrs.landfill_destination)
                        .and_then(identifier_value),
                    cost_meters: required_cost(&dataset, feature, &attrs.landfill_cost)?,
                })
            })
            .collect()
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn areal_geometry(dataset: &FormatDataset, feature: &FormatFeature) -> Option<crate::models::Geometry> {
    match &feature.geometry {
        Some(geometry) if geometry.is_areal() => Some(geometry.clone()),
        other => {
            tracing::warn!(
                dataset = %dataset.name,
                feature = %feature.id,
                geometry = ?other.as_ref().map(|g| g.geometry_type()),
                "Skipping feature without polygon geometry"
            );
            None
        }
    }
}

fn missing(dataset: &FormatDataset, feature: &FormatFeature, attribute: &str) -> CdwError {
    CdwError::MissingAttribute {
        dataset: dataset.name.clone(),
        attribute: attribute.to_string(),
        feature_id: feature.id.clone(),
    }
}

fn required_identifier(dataset: &FormatDataset, feature: &FormatFeature, attribute: &str) -> Result<String> {
    feature
        .properties
        .get(attribute)
        .and_then(identifier_value)
        .ok_or_else(|| missing(dataset, feature, attribute))
}

fn required_cost(dataset: &FormatDataset, feature: &FormatFeature, attribute: &str) -> Result<f64> {
    let value = feature
        .properties
        .get(attribute)
        .filter(|v| !v.is_null())
        .ok_or_else(|| missing(dataset, feature, attribute))?;

    match numeric_value(value) {
        Some(cost) if cost.is_finite() => Ok(cost),
        _ => Err(CdwError::dataset_format(
            dataset.format_name.clone(),
            format!(
                "{}: feature {} has non-numeric {} value {}",
                dataset.name, feature.id, attribute, value
            ),
        )),
    }
}

/// Normalise an attribute value to an identifier string.
///
/// Integral numbers print without a decimal part, and digit strings are read
/// as integers, so `12`, `12.0`, `"12.0"` and `"0012"` all become `"12"`.
/// A GEOID stored as text in one file then joins the same GEOID stored as a
/// number in another.
pub fn identifier_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            let int = match s.split_once('.') {
                Some((int, frac)) if frac.chars().all(|c| c == '0') => int,
                _ => s,
            };
            if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) {
                let digits = int.trim_start_matches('0');
                return Some(if digits.is_empty() { "0" } else { digits }.to_string());
            }
            Some(s.to_string())
        }
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 {
                    Some(format!("{:.0}", f))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// Numeric attribute value; strings are parsed
pub fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
