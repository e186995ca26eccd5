//! Dataset format abstraction
//!
//! Each on-disk format implements the `FormatReader` trait, and the `FormatRegistry`
//! dispatches to the right reader by file extension. `DatasetLoader` turns the
//! generic features into the typed boundary and routing records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CdwError, Result};
use crate::models::{DeclaredCrs, Geometry};

pub mod csv;
pub mod datasets;
pub mod geojson;
pub mod shapefile;
pub mod validation;

pub use datasets::{AttributeNames, DatasetBundle, DatasetLoader, DatasetSummary};

/// Format reader trait that all format implementations must implement
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Read a dataset from the given path
    async fn read(&self, path: &Path) -> Result<FormatDataset>;

    /// Get supported file extensions (e.g., ["shp"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without full read
    async fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Dataset representation returned by format readers
#[derive(Debug, Clone)]
pub struct FormatDataset {
    /// Dataset name (file stem)
    pub name: String,

    /// Format name (e.g., "Shapefile", "GeoJSON", "CSV")
    pub format_name: String,

    /// Reference frame declared by the file; `None` when the file declares nothing
    pub crs: Option<DeclaredCrs>,

    /// Features (or table rows) in file order
    pub features: Vec<FormatFeature>,
}

/// Feature extracted from a format
#[derive(Debug, Clone)]
pub struct FormatFeature {
    /// Feature identifier
    pub id: String,

    /// Geometry, None for table rows and null shapes
    pub geometry: Option<Geometry>,

    /// Feature attributes
    pub properties: HashMap<String, serde_json::Value>,
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every reader this crate ships
    pub fn with_default_readers() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(geojson::GeoJsonReader));
        registry.register(Box::new(shapefile::ShapefileFormatReader));
        registry.register(Box::new(csv::CsvTableReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| CdwError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| CdwError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dataset name from a file path
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string()
}
