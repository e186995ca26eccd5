//! Delimited table reader
//!
//! Used for attribute-only datasets such as the transfer-station to landfill
//! cost table. Rows become features without geometry and every cell is kept
//! as a string; the loader decides how identifiers and costs are read.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{CdwError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatDataset, FormatFeature, FormatReader, FormatValidation};

/// CSV table reader
pub struct CsvTableReader;

#[async_trait]
impl FormatReader for CsvTableReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| CdwError::dataset_format("CSV", format!("Failed to open table: {}", e)))?;

        let headers = reader
            .headers()
            .map_err(|e| CdwError::dataset_format("CSV", format!("Failed to read header row: {}", e)))?
            .clone();

        let mut features = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row.map_err(|e| {
                CdwError::dataset_format("CSV", format!("Failed to read row {}: {}", idx + 1, e))
            })?;

            let properties = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), serde_json::Value::String(value.to_string())))
                .collect();

            features.push(FormatFeature {
                id: idx.to_string(),
                geometry: None,
                properties,
            });
        }

        Ok(FormatDataset {
            name: dataset_name(path),
            format_name: "CSV".to_string(),
            crs: None,
            features,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv"]
    }

    fn format_name(&self) -> &str {
        "CSV"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let header = FormatValidator::validate_csv_header(path, &[]);
        Ok(FormatValidator::merge_validations(vec![validation, header]))
    }
}
