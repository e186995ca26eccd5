use crate::error::{CdwError, Result};
use crate::formats::FormatValidation;
use std::path::Path;

pub struct FormatValidator;

impl FormatValidator {
    /// Validate that a file exists and is readable
    pub fn validate_file_exists(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        if !path.exists() {
            validation.errors.push(format!("File not found: {}", path.display()));
            return validation;
        }
        if let Err(e) = std::fs::metadata(path) {
            validation.errors.push(format!("Cannot access file: {}", e));
        }

        validation
    }

    /// Validate that required component files exist for multi-file formats
    pub fn validate_component_files(
        base_path: &Path,
        required_extensions: &[&str],
        optional_extensions: &[&str],
    ) -> FormatValidation {
        let mut validation = FormatValidation::default();

        for ext in required_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation
                    .errors
                    .push(format!("Missing required file: {}", component_path.display()));
            }
        }

        for ext in optional_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation.warnings.push(format!(
                    "Optional file not found: {} (CRS will be assumed to be EPSG:4326)",
                    component_path.display()
                ));
            }
        }

        validation
    }

    /// Validate JSON structure by attempting to parse
    pub fn validate_json_structure(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                    validation.errors.push(format!("Invalid JSON structure: {}", e));
                }
            }
            Err(e) => {
                validation.errors.push(format!("Cannot read file: {}", e));
            }
        }

        validation
    }

    /// Validate that a delimited table carries the required header columns
    pub fn validate_csv_header(path: &Path, required_columns: &[&str]) -> FormatValidation {
        let mut validation = FormatValidation::default();

        let mut reader = match ::csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                validation.errors.push(format!("Cannot open table: {}", e));
                return validation;
            }
        };

        match reader.headers() {
            Ok(headers) => {
                for column in required_columns {
                    if !headers.iter().any(|h| h.trim() == *column) {
                        validation.errors.push(format!("Missing column: {}", column));
                    }
                }
            }
            Err(e) => validation.errors.push(format!("Cannot read header row: {}", e)),
        }

        validation
    }

    /// Merge multiple validation results
    pub fn merge_validations(validations: Vec<FormatValidation>) -> FormatValidation {
        let mut merged = FormatValidation::default();

        for validation in validations {
            merged.errors.extend(validation.errors);
            merged.warnings.extend(validation.warnings);
        }

        merged
    }

    /// Convert a validation result to a Result type
    pub fn validation_to_result(validation: &FormatValidation, format_name: &str) -> Result<()> {
        if !validation.is_valid() {
            Err(CdwError::dataset_format(format_name, validation.errors.join("; ")))
        } else {
            Ok(())
        }
    }
}
