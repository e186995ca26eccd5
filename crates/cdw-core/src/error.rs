//! Error types for the CDW estimator

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdwError {
    // Request errors
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // Lookup errors
    #[error("Location ({lon}, {lat}) is outside the covered area: no census block contains it")]
    OutsideCoverage { lon: f64, lat: f64 },

    #[error("No transfer route configured for census block {geoid}")]
    NoTransferRoute { geoid: String },

    #[error("No landfill route configured from transfer station {station}")]
    NoLandfillRoute { station: String },

    // Data integrity errors
    #[error("Census block {geoid} maps to {count} transfer routes; expected exactly one")]
    AmbiguousTransferRoute { geoid: String, count: usize },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Dataset errors
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Unsupported dataset format: .{extension}. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("{format} error: {message}")]
    DatasetFormat { format: String, message: String },

    #[error("Dataset {dataset} is missing attribute '{attribute}' on feature {feature_id}")]
    MissingAttribute {
        dataset: String,
        attribute: String,
        feature_id: String,
    },

    #[error("CRS mismatch: dataset {dataset} uses {dataset_crs} and cannot be brought to EPSG:4326: {reason}")]
    CrsMismatch {
        dataset: String,
        dataset_crs: String,
        reason: String,
    },

    // Collaborator errors
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used by outer layers to choose a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    DataIntegrity,
    Configuration,
    Dataset,
    Service,
    Io,
}

impl CdwError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CdwError::InvalidInput { field: field.into(), reason: reason.into() }
    }

    /// Shorthand for a `ConfigInvalid` error
    pub fn config_invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CdwError::ConfigInvalid { key: key.into(), reason: reason.into() }
    }

    /// Shorthand for a `DatasetFormat` error
    pub fn dataset_format(format: impl Into<String>, message: impl Into<String>) -> Self {
        CdwError::DatasetFormat { format: format.into(), message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CdwError::InvalidInput { .. } => ErrorKind::InvalidInput,
            CdwError::OutsideCoverage { .. }
            | CdwError::NoTransferRoute { .. }
            | CdwError::NoLandfillRoute { .. } => ErrorKind::NotFound,
            CdwError::AmbiguousTransferRoute { .. } => ErrorKind::DataIntegrity,
            CdwError::ConfigMissing { .. } | CdwError::ConfigInvalid { .. } => {
                ErrorKind::Configuration
            }
            CdwError::InvalidPath { .. }
            | CdwError::UnsupportedFormat { .. }
            | CdwError::DatasetFormat { .. }
            | CdwError::MissingAttribute { .. }
            | CdwError::CrsMismatch { .. } => ErrorKind::Dataset,
            CdwError::ServiceUnavailable { .. } => ErrorKind::Service,
            CdwError::Io(_) | CdwError::Serialization(_) => ErrorKind::Io,
        }
    }

    /// True when the failure is caused by the request rather than by data or services
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidInput | ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, CdwError>;
