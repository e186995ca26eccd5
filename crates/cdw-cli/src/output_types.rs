use cdw_core::formats::DatasetSummary;
use serde::Serialize;
use tabled::Tabled;

/// Output for the datasets command
#[derive(Debug, Serialize)]
pub struct DatasetsOutput {
    pub data_dir: String,
    pub files: Vec<DatasetFileRow>,
    pub summary: DatasetSummary,
}

#[derive(Debug, Serialize, Tabled)]
pub struct DatasetFileRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "File")]
    pub path: String,
    #[tabled(rename = "Records")]
    pub records: usize,
}

/// One stage of an emissions breakdown
#[derive(Debug, Tabled)]
pub struct StageRow {
    #[tabled(rename = "Stage")]
    pub stage: String,
    #[tabled(rename = "kg CO2e")]
    pub emissions: String,
}

#[derive(Debug, Tabled)]
pub struct MaterialRow {
    #[tabled(rename = "Material")]
    pub material: String,
    #[tabled(rename = "Fraction")]
    pub fraction: String,
}

/// One effective setting for the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
