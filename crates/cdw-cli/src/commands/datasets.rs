//! Datasets command implementation

use crate::output::OutputWriter;
use crate::output_types::{DatasetFileRow, DatasetsOutput};
use anyhow::{Context, Result};
use cdw_core::config::LayeredConfig;
use cdw_core::formats::DatasetLoader;

pub async fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    config.validate()?;

    let files = config.dataset_paths();
    let bundle = DatasetLoader::new()
        .load(&files)
        .await
        .context("Failed to load datasets")?;
    let summary = bundle.summary();

    let rows = vec![
        DatasetFileRow {
            dataset: "Boroughs".to_string(),
            path: files.boroughs.display().to_string(),
            records: summary.boroughs,
        },
        DatasetFileRow {
            dataset: "Census blocks".to_string(),
            path: files.census_blocks.display().to_string(),
            records: summary.census_blocks,
        },
        DatasetFileRow {
            dataset: "Transfer routes".to_string(),
            path: files.transfer_routes.display().to_string(),
            records: summary.transfer_routes,
        },
        DatasetFileRow {
            dataset: "Landfill routes".to_string(),
            path: files.landfill_routes.display().to_string(),
            records: summary.landfill_routes,
        },
    ];

    if output.is_json() {
        output.result(DatasetsOutput {
            data_dir: config.data_dir.value.display().to_string(),
            files: rows,
            summary,
        })?;
    } else {
        output.section("Datasets");
        output.kv("Data directory", config.data_dir.value.display());
        output.table(rows);
        output.success("All datasets loaded");
    }

    Ok(())
}
