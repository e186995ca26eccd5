//! Estimate command implementation

use crate::cli::EstimateArgs;
use crate::output::OutputWriter;
use crate::output_types::{MaterialRow, StageRow};
use anyhow::{Context, Result};
use cdw_core::config::LayeredConfig;
use cdw_core::models::parse_lat_lon;
use cdw_estimate::{Estimate, Estimator, ExcavationRequest};

pub async fn execute(args: EstimateArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let location = parse_lat_lon(&args.location).with_context(|| {
        format!("Invalid location '{}': expected \"lat,lon\"", args.location)
    })?;

    let request = ExcavationRequest::new(location, args.length, args.width, args.depth);
    // Catch bad dimensions before the datasets are loaded
    request.validate()?;

    let estimator = Estimator::load(config).await.context("Failed to load datasets")?;
    let estimate = estimator.estimate(&request)?;

    if output.is_json() {
        output.result(&estimate)?;
    } else {
        print_estimate(&estimate, output);
    }

    Ok(())
}

fn print_estimate(estimate: &Estimate, output: &OutputWriter) {
    output.section("Excavation");
    output.kv("Borough", &estimate.borough);
    output.kv("Census block", &estimate.census_block);
    output.kv("Volume", format!("{:.2} m³", estimate.volume));
    output.kv("Weight", format!("{:.2} t", estimate.breakdown.total_weight));

    output.section("Composition");
    output.table(
        estimate
            .composition
            .iter()
            .map(|(material, fraction)| MaterialRow {
                material: material.to_string(),
                fraction: format!("{:.4}", fraction),
            })
            .collect(),
    );

    output.section("Disposal Route");
    output.kv("Transfer station", &estimate.route.transfer_station);
    output.kv("Distance to station", format!("{:.2} mi", estimate.route.transfer_cost));
    if let Some(landfill) = &estimate.route.landfill {
        output.kv("Landfill", landfill);
    }
    output.kv("Distance to landfill", format!("{:.2} mi", estimate.route.landfill_cost));

    output.section("Emissions");
    output.table(
        estimate
            .breakdown
            .stages()
            .iter()
            .map(|(stage, value)| StageRow {
                stage: stage.trim_start_matches("emissions_").replace('_', " "),
                emissions: format!("{:.2}", value),
            })
            .collect(),
    );
    output.success(format!("Total: {:.2} kg CO2e", estimate.breakdown.total));
}
