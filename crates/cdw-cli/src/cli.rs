use cdw_core::config::parse_composition_mode;
use cdw_core::models::CompositionMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CDW - Excavation greenhouse-gas emissions estimator
#[derive(Parser, Debug)]
#[command(name = "cdw")]
#[command(about = "Construction and demolition waste emissions estimator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that override the config file and `CDW_*` environment variables
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Config file (defaults to ./cdw.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the boundary and route datasets
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Fraction of the raw volume that is excavated material
    #[arg(long, global = true)]
    pub fill_factor: Option<f64>,

    /// Fraction of the waste weight sent to landfill
    #[arg(long, global = true)]
    pub disposal_fraction: Option<f64>,

    #[arg(long, global = true)]
    pub meters_per_mile: Option<f64>,

    /// Composition mode (layered or borough_table)
    #[arg(long, global = true, value_parser = composition_mode)]
    pub composition_mode: Option<CompositionMode>,

    /// Fail when a census block has more than one transfer route
    #[arg(long, global = true)]
    pub strict_routes: bool,
}

fn composition_mode(s: &str) -> Result<CompositionMode, String> {
    parse_composition_mode(s).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the emissions of one excavation
    Estimate(EstimateArgs),

    /// Load the datasets and show what they hold
    Datasets,

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Excavation location as "lat,lon"
    #[arg(long, allow_hyphen_values = true)]
    pub location: String,

    /// Length in meters
    #[arg(long, default_value = "0")]
    pub length: f64,

    /// Width in meters
    #[arg(long, default_value = "0")]
    pub width: f64,

    /// Depth in meters
    #[arg(long)]
    pub depth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_estimate_args() {
        let cli = Cli::try_parse_from([
            "cdw",
            "--json",
            "estimate",
            "--location",
            "40.78,-73.97",
            "--length",
            "10",
            "--width",
            "10",
            "--depth",
            "1",
            "--composition-mode",
            "borough_table",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.overrides.composition_mode, Some(CompositionMode::BoroughTable));
        match cli.command {
            Commands::Estimate(args) => {
                assert_eq!(args.location, "40.78,-73.97");
                assert_eq!(args.depth, 1.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_composition_mode() {
        assert!(Cli::try_parse_from(["cdw", "config", "--composition-mode", "stacked"]).is_err());
    }
}
