//! Command implementations

mod config;
mod datasets;
mod estimate;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli.overrides)?;

    match cli.command {
        Commands::Estimate(args) => estimate::execute(args, &config, &output).await,
        Commands::Datasets => datasets::execute(&config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}
