//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use cdw_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::ConfigArgs;

const DEFAULT_CONFIG_FILE: &str = "cdw.toml";

/// Load layered configuration: defaults, config file, environment, then CLI flags
pub fn load_config(args: &ConfigArgs) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file(args.config.as_deref()) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides(args));

    Ok(config)
}

fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

fn overrides(args: &ConfigArgs) -> CliConfigOverrides {
    CliConfigOverrides {
        data_dir: args.data_dir.clone(),
        fill_factor: args.fill_factor,
        disposal_fraction: args.disposal_fraction,
        meters_per_mile: args.meters_per_mile,
        composition_mode: args.composition_mode,
        strict_routes: args.strict_routes.then_some(true),
    }
}
