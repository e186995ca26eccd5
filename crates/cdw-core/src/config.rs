use crate::error::{CdwError, Result};
use crate::models::composition::{
    default_borough_compositions, CompositionMode, Layer, LayerProfile, WasteComposition,
};
use crate::models::EmissionCoefficients;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// File names of the four datasets, relative to `data_dir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFiles {
    pub boroughs: PathBuf,
    pub census_blocks: PathBuf,
    pub transfer_routes: PathBuf,
    pub landfill_routes: PathBuf,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            boroughs: PathBuf::from("Borough_Boundaries.geojson"),
            census_blocks: PathBuf::from("NYC_Census_2020.shp"),
            transfer_routes: PathBuf::from("census_blocks_to_TS_filtered.shp"),
            landfill_routes: PathBuf::from("Transfer_to_Landfill_filtered.csv"),
        }
    }
}

impl DatasetFiles {
    /// Resolve every file against a data directory; absolute names are kept as-is
    pub fn resolve(&self, data_dir: &Path) -> DatasetFiles {
        DatasetFiles {
            boroughs: data_dir.join(&self.boroughs),
            census_blocks: data_dir.join(&self.census_blocks),
            transfer_routes: data_dir.join(&self.transfer_routes),
            landfill_routes: data_dir.join(&self.landfill_routes),
        }
    }
}

/// Layered configuration for the estimator.
///
/// Scalar settings follow Default < File < Environment < CLI precedence.
/// The coefficient, layer and borough tables can only come from a file and
/// otherwise keep the published defaults.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_dir: ConfigValue<PathBuf>,
    pub fill_factor: ConfigValue<f64>,
    pub disposal_fraction: ConfigValue<f64>,
    pub meters_per_mile: ConfigValue<f64>,
    pub composition_mode: ConfigValue<CompositionMode>,
    pub strict_routes: ConfigValue<bool>,
    pub coefficients: EmissionCoefficients,
    pub layers: LayerProfile,
    pub borough_compositions: BTreeMap<String, WasteComposition>,
    pub datasets: DatasetFiles,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data_dir: ConfigValue::new(PathBuf::from("data"), ConfigSource::Default),
            fill_factor: ConfigValue::new(0.8, ConfigSource::Default),
            disposal_fraction: ConfigValue::new(0.1, ConfigSource::Default),
            meters_per_mile: ConfigValue::new(1609.34, ConfigSource::Default),
            composition_mode: ConfigValue::new(CompositionMode::Layered, ConfigSource::Default),
            strict_routes: ConfigValue::new(false, ConfigSource::Default),
            coefficients: EmissionCoefficients::default(),
            layers: LayerProfile::default(),
            borough_compositions: default_borough_compositions(),
            datasets: DatasetFiles::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| CdwError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig = toml::from_str(&content).map_err(|e| CdwError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        if let Some(data_dir) = file_config.data_dir {
            self.data_dir.update(data_dir, ConfigSource::File);
        }

        if let Some(fill_factor) = file_config.fill_factor {
            self.fill_factor.update(fill_factor, ConfigSource::File);
        }

        if let Some(disposal_fraction) = file_config.disposal_fraction {
            self.disposal_fraction.update(disposal_fraction, ConfigSource::File);
        }

        if let Some(meters_per_mile) = file_config.meters_per_mile {
            self.meters_per_mile.update(meters_per_mile, ConfigSource::File);
        }

        if let Some(mode) = file_config.composition_mode {
            self.composition_mode.update(mode, ConfigSource::File);
        }

        if let Some(strict) = file_config.strict_routes {
            self.strict_routes.update(strict, ConfigSource::File);
        }

        if let Some(coefficients) = file_config.coefficients {
            coefficients.merge_into(&mut self.coefficients);
        }

        if let Some(layers) = file_config.layers {
            self.layers = LayerProfile::new(layers);
        }

        if let Some(tables) = file_config.borough_compositions {
            for (borough, fractions) in tables {
                self.borough_compositions.insert(borough, WasteComposition::from_pairs(fractions));
            }
        }

        if let Some(datasets) = file_config.datasets {
            datasets.merge_into(&mut self.datasets);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CDW_DATA_DIR
        if let Ok(data_dir) = env::var("CDW_DATA_DIR") {
            self.data_dir.update(PathBuf::from(data_dir), ConfigSource::Environment);
        }

        // CDW_FILL_FACTOR
        if let Some(value) = env_f64("CDW_FILL_FACTOR") {
            self.fill_factor.update(value, ConfigSource::Environment);
        }

        // CDW_DISPOSAL_FRACTION
        if let Some(value) = env_f64("CDW_DISPOSAL_FRACTION") {
            self.disposal_fraction.update(value, ConfigSource::Environment);
        }

        // CDW_METERS_PER_MILE
        if let Some(value) = env_f64("CDW_METERS_PER_MILE") {
            self.meters_per_mile.update(value, ConfigSource::Environment);
        }

        // CDW_COMPOSITION_MODE
        if let Ok(mode_str) = env::var("CDW_COMPOSITION_MODE") {
            match parse_composition_mode(&mode_str) {
                Ok(mode) => self.composition_mode.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CDW_COMPOSITION_MODE value '{}': expected layered or borough_table",
                    mode_str
                ),
            }
        }

        // CDW_STRICT_ROUTES
        if let Ok(strict_str) = env::var("CDW_STRICT_ROUTES") {
            match parse_bool(&strict_str) {
                Ok(strict) => self.strict_routes.update(strict, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CDW_STRICT_ROUTES value '{}': expected true or false",
                    strict_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }

        if let Some(fill_factor) = overrides.fill_factor {
            self.fill_factor.update(fill_factor, ConfigSource::Cli);
        }

        if let Some(disposal_fraction) = overrides.disposal_fraction {
            self.disposal_fraction.update(disposal_fraction, ConfigSource::Cli);
        }

        if let Some(meters_per_mile) = overrides.meters_per_mile {
            self.meters_per_mile.update(meters_per_mile, ConfigSource::Cli);
        }

        if let Some(mode) = overrides.composition_mode {
            self.composition_mode.update(mode, ConfigSource::Cli);
        }

        if let Some(strict) = overrides.strict_routes {
            self.strict_routes.update(strict, ConfigSource::Cli);
        }
    }

    /// Check value ranges of every setting and table
    pub fn validate(&self) -> Result<()> {
        let fill_factor = self.fill_factor.value;
        if !(fill_factor.is_finite() && fill_factor > 0.0 && fill_factor <= 1.0) {
            return Err(CdwError::config_invalid(
                "fill_factor",
                format!("must be in (0, 1], got {}", fill_factor),
            ));
        }

        let disposal_fraction = self.disposal_fraction.value;
        if !(0.0..=1.0).contains(&disposal_fraction) {
            return Err(CdwError::config_invalid(
                "disposal_fraction",
                format!("must be in [0, 1], got {}", disposal_fraction),
            ));
        }

        let meters_per_mile = self.meters_per_mile.value;
        if !(meters_per_mile.is_finite() && meters_per_mile > 0.0) {
            return Err(CdwError::config_invalid(
                "meters_per_mile",
                format!("must be positive, got {}", meters_per_mile),
            ));
        }

        self.layers.validate()?;
        self.coefficients.validate()?;

        for (borough, composition) in &self.borough_compositions {
            let total = composition.total();
            if (total - 1.0).abs() > 1e-6 || composition.iter().any(|(_, f)| f < 0.0) {
                return Err(CdwError::config_invalid(
                    format!("borough_compositions.{}", borough),
                    format!("fractions must be non-negative and sum to 1, got {}", total),
                ));
            }
        }

        Ok(())
    }

    /// Dataset file paths resolved against the configured data directory
    pub fn dataset_paths(&self) -> DatasetFiles {
        self.datasets.resolve(&self.data_dir.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "data_dir".to_string(),
            (self.data_dir.value.display().to_string(), self.data_dir.source),
        );

        map.insert(
            "fill_factor".to_string(),
            (self.fill_factor.value.to_string(), self.fill_factor.source),
        );

        map.insert(
            "disposal_fraction".to_string(),
            (self.disposal_fraction.value.to_string(), self.disposal_fraction.source),
        );

        map.insert(
            "meters_per_mile".to_string(),
            (self.meters_per_mile.value.to_string(), self.meters_per_mile.source),
        );

        map.insert(
            "composition_mode".to_string(),
            (format!("{:?}", self.composition_mode.value), self.composition_mode.source),
        );

        map.insert(
            "strict_routes".to_string(),
            (self.strict_routes.value.to_string(), self.strict_routes.source),
        );

        map
    }
}

fn env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a number", key, raw);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    fill_factor: Option<f64>,
    disposal_fraction: Option<f64>,
    meters_per_mile: Option<f64>,
    composition_mode: Option<CompositionMode>,
    strict_routes: Option<bool>,
    coefficients: Option<CoefficientsFile>,
    layers: Option<Vec<Layer>>,
    borough_compositions: Option<BTreeMap<String, BTreeMap<String, f64>>>,
    datasets: Option<DatasetFilesFile>,
}

/// Partial coefficient tables; present entries override the defaults
#[derive(Debug, Default, Deserialize, Serialize)]
struct CoefficientsFile {
    #[serde(default)]
    production: BTreeMap<String, f64>,
    #[serde(default)]
    densities: BTreeMap<String, f64>,
    excavator_per_hour: Option<f64>,
    bulldozer_per_hour: Option<f64>,
    transport_per_ton_mile: Option<f64>,
    landfill_per_ton: Option<f64>,
    recycling_per_ton: Option<f64>,
    excavator_hours_per_m3: Option<f64>,
    bulldozer_hours_per_m3: Option<f64>,
}

impl CoefficientsFile {
    fn merge_into(self, target: &mut EmissionCoefficients) {
        target.production.extend(self.production);
        target.densities.extend(self.densities);

        let scalars = [
            (self.excavator_per_hour, &mut target.excavator_per_hour),
            (self.bulldozer_per_hour, &mut target.bulldozer_per_hour),
            (self.transport_per_ton_mile, &mut target.transport_per_ton_mile),
            (self.landfill_per_ton, &mut target.landfill_per_ton),
            (self.recycling_per_ton, &mut target.recycling_per_ton),
            (self.excavator_hours_per_m3, &mut target.equipment.excavator_hours_per_m3),
            (self.bulldozer_hours_per_m3, &mut target.equipment.bulldozer_hours_per_m3),
        ];
        for (value, slot) in scalars {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct DatasetFilesFile {
    boroughs: Option<PathBuf>,
    census_blocks: Option<PathBuf>,
    transfer_routes: Option<PathBuf>,
    landfill_routes: Option<PathBuf>,
}

impl DatasetFilesFile {
    fn merge_into(self, target: &mut DatasetFiles) {
        if let Some(path) = self.boroughs {
            target.boroughs = path;
        }
        if let Some(path) = self.census_blocks {
            target.census_blocks = path;
        }
        if let Some(path) = self.transfer_routes {
            target.transfer_routes = path;
        }
        if let Some(path) = self.landfill_routes {
            target.landfill_routes = path;
        }
    }
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub fill_factor: Option<f64>,
    pub disposal_fraction: Option<f64>,
    pub meters_per_mile: Option<f64>,
    pub composition_mode: Option<CompositionMode>,
    pub strict_routes: Option<bool>,
}

/// Parse composition mode from string
pub fn parse_composition_mode(s: &str) -> Result<CompositionMode> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "layered" | "layers" => Ok(CompositionMode::Layered),
        "borough_table" | "borough" => Ok(CompositionMode::BoroughTable),
        _ => Err(CdwError::ConfigInvalid {
            key: "composition_mode".to_string(),
            reason: format!("Invalid composition mode: {}. Use layered or borough_table", s),
        }),
    }
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CdwError::config_invalid("bool", format!("Invalid boolean: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.fill_factor.value, 0.8);
        assert_eq!(config.fill_factor.source, ConfigSource::Default);
        assert_eq!(config.disposal_fraction.value, 0.1);
        assert_eq!(config.meters_per_mile.value, 1609.34);
        assert_eq!(config.composition_mode.value, CompositionMode::Layered);
        assert!(!config.strict_routes.value);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/cdw"
fill_factor = 0.75
composition_mode = "borough_table"
strict_routes = true

[coefficients]
transport_per_ton_mile = 0.2
production = {{ brick = 150.0 }}
densities = {{ brick = 1.9 }}

[[layers]]
material = "asphalt"
thickness = 0.1

[[layers]]
material = "brick"
thickness = 0.2

[datasets]
census_blocks = "blocks.geojson"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/srv/cdw"));
        assert_eq!(config.fill_factor.value, 0.75);
        assert_eq!(config.fill_factor.source, ConfigSource::File);
        assert_eq!(config.composition_mode.value, CompositionMode::BoroughTable);
        assert!(config.strict_routes.value);
        assert_eq!(config.coefficients.transport_per_ton_mile, 0.2);
        assert_eq!(config.coefficients.production_factor("brick"), Some(150.0));
        // Untouched defaults survive the merge
        assert_eq!(config.coefficients.production_factor("concrete"), Some(120.0));
        assert_eq!(config.layers.layers().len(), 2);
        assert_eq!(config.layers.layers()[1].material, "brick");
        assert_eq!(
            config.dataset_paths().census_blocks,
            PathBuf::from("/srv/cdw/blocks.geojson")
        );
        assert_eq!(
            config.dataset_paths().boroughs,
            PathBuf::from("/srv/cdw/Borough_Boundaries.geojson")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            fill_factor: Some(0.9),
            strict_routes: Some(true),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.fill_factor.value, 0.9);
        assert_eq!(config.fill_factor.source, ConfigSource::Cli);
        assert!(config.strict_routes.value);
        assert_eq!(config.disposal_fraction.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = LayeredConfig::with_defaults();
        config.fill_factor.update(1.5, ConfigSource::Cli);
        assert!(config.validate().is_err());

        let mut config = LayeredConfig::with_defaults();
        config.disposal_fraction.update(-0.1, ConfigSource::Cli);
        assert!(config.validate().is_err());

        let mut config = LayeredConfig::with_defaults();
        config.meters_per_mile.update(0.0, ConfigSource::Cli);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbalanced_borough_table() {
        let mut config = LayeredConfig::with_defaults();
        config
            .borough_compositions
            .insert("Queens".to_string(), WasteComposition::from_pairs([("dirt", 0.7)]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_composition_mode() {
        assert_eq!(parse_composition_mode("layered").unwrap(), CompositionMode::Layered);
        assert_eq!(parse_composition_mode("Borough-Table").unwrap(), CompositionMode::BoroughTable);
        assert!(parse_composition_mode("random").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 6);
        let (fill, source) = &map["fill_factor"];
        assert_eq!(fill, "0.8");
        assert_eq!(*source, ConfigSource::Default);
    }
}
