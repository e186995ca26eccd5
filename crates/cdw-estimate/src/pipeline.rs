use cdw_core::config::LayeredConfig;
use cdw_core::error::{CdwError, Result};
use cdw_core::formats::DatasetLoader;
use cdw_core::models::{EmissionCoefficients, DEFAULT_FALLBACK_MATERIAL};
use cdw_geo::{GeospatialLocator, SpatialIndex};
use std::sync::Arc;

use crate::composition::CompositionResolver;
use crate::emissions::EmissionsCalculator;
use crate::models::{Estimate, EstimatorSettings, ExcavationRequest};
use crate::routing::RoutingResolver;

/// Estimation pipeline over the shared spatial index and coefficient tables.
///
/// Cheap to clone; clones share the index and tables.
#[derive(Debug, Clone)]
pub struct Estimator {
    index: Arc<SpatialIndex>,
    coefficients: Arc<EmissionCoefficients>,
    settings: Arc<EstimatorSettings>,
}

impl Estimator {
    /// Create an estimator, rejecting coefficient tables that do not cover
    /// every material a composition can name
    pub fn new(
        index: Arc<SpatialIndex>,
        coefficients: Arc<EmissionCoefficients>,
        settings: EstimatorSettings,
    ) -> Result<Self> {
        coefficients.validate()?;
        settings.layers.validate()?;

        let materials = settings
            .layers
            .materials()
            .chain(std::iter::once(DEFAULT_FALLBACK_MATERIAL))
            .chain(settings.borough_compositions.values().flat_map(|c| c.materials()));

        let missing = coefficients.missing_materials(materials);
        if !missing.is_empty() {
            return Err(CdwError::config_invalid(
                "coefficients",
                format!("no production factor or density for: {}", missing.join(", ")),
            ));
        }

        Ok(Self {
            index,
            coefficients,
            settings: Arc::new(settings),
        })
    }

    /// Build an estimator from configuration over an already loaded index
    pub fn from_config(index: Arc<SpatialIndex>, config: &LayeredConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            index,
            Arc::new(config.coefficients.clone()),
            EstimatorSettings::from_config(config),
        )
    }

    /// Load the configured datasets and build an estimator over them
    pub async fn load(config: &LayeredConfig) -> Result<Self> {
        config.validate()?;
        let bundle = DatasetLoader::new().load(&config.dataset_paths()).await?;
        Self::from_config(Arc::new(SpatialIndex::from_bundle(bundle)), config)
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn coefficients(&self) -> &EmissionCoefficients {
        &self.coefficients
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    /// Run Locate → Compose → Route → Calculate for one excavation
    pub fn estimate(&self, request: &ExcavationRequest) -> Result<Estimate> {
        request.validate()?;
        let settings = &self.settings;

        let locator = GeospatialLocator::new(&self.index);
        let borough = locator.locate_borough(request.location);
        let census_block = locator.locate_census_block(request.location)?;
        tracing::debug!(borough = %borough, geoid = %census_block, "Located excavation");

        let composition = CompositionResolver::new(
            settings.composition_mode,
            &settings.layers,
            &settings.borough_compositions,
        )
        .resolve(request.depth, &borough)?;

        let route = RoutingResolver::new(&self.index, settings.meters_per_mile)
            .strict(settings.strict_routes)
            .resolve_route(&census_block)?;

        let volume = request.volume(settings.fill_factor);
        let breakdown = EmissionsCalculator::new(&self.coefficients, settings.disposal_fraction)
            .calculate(volume, &composition, &route);

        tracing::info!(
            borough = %borough,
            geoid = %census_block,
            station = %route.transfer_station,
            volume,
            total = breakdown.total,
            "Estimated excavation emissions"
        );

        Ok(Estimate {
            breakdown,
            route,
            borough,
            census_block,
            composition,
            volume,
        })
    }
}
