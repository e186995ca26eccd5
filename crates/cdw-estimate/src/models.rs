use cdw_core::config::LayeredConfig;
use cdw_core::error::{CdwError, Result};
use cdw_core::models::{
    CompositionMode, EmissionsBreakdown, LayerProfile, Point, RouteResult, WasteComposition,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One excavation to estimate; dimensions in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExcavationRequest {
    pub location: Point,
    pub length: f64,
    pub width: f64,
    pub depth: f64,
}

impl ExcavationRequest {
    pub fn new(location: Point, length: f64, width: f64, depth: f64) -> Self {
        Self {
            location,
            length,
            width,
            depth,
        }
    }

    /// Depth must be positive; length and width may be zero
    pub fn validate(&self) -> Result<()> {
        if !self.location.is_valid() {
            return Err(CdwError::invalid_input(
                "location",
                format!("({}, {}) is not a WGS84 position", self.location.lng, self.location.lat),
            ));
        }

        for (field, value) in [("length", self.length), ("width", self.width)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CdwError::invalid_input(
                    field,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }

        if !self.depth.is_finite() || self.depth <= 0.0 {
            return Err(CdwError::invalid_input(
                "depth",
                format!("must be greater than zero, got {}", self.depth),
            ));
        }

        Ok(())
    }

    /// Excavated volume in m³ after the fill factor
    pub fn volume(&self, fill_factor: f64) -> f64 {
        self.length * self.width * self.depth * fill_factor
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub breakdown: EmissionsBreakdown,
    pub route: RouteResult,
    pub borough: String,
    pub census_block: String,
    pub composition: WasteComposition,
    /// Excavated volume in m³
    pub volume: f64,
}

/// Pipeline settings taken from the layered configuration
#[derive(Debug, Clone)]
pub struct EstimatorSettings {
    pub fill_factor: f64,
    pub disposal_fraction: f64,
    pub meters_per_mile: f64,
    pub composition_mode: CompositionMode,
    pub strict_routes: bool,
    pub layers: LayerProfile,
    pub borough_compositions: BTreeMap<String, WasteComposition>,
}

impl EstimatorSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            fill_factor: config.fill_factor.value,
            disposal_fraction: config.disposal_fraction.value,
            meters_per_mile: config.meters_per_mile.value,
            composition_mode: config.composition_mode.value,
            strict_routes: config.strict_routes.value,
            layers: config.layers.clone(),
            borough_compositions: config.borough_compositions.clone(),
        }
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self::from_config(&LayeredConfig::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_applies_fill_factor() {
        let request = ExcavationRequest::new(Point::new(-73.98, 40.75), 10.0, 5.0, 2.0);
        assert!(request.validate().is_ok());
        assert!((request.volume(0.8) - 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_footprint_is_allowed() {
        let request = ExcavationRequest::new(Point::new(-73.98, 40.75), 0.0, 0.0, 1.0);
        assert!(request.validate().is_ok());
        assert_eq!(request.volume(0.8), 0.0);
    }

    #[test]
    fn test_invalid_dimensions() {
        let point = Point::new(-73.98, 40.75);

        for request in [
            ExcavationRequest::new(point, 1.0, 1.0, 0.0),
            ExcavationRequest::new(point, 1.0, 1.0, -2.0),
            ExcavationRequest::new(point, -1.0, 1.0, 1.0),
            ExcavationRequest::new(point, 1.0, f64::NAN, 1.0),
            ExcavationRequest::new(Point::new(200.0, 40.0), 1.0, 1.0, 1.0),
        ] {
            let err = request.validate().unwrap_err();
            assert!(matches!(err, CdwError::InvalidInput { .. }), "{:?}", request);
        }
    }

    #[test]
    fn test_settings_from_defaults() {
        let settings = EstimatorSettings::default();
        assert_eq!(settings.fill_factor, 0.8);
        assert_eq!(settings.disposal_fraction, 0.1);
        assert_eq!(settings.composition_mode, CompositionMode::Layered);
        assert_eq!(settings.borough_compositions.len(), 5);
    }
}
