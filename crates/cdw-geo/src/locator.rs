use cdw_core::error::{CdwError, Result};
use cdw_core::models::Point;

use crate::tables::SpatialIndex;

/// Borough name reported for points outside every borough
pub const UNKNOWN_BOROUGH: &str = "Unknown";

/// Point-in-region lookups against a [`SpatialIndex`]
#[derive(Debug, Clone, Copy)]
pub struct GeospatialLocator<'a> {
    index: &'a SpatialIndex,
}

impl<'a> GeospatialLocator<'a> {
    pub fn new(index: &'a SpatialIndex) -> Self {
        Self { index }
    }

    /// Name of the borough containing the point, or `"Unknown"`
    pub fn locate_borough(&self, point: Point) -> String {
        match self.index.boroughs().locate(point) {
            Some(name) => name.clone(),
            None => {
                tracing::debug!(lng = point.lng, lat = point.lat, "Point is outside every borough");
                UNKNOWN_BOROUGH.to_string()
            }
        }
    }

    /// GEOID of the census block containing the point
    pub fn locate_census_block(&self, point: Point) -> Result<String> {
        self.index
            .census_blocks()
            .locate(point)
            .cloned()
            .ok_or(CdwError::OutsideCoverage {
                lon: point.lng,
                lat: point.lat,
            })
    }
}
