//! The shared, read-only lookup structure built once from the datasets

use cdw_core::formats::{DatasetBundle, DatasetSummary};
use cdw_core::models::{LandfillRoute, TransferRoute};
use std::collections::HashMap;

use crate::index::PolygonIndex;

/// Borough and census block indexes plus the routing tables.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    boroughs: PolygonIndex<String>,
    census_blocks: PolygonIndex<String>,
    /// Rows per origin GEOID, in load order
    transfer_routes: HashMap<String, Vec<TransferRoute>>,
    /// Rows per transfer station, in load order
    landfill_routes: HashMap<String, Vec<LandfillRoute>>,
    summary: DatasetSummary,
}

impl SpatialIndex {
    pub fn from_bundle(bundle: DatasetBundle) -> Self {
        let summary = bundle.summary();

        let boroughs =
            PolygonIndex::from_regions(bundle.boroughs.into_iter().map(|b| (b.name, b.geometry)));
        let census_blocks = PolygonIndex::from_regions(
            bundle.census_blocks.into_iter().map(|c| (c.geoid, c.geometry)),
        );

        let mut transfer_routes: HashMap<String, Vec<TransferRoute>> = HashMap::new();
        for route in bundle.transfer_routes {
            transfer_routes.entry(route.origin_geoid.clone()).or_default().push(route);
        }

        let mut landfill_routes: HashMap<String, Vec<LandfillRoute>> = HashMap::new();
        for route in bundle.landfill_routes {
            landfill_routes.entry(route.station_id.clone()).or_default().push(route);
        }

        let ambiguous = transfer_routes.values().filter(|rows| rows.len() > 1).count();
        if ambiguous > 0 {
            tracing::warn!(census_blocks = ambiguous, "Census blocks with more than one transfer route");
        }

        tracing::debug!(
            boroughs = boroughs.len(),
            census_blocks = census_blocks.len(),
            origins = transfer_routes.len(),
            stations = landfill_routes.len(),
            "Built spatial index"
        );

        Self {
            boroughs,
            census_blocks,
            transfer_routes,
            landfill_routes,
            summary,
        }
    }

    pub fn boroughs(&self) -> &PolygonIndex<String> {
        &self.boroughs
    }

    pub fn census_blocks(&self) -> &PolygonIndex<String> {
        &self.census_blocks
    }

    /// Transfer routes leaving a census block, in load order
    pub fn transfer_routes_for(&self, geoid: &str) -> &[TransferRoute] {
        self.transfer_routes.get(geoid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Landfill routes leaving a transfer station, in load order
    pub fn landfill_routes_for(&self, station: &str) -> &[LandfillRoute] {
        self.landfill_routes.get(station).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record counts of the datasets this index was built from
    pub fn summary(&self) -> DatasetSummary {
        self.summary
    }
}
