//! Region records and the disposal routing tables

use crate::models::geometry::{Geometry, Point};
use serde::{Deserialize, Serialize};

/// Named borough boundary
#[derive(Debug, Clone, PartialEq)]
pub struct BoroughRecord {
    pub name: String,
    pub geometry: Geometry,
}

/// Census block boundary keyed by GEOID
#[derive(Debug, Clone, PartialEq)]
pub struct CensusBlockRecord {
    pub geoid: String,
    pub geometry: Geometry,
}

/// Precomputed path from a census block to its transfer station
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRoute {
    pub origin_geoid: String,
    pub station_id: String,
    /// Travel cost in meters
    pub cost_meters: f64,
    /// Path geometry; its final vertex is the transfer station
    pub path: Option<Geometry>,
}

impl TransferRoute {
    pub fn station_location(&self) -> Option<Point> {
        self.path.as_ref().and_then(Geometry::last_coordinate)
    }
}

/// One row of the transfer-station to landfill cost table
#[derive(Debug, Clone, PartialEq)]
pub struct LandfillRoute {
    pub station_id: String,
    pub landfill_id: Option<String>,
    /// Travel cost in meters
    pub cost_meters: f64,
}

/// Resolved disposal chain for one census block, costs in miles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub transfer_station: String,
    pub station_location: Option<Point>,
    pub transfer_cost: f64,
    pub landfill_cost: f64,
    pub landfill: Option<String>,
}
