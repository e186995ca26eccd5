use cdw_core::models::{EmissionsBreakdown, Point, WasteComposition};
use cdw_estimate::Estimate;
use serde::Serialize;

/// Name shown for every transfer station on the map
const TRANSFER_STATION_NAME: &str = "Closest CDW Transfer Station";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: "cdw-api".to_string(),
        }
    }
}

/// Position in the `{lat, lng}` shape the map client expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<Point> for LatLng {
    fn from(point: Point) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferStationInfo {
    pub id: String,
    pub name: String,
    pub location: Option<LatLng>,
}

/// Calculate response: the breakdown fields at top level plus routing metadata
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    #[serde(flatten)]
    pub breakdown: EmissionsBreakdown,
    /// Distance to the transfer station in miles
    pub ts_distance: f64,
    /// Distance from the transfer station to the landfill in miles
    pub landfill_distance: f64,
    pub transfer_station: TransferStationInfo,
    /// Road path to the transfer station as `[lng, lat]` pairs
    pub route_coords: Vec<[f64; 2]>,
    pub borough: String,
    pub census_block: String,
    pub composition: WasteComposition,
    pub volume: f64,
}

impl CalculateResponse {
    pub fn new(estimate: Estimate, route_coords: Vec<[f64; 2]>) -> Self {
        let Estimate {
            breakdown,
            route,
            borough,
            census_block,
            composition,
            volume,
        } = estimate;

        Self {
            breakdown,
            ts_distance: route.transfer_cost,
            landfill_distance: route.landfill_cost,
            transfer_station: TransferStationInfo {
                id: route.transfer_station,
                name: TRANSFER_STATION_NAME.to_string(),
                location: route.station_location.map(LatLng::from),
            },
            route_coords,
            borough,
            census_block,
            composition,
            volume,
        }
    }
}
