use cdw_core::error::{CdwError, Result};
use cdw_core::models::{LandfillRoute, RouteResult};
use cdw_geo::SpatialIndex;

/// Resolves the disposal chain census block → transfer station → landfill
#[derive(Debug, Clone, Copy)]
pub struct RoutingResolver<'a> {
    index: &'a SpatialIndex,
    meters_per_mile: f64,
    strict: bool,
}

impl<'a> RoutingResolver<'a> {
    pub fn new(index: &'a SpatialIndex, meters_per_mile: f64) -> Self {
        Self {
            index,
            meters_per_mile,
            strict: false,
        }
    }

    /// Fail on census blocks with several transfer routes instead of taking the first
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn resolve_route(&self, geoid: &str) -> Result<RouteResult> {
        let transfers = self.index.transfer_routes_for(geoid);

        let transfer = match transfers {
            [] => {
                return Err(CdwError::NoTransferRoute {
                    geoid: geoid.to_string(),
                })
            }
            [only] => only,
            [first, ..] => {
                if self.strict {
                    return Err(CdwError::AmbiguousTransferRoute {
                        geoid: geoid.to_string(),
                        count: transfers.len(),
                    });
                }
                tracing::warn!(
                    geoid = %geoid,
                    count = transfers.len(),
                    station = %first.station_id,
                    "Census block has several transfer routes, using the first loaded"
                );
                first
            }
        };

        let station = transfer.station_id.as_str();
        let landfill = cheapest_landfill(self.index.landfill_routes_for(station)).ok_or_else(|| {
            CdwError::NoLandfillRoute {
                station: station.to_string(),
            }
        })?;

        let route = RouteResult {
            transfer_station: station.to_string(),
            station_location: transfer.station_location(),
            transfer_cost: transfer.cost_meters / self.meters_per_mile,
            landfill_cost: landfill.cost_meters / self.meters_per_mile,
            landfill: landfill.landfill_id.clone(),
        };

        tracing::debug!(
            geoid = %geoid,
            station = %route.transfer_station,
            transfer_miles = route.transfer_cost,
            landfill_miles = route.landfill_cost,
            "Resolved disposal route"
        );

        Ok(route)
    }
}

/// Lowest-cost row; ties keep the first in load order
fn cheapest_landfill(routes: &[LandfillRoute]) -> Option<&LandfillRoute> {
    let mut best: Option<&LandfillRoute> = None;
    for route in routes {
        if best.map_or(true, |b| route.cost_meters < b.cost_meters) {
            best = Some(route);
        }
    }
    best
}
