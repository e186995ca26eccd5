use cdw_core::models::Point;
use cdw_estimate::ExcavationRequest;

use crate::dto::{CalculateRequest, CalculateResponse, LocationInput};
use crate::error::ApiError;
use crate::state::AppState;

/// Service for estimating excavation emissions
pub struct CalculateService;

impl CalculateService {
    /// Resolve the location, run the estimate and attach the road route to the station
    pub async fn execute(state: &AppState, request: CalculateRequest) -> Result<CalculateResponse, ApiError> {
        let location = Self::resolve_location(state, &request.location).await?;
        let excavation = ExcavationRequest::new(location, request.length, request.width, request.depth);

        // Point-in-polygon lookups are CPU bound
        let estimator = state.estimator.clone();
        let estimate = tokio::task::spawn_blocking(move || estimator.estimate(&excavation))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Estimate task failed");
                ApiError::internal("Estimate failed").with_details(e.to_string())
            })??;

        let route_coords = match estimate.route.station_location {
            Some(station) => match state.route_fetcher.fetch_route(location, station).await {
                Ok(coords) => coords,
                Err(e) => {
                    tracing::warn!(error = %e, "Route to transfer station unavailable");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        tracing::info!(
            borough = %estimate.borough,
            census_block = %estimate.census_block,
            total = estimate.breakdown.total,
            "Estimate complete"
        );

        Ok(CalculateResponse::new(estimate, route_coords))
    }

    async fn resolve_location(state: &AppState, location: &LocationInput) -> Result<Point, ApiError> {
        match location {
            LocationInput::Coordinates { lat, lng } => Ok(Point::new(*lng, *lat)),
            LocationInput::Query(query) => state
                .geocoder
                .geocode(query)
                .await?
                .ok_or_else(|| ApiError::not_found("Location not found").with_details(query.clone())),
        }
    }
}
