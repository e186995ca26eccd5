use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::dto::{GeocodeRequest, LatLng};
use crate::error::ApiError;
use crate::state::AppState;

/// Geocode a free-text location for the map search box
pub async fn handle_geocode(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<LatLng>, ApiError> {
    let Json(request) = payload?;

    tracing::debug!(query = %request.query, "Processing geocode request");

    let point = state
        .geocoder
        .geocode(&request.query)
        .await?
        .ok_or_else(|| ApiError::not_found("Location not found").with_details(request.query.clone()))?;

    Ok(Json(LatLng::from(point)))
}
