use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::dto::{CalculateRequest, CalculateResponse};
use crate::error::ApiError;
use crate::services::CalculateService;
use crate::state::AppState;

pub async fn handle_calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        location = ?request.location,
        length = request.length,
        width = request.width,
        depth = request.depth,
        "Processing calculate request"
    );

    let response = CalculateService::execute(&state, request).await?;

    Ok(Json(response))
}
