use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/calculate", post(handlers::handle_calculate))
        .route("/geocode", post(handlers::handle_geocode))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured map client origin
pub fn cors_layer(config: &ApiConfig) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", config.cors_origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
