use std::sync::Arc;

use anyhow::Context;
use cdw_core::config::LayeredConfig;
use cdw_estimate::Estimator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdw_api::services::{OsrmRouteFetcher, TrueWayGeocoder};
use cdw_api::{cors_layer, create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdw_api=info,cdw_estimate=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    tracing::info!(
        port = config.port,
        osrm_url = %config.osrm_url,
        geocoder_key_set = config.geocoder.api_key.is_some(),
        "Starting CDW emissions API server"
    );

    let mut estimator_config = LayeredConfig::with_defaults();
    if let Some(path) = &config.config_path {
        estimator_config = estimator_config
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }
    let estimator_config = estimator_config.load_from_env();

    let estimator = Estimator::load(&estimator_config)
        .await
        .context("Failed to load datasets")?;

    let summary = estimator.index().summary();
    tracing::info!(
        boroughs = summary.boroughs,
        census_blocks = summary.census_blocks,
        transfer_routes = summary.transfer_routes,
        landfill_routes = summary.landfill_routes,
        "Datasets loaded"
    );

    if config.geocoder.api_key.is_none() {
        tracing::warn!("CDW_GEOCODER_API_KEY not set; only \"lat,lon\" locations can be geocoded");
    }

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let state = Arc::new(AppState::new(
        estimator,
        Arc::new(TrueWayGeocoder::new(client.clone(), config.geocoder.clone())),
        Arc::new(OsrmRouteFetcher::new(client, config.osrm_url.clone())),
    ));

    let app = create_router(state).layer(cors_layer(&config)?);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
