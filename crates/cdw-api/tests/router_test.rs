//! Router tests over an in-memory index with stubbed external services

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cdw_api::{create_router, AppState};
use cdw_core::config::{ConfigSource, LayeredConfig};
use cdw_core::error::{CdwError, Result};
use cdw_core::formats::DatasetBundle;
use cdw_core::models::{
    BoroughRecord, CensusBlockRecord, CompositionMode, Geometry, LandfillRoute, Point, TransferRoute,
};
use cdw_core::ports::{Geocoder, RouteFetcher};
use cdw_estimate::Estimator;
use cdw_geo::SpatialIndex;
use serde_json::{json, Value};
use tower::ServiceExt;

struct FakeGeocoder;

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Point>> {
        Ok(match query {
            "Central Park" => Some(Point::new(-73.97, 40.78)),
            _ => None,
        })
    }
}

struct FakeRouteFetcher {
    available: bool,
}

#[async_trait]
impl RouteFetcher for FakeRouteFetcher {
    async fn fetch_route(&self, from: Point, to: Point) -> Result<Vec<[f64; 2]>> {
        if !self.available {
            return Err(CdwError::ServiceUnavailable {
                service: "OSRM".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(vec![[from.lng, from.lat], [to.lng, to.lat]])
    }
}

fn bundle() -> DatasetBundle {
    DatasetBundle {
        boroughs: vec![BoroughRecord {
            name: "Manhattan".to_string(),
            geometry: Geometry::rect([-74.02, 40.70], [-73.91, 40.88]),
        }],
        census_blocks: vec![CensusBlockRecord {
            geoid: "360610001001".to_string(),
            geometry: Geometry::rect([-74.00, 40.75], [-73.95, 40.80]),
        }],
        transfer_routes: vec![TransferRoute {
            origin_geoid: "360610001001".to_string(),
            station_id: "TS-7".to_string(),
            cost_meters: 3218.68,
            path: Some(Geometry::line_string(vec![[-73.97, 40.78], [-73.94, 40.80]])),
        }],
        landfill_routes: vec![
            LandfillRoute {
                station_id: "TS-7".to_string(),
                landfill_id: Some("LF-A".to_string()),
                cost_meters: 32186.8,
            },
            LandfillRoute {
                station_id: "TS-7".to_string(),
                landfill_id: Some("LF-B".to_string()),
                cost_meters: 16093.4,
            },
        ],
    }
}

fn app(route_available: bool) -> Router {
    let mut config = LayeredConfig::with_defaults();
    config.composition_mode.update(CompositionMode::BoroughTable, ConfigSource::Cli);

    let index = Arc::new(SpatialIndex::from_bundle(bundle()));
    let estimator = Estimator::from_config(index, &config).unwrap();

    let state = AppState::new(
        estimator,
        Arc::new(FakeGeocoder),
        Arc::new(FakeRouteFetcher {
            available: route_available,
        }),
    );
    create_router(Arc::new(state))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!((actual - expected).abs() < 1e-6, "expected {}, got {}", expected, actual);
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(true).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_calculate_with_coordinates() {
    let (status, body) = post_json(
        app(true),
        "/calculate",
        json!({"location": {"lat": 40.78, "lng": -73.97}, "length": 10, "width": 10, "depth": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_close(&body["total"], 3948.26);
    assert_close(&body["emissions_production"], 2920.0);
    assert_close(&body["emissions_transport_to_recycling"], 41.64);
    assert_close(&body["ts_distance"], 2.0);
    assert_close(&body["landfill_distance"], 10.0);
    assert_close(&body["volume"], 80.0);
    assert_eq!(body["borough"], "Manhattan");
    assert_eq!(body["census_block"], "360610001001");
    assert_eq!(body["transfer_station"]["id"], "TS-7");
    assert_eq!(body["transfer_station"]["name"], "Closest CDW Transfer Station");
    assert_close(&body["transfer_station"]["location"]["lat"], 40.80);
    assert_eq!(body["route_coords"], json!([[-73.97, 40.78], [-73.94, 40.80]]));
}

#[tokio::test]
async fn test_calculate_with_geocoded_query() {
    let (status, body) = post_json(
        app(true),
        "/calculate",
        json!({"location": "Central Park", "length": 10, "width": 10, "depth": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["census_block"], "360610001001");
}

#[tokio::test]
async fn test_route_service_failure_leaves_route_empty() {
    let (status, body) = post_json(
        app(false),
        "/calculate",
        json!({"location": {"lat": 40.78, "lng": -73.97}, "length": 10, "width": 10, "depth": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route_coords"], json!([]));
    assert_close(&body["total"], 3948.26);
}

#[tokio::test]
async fn test_calculate_error_statuses() {
    let (status, body) = post_json(
        app(true),
        "/calculate",
        json!({"location": {"lat": 40.78, "lng": -73.97}, "length": 10, "width": 10, "depth": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");

    let (status, body) = post_json(
        app(true),
        "/calculate",
        json!({"location": {"lat": 40.60, "lng": -73.50}, "length": 10, "width": 10, "depth": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Location is outside the covered area");

    let (status, _) = post_json(
        app(true),
        "/calculate",
        json!({"location": "Atlantis", "length": 10, "width": 10, "depth": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let cases = [
        json!({"length": 10, "width": 10, "depth": 1}),
        json!({"location": {"lat": 40.78}, "length": 10, "width": 10, "depth": 1}),
        json!({"location": "Central Park", "length": "ten"}),
    ];

    for request in cases {
        let (status, body) = post_json(app(true), "/calculate", request.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", request);
        assert_eq!(body["error"], "Invalid input");
        assert!(body["details"].is_string());
    }

    let (status, body) = post_json(app(true), "/geocode", json!({"q": "Central Park"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");

    // Not JSON at all
    let request = Request::builder()
        .method("POST")
        .uri("/calculate")
        .header("content-type", "application/json")
        .body(Body::from("{\"location\": "))
        .unwrap();
    let response = app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn test_text_dimensions_are_numbers() {
    let (status, body) = post_json(
        app(true),
        "/calculate",
        json!({"location": {"lat": 40.78, "lng": -73.97}, "length": "10", "width": "10", "depth": "1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_close(&body["volume"], 80.0);
    assert_close(&body["total"], 3948.26);
}

#[tokio::test]
async fn test_geocode() {
    let (status, body) = post_json(app(true), "/geocode", json!({"query": "Central Park"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"lat": 40.78, "lng": -73.97}));

    let (status, body) = post_json(app(true), "/geocode", json!({"query": "Atlantis"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "Atlantis");
}
