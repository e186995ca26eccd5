use async_trait::async_trait;
use cdw_core::error::{CdwError, Result};
use cdw_core::models::{parse_lat_lon, Point};
use cdw_core::ports::Geocoder;
use serde::Deserialize;

use crate::config::GeocoderConfig;

const SERVICE: &str = "TrueWay geocoding";

/// Geocoder backed by the TrueWay geocoding API.
///
/// Queries that already hold a `"lat,lon"` pair are answered locally.
pub struct TrueWayGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

impl TrueWayGeocoder {
    pub fn new(client: reqwest::Client, config: GeocoderConfig) -> Self {
        Self { client, config }
    }

    fn unavailable(reason: impl ToString) -> CdwError {
        CdwError::ServiceUnavailable {
            service: SERVICE.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for TrueWayGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Point>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CdwError::invalid_input("location", "query must not be empty"));
        }

        if let Some(point) = parse_lat_lon(query) {
            return Ok(Some(point));
        }

        let api_key = self.config.api_key.as_deref().ok_or_else(|| CdwError::ConfigMissing {
            key: "CDW_GEOCODER_API_KEY".to_string(),
        })?;

        let url = reqwest::Url::parse_with_params(
            &self.config.url,
            &[("address", query), ("language", "en")],
        )
        .map_err(|e| CdwError::config_invalid("CDW_GEOCODER_URL", e.to_string()))?;

        let host = url.host_str().unwrap_or_default().to_string();

        tracing::debug!(query = %query, "Geocoding location");

        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", host)
            .send()
            .await
            .map_err(Self::unavailable)?
            .error_for_status()
            .map_err(Self::unavailable)?;

        let body: GeocodeResponse = response.json().await.map_err(Self::unavailable)?;

        Ok(body
            .results
            .into_iter()
            .next()
            .map(|r| Point::new(r.location.lng, r.location.lat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_coordinates_are_parsed_locally() {
        // No API key: a network lookup would fail with ConfigMissing
        let geocoder = TrueWayGeocoder::new(reqwest::Client::new(), GeocoderConfig::default());

        let point = geocoder.geocode("40.78, -73.97").await.unwrap().unwrap();
        assert_eq!(point, Point::new(-73.97, 40.78));
    }

    #[tokio::test]
    async fn test_address_without_api_key() {
        let geocoder = TrueWayGeocoder::new(reqwest::Client::new(), GeocoderConfig::default());

        let err = geocoder.geocode("350 5th Ave, New York").await.unwrap_err();
        assert!(matches!(err, CdwError::ConfigMissing { .. }));
    }

    #[test]
    fn test_response_parsing() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"results": [{"address": "Empire State Building", "location": {"lat": 40.7484, "lng": -73.9857}}]}"#,
        )
        .unwrap();
        assert_eq!(body.results[0].location.lng, -73.9857);

        let empty: GeocodeResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
