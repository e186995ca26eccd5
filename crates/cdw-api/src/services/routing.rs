use async_trait::async_trait;
use cdw_core::error::{CdwError, Result};
use cdw_core::models::Point;
use cdw_core::ports::RouteFetcher;
use serde::Deserialize;

const SERVICE: &str = "OSRM";

/// Road routes from an OSRM server
pub struct OsrmRouteFetcher {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    geometry: RouteGeometry,
}

#[derive(Debug, Deserialize)]
struct RouteGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteFetcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn route_url(&self, from: Point, to: Point) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?geometries=geojson",
            self.base_url.trim_end_matches('/'),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }
}

/// Coordinates of the first route, empty unless OSRM answered `Ok`
fn first_route(response: RouteResponse) -> Vec<[f64; 2]> {
    if response.code != "Ok" {
        tracing::debug!(code = %response.code, "OSRM found no route");
        return Vec::new();
    }
    response
        .routes
        .into_iter()
        .next()
        .map(|r| r.geometry.coordinates)
        .unwrap_or_default()
}

#[async_trait]
impl RouteFetcher for OsrmRouteFetcher {
    async fn fetch_route(&self, from: Point, to: Point) -> Result<Vec<[f64; 2]>> {
        let unavailable = |e: reqwest::Error| CdwError::ServiceUnavailable {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        };

        // OSRM reports "no route" with a 400 and a JSON body, so the status is not checked
        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .await
            .map_err(unavailable)?;

        let body: RouteResponse = response.json().await.map_err(unavailable)?;
        Ok(first_route(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_is_lon_lat() {
        let fetcher = OsrmRouteFetcher::new(reqwest::Client::new(), "http://localhost:5000/");
        let url = fetcher.route_url(Point::new(-73.97, 40.78), Point::new(-73.94, 40.8));
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/driving/-73.97,40.78;-73.94,40.8?geometries=geojson"
        );
    }

    #[test]
    fn test_first_route() {
        let ok: RouteResponse = serde_json::from_str(
            r#"{"code": "Ok", "routes": [{"geometry": {"type": "LineString", "coordinates": [[-73.97, 40.78], [-73.94, 40.8]]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_route(ok), vec![[-73.97, 40.78], [-73.94, 40.8]]);

        let no_route: RouteResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "message": "Impossible route"}"#).unwrap();
        assert!(first_route(no_route).is_empty());
    }
}
