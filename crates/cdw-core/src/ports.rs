//! Port trait definitions
//!
//! These traits define the interfaces that the external service adapters must implement.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Point;

/// Port for turning a free-form location query into a position
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a query to a position.
    ///
    /// Returns `Ok(None)` when the service knows no match for the query.
    async fn geocode(&self, query: &str) -> Result<Option<Point>>;
}

/// Port for fetching a drivable road path between two positions
#[async_trait]
pub trait RouteFetcher: Send + Sync {
    /// Coordinates of the road path as `[lng, lat]` pairs, empty when no route exists
    async fn fetch_route(&self, from: Point, to: Point) -> Result<Vec<[f64; 2]>>;
}
