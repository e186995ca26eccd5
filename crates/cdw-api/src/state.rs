use cdw_core::ports::{Geocoder, RouteFetcher};
use cdw_estimate::Estimator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub estimator: Estimator,
    pub geocoder: Arc<dyn Geocoder>,
    pub route_fetcher: Arc<dyn RouteFetcher>,
}

impl AppState {
    pub fn new(
        estimator: Estimator,
        geocoder: Arc<dyn Geocoder>,
        route_fetcher: Arc<dyn RouteFetcher>,
    ) -> Self {
        Self {
            estimator,
            geocoder,
            route_fetcher,
        }
    }
}
