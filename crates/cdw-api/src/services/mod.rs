mod calculate;
mod geocoding;
mod routing;

pub use calculate::CalculateService;
pub use geocoding::TrueWayGeocoder;
pub use routing::OsrmRouteFetcher;
