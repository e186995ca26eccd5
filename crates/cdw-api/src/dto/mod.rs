mod request;
mod response;

pub use request::{CalculateRequest, GeocodeRequest, LocationInput};
pub use response::{CalculateResponse, HealthResponse, LatLng, TransferStationInfo};
