pub mod coefficients;
pub mod composition;
pub mod emissions;
pub mod geometry;
pub mod routing;

pub use coefficients::{EmissionCoefficients, EquipmentRates};
pub use composition::{
    default_borough_compositions, CompositionMode, Layer, LayerProfile, WasteComposition,
    DEFAULT_FALLBACK_MATERIAL,
};
pub use emissions::EmissionsBreakdown;
pub use geometry::{parse_lat_lon, DeclaredCrs, Geometry, GeometryType, Point, WGS84_EPSG};
pub use routing::{BoroughRecord, CensusBlockRecord, LandfillRoute, RouteResult, TransferRoute};
