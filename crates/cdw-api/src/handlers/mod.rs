mod calculate;
mod geocode;
mod health;

pub use calculate::handle_calculate;
pub use geocode::handle_geocode;
pub use health::health_check;
