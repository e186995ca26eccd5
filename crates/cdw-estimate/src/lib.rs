//! CDW Estimate - Excavation emissions pipeline
//!
//! Each request runs Locate → Compose → Route → Calculate against the shared
//! read-only spatial index and coefficient tables.

pub mod composition;
pub mod emissions;
pub mod models;
pub mod pipeline;
pub mod routing;

pub use composition::{resolve_composition, CompositionResolver};
pub use emissions::{compute_emissions, EmissionsCalculator};
pub use models::{Estimate, EstimatorSettings, ExcavationRequest};
pub use pipeline::Estimator;
pub use routing::RoutingResolver;
