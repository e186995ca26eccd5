//! CDW Geo - Geometry conversion, spatial indexing and point location
//!
//! This crate turns the loaded boundary and routing records into the
//! read-only `SpatialIndex` shared by every estimate, and answers
//! point-in-region questions against it.

pub mod index;
pub mod locator;
pub mod models;
pub mod spatial;
pub mod tables;

pub use index::PolygonIndex;
pub use locator::{GeospatialLocator, UNKNOWN_BOROUGH};
pub use tables::SpatialIndex;
