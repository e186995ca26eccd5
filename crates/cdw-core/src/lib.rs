//! CDW Core - Domain models, configuration and dataset loading
//!
//! This crate contains the shared domain types, the layered configuration,
//! the dataset readers and the port definitions for the excavation emissions estimator.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ports;
pub mod transform;

pub use error::{CdwError, ErrorKind, Result};
