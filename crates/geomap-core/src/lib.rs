//! geomap core - domain models, configuration, and file readers
//!
//! This crate contains the error taxonomy, layered configuration, the dataset/raster/style
//! models shared by the other geomap crates, and the format readers that load them.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod stats;

pub use error::{ErrorKind, GeomapError, RenderMode, Result};
