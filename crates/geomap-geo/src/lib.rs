//! geomap geo - geometry helpers, CRS transforms, and spectral indices
//!
//! This crate wraps the `geo` crate with the centroid and projection operations the
//! renderers need, and computes band-ratio indices over rasters.

pub mod models;
pub mod spectral;
pub mod transform;

pub use models::GeometryExt;
pub use spectral::{compute_index, compute_index_by_name};
pub use transform::{mercator_mean_center, normalize_to_wgs84, reproject_geometry, require_wgs84};
