mod datasets;
mod health;
mod query;
mod raster;

pub use datasets::describe_dataset;
pub use health::health_check;
pub use query::handle_query;
pub use raster::compute_raster_index;
