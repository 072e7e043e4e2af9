mod datasets;
mod paths;
mod query;
mod raster;

pub use datasets::DatasetService;
pub use paths::resolve_data_path;
pub use query::QueryService;
pub use raster::RasterService;
