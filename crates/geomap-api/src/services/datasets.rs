use geomap_core::error::Result;
use geomap_core::formats::FileSummary;

use super::paths::resolve_data_path;
use crate::state::AppState;

/// Service for inspecting files in the data directory
pub struct DatasetService;

impl DatasetService {
    /// Read a vector or raster file and summarize it
    pub async fn describe(state: &AppState, dataset: &str) -> Result<FileSummary> {
        let path = resolve_data_path(state.config.data_dir(), dataset)?;
        let data = state.registry.read(&path).await?;
        Ok(data.summary())
    }
}
