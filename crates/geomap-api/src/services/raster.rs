use geomap_core::models::IndexType;
use geomap_geo::compute_index;
use geomap_render::render_index;

use super::paths::resolve_data_path;
use crate::dto::{IndexRequest, IndexResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Service for spectral index computation
pub struct RasterService;

impl RasterService {
    /// Compute the requested index and render it as a PNG data URI
    pub async fn compute(state: &AppState, request: &IndexRequest) -> Result<IndexResponse, ApiError> {
        let index: IndexType = request.index_type.parse().map_err(ApiError::from)?;
        let path = resolve_data_path(state.config.data_dir(), &request.raster)?;

        let raster = state
            .registry
            .read(&path)
            .await
            .and_then(|data| data.into_raster())
            .map_err(|e| ApiError::at_step("raster load", e))?;

        let [a, b] = request.bands;
        let values = compute_index(&raster, index, (a, b))?;
        let png = render_index(&values).map_err(|e| ApiError::at_step("rendering", e))?;

        tracing::info!(index = index.as_str(), raster = %raster.name, "Computed spectral index");
        Ok(IndexResponse { index_type: index.as_str().to_string(), image_data: png.data_uri() })
    }
}
