use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{IndexRequest, IndexResponse};
use crate::error::ApiError;
use crate::services::RasterService;
use crate::state::AppState;

pub async fn compute_raster_index(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, ApiError> {
    tracing::info!(
        raster = %request.raster,
        index_type = %request.index_type,
        bands = ?request.bands,
        "Computing spectral index"
    );

    let response = RasterService::compute(&state, &request).await?;

    Ok(Json(response))
}
