use std::sync::Arc;

use axum::{extract::State, Json};
use geomap_core::formats::FileSummary;

use crate::dto::DescribeRequest;
use crate::error::ApiError;
use crate::services::DatasetService;
use crate::state::AppState;

pub async fn describe_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DescribeRequest>,
) -> Result<Json<FileSummary>, ApiError> {
    tracing::info!(dataset = %request.dataset, "Describing dataset");

    let summary = DatasetService::describe(&state, &request.dataset).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to describe dataset");
        ApiError::at_step("dataset load", e)
    })?;

    Ok(Json(summary))
}
