use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{QueryRequest, QueryResponse};
use crate::error::ApiError;
use crate::services::QueryService;
use crate::state::AppState;

pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    tracing::info!(
        dataset = %request.dataset,
        message_len = request.message.len(),
        "Processing query request"
    );

    let result = QueryService::execute(&state, &request).await?;

    Ok(Json(result))
}
