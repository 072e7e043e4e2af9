use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Datasets
        .route("/api/v1/datasets/describe", post(handlers::describe_dataset))

        // Chat query: intent, map, statistics
        .route("/api/v1/query", post(handlers::handle_query))

        // Spectral indices
        .route("/api/v1/raster/index", post(handlers::compute_raster_index))

        .with_state(state)
}
