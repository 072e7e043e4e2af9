use std::collections::BTreeMap;

use geomap_core::error::RenderMode;
use geomap_core::stats::describe;
use geomap_core::GeomapError;
use geomap_geo::normalize_to_wgs84;
use geomap_render::{parse_style_instructions, wants_map, wants_statistics, MapResponse};

use super::paths::resolve_data_path;
use crate::dto::{QueryRequest, QueryResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Service for chat queries
pub struct QueryService;

impl QueryService {
    /// Load the dataset, resolve the intent, then render and describe what was asked for
    pub async fn execute(state: &AppState, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let path = resolve_data_path(state.config.data_dir(), &request.dataset)?;
        let mut dataset = state
            .registry
            .read(&path)
            .await
            .and_then(|data| data.into_vector())
            .and_then(|mut ds| normalize_to_wgs84(&mut ds).map(|_| ds))
            .map_err(|e| ApiError::at_step("dataset load", e))?;

        let columns = dataset.column_names();
        let intent = state
            .resolver()
            .map_err(|e| ApiError::at_step("intent resolution", e))?
            .resolve(&request.message, &columns)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Intent resolution failed");
                ApiError::at_step("intent resolution", e)
            })?;

        let targets = intent.matched_columns();
        let mut response = QueryResponse { ai_response: intent.response_text, ..Default::default() };
        if targets.is_empty() {
            return Ok(response);
        }

        if wants_map(&request.message) {
            let styles = parse_style_instructions(&request.message);
            match state.maps.generate(&mut dataset, &targets, &styles, &request.message) {
                Ok(MapResponse::Image(png)) => response.map_image = Some(png.data_uri()),
                Ok(MapResponse::Html(html)) => response.map_html = Some(html),
                Err(e) => {
                    tracing::warn!(error = %e, "Map rendering failed");
                    if matches!(e, GeomapError::Render { mode: RenderMode::Heatmap, .. }) {
                        response.map_html = state.maps.heatmap_error_fragment(&e).ok();
                    }
                    response.error = Some(format!("Rendering failed: {}", e));
                }
            }
        }

        if wants_statistics(&request.message) {
            let mut statistics = BTreeMap::new();
            for column in &targets {
                statistics.insert(column.clone(), describe(&dataset, column)?);
            }
            response.statistics = Some(statistics);
        }

        Ok(response)
    }
}
