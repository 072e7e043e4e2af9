use serde::Serialize;
use std::collections::BTreeMap;

use geomap_core::stats::ColumnStatistics;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// False when no language model key is configured; `/api/v1/query` then answers 503
    pub llm_configured: bool,
}

impl HealthResponse {
    pub fn new(llm_configured: bool) -> Self {
        Self { status: "ok", service: "geomap-api", llm_configured }
    }
}

/// Chat query response. A failed render keeps the answer and sets `error`.
#[derive(Debug, Default, Serialize)]
pub struct QueryResponse {
    pub ai_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BTreeMap<String, ColumnStatistics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Spectral index response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub index_type: String,
    /// PNG data URI
    pub image_data: String,
}
