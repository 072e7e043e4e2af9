use geomap_core::models::StyleConfig;
use geomap_core::stats::ColumnStatistics;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Output for ask command
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub message: String,
    pub ai_response: String,
    pub matched_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BTreeMap<String, ColumnStatistics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output for style command
#[derive(Debug, Serialize)]
pub struct StyleOutput {
    pub message: String,
    pub styles: StyleConfig,
}

/// Output for render command
#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub dataset: String,
    pub column: String,
    pub mode: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Output for index command
#[derive(Debug, Serialize)]
pub struct IndexOutput {
    pub raster: String,
    pub index_type: String,
    pub bands: [u16; 2],
    pub path: String,
    pub valid_pixels: usize,
    pub total_pixels: usize,
}

/// Output for stats command
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub dataset: String,
    pub statistics: BTreeMap<String, ColumnStatistics>,
}

/// One row of the human-readable statistics table
#[derive(Debug, Serialize, Tabled)]
pub struct StatsRow {
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Count")]
    pub count: String,
    #[tabled(rename = "Mean")]
    pub mean: String,
    #[tabled(rename = "Std")]
    pub std: String,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "25%")]
    pub p25: String,
    #[tabled(rename = "50%")]
    pub p50: String,
    #[tabled(rename = "75%")]
    pub p75: String,
    #[tabled(rename = "Max")]
    pub max: String,
}

/// Output for inspect config command
#[derive(Debug, Serialize)]
pub struct InspectConfigOutput {
    pub config: Vec<ConfigValue>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigValue {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
