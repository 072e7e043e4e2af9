use serde::Deserialize;

/// Describe request body
#[derive(Debug, Deserialize)]
pub struct DescribeRequest {
    /// Dataset path relative to the data directory
    pub dataset: String,
}

/// Chat query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Dataset path relative to the data directory
    pub dataset: String,
    pub message: String,
}

/// Spectral index request body
#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    /// Raster path relative to the data directory
    pub raster: String,
    pub index_type: String,
    /// 1-based band numbers, in formula order
    pub bands: [u16; 2],
}
