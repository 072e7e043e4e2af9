//! Error types for geomap

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The rendering path that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Heatmap,
    Interactive,
    Static,
    Raster,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::Heatmap => "heatmap",
            RenderMode::Interactive => "interactive map",
            RenderMode::Static => "static map",
            RenderMode::Raster => "raster visualization",
        };
        f.write_str(name)
    }
}

/// Broad failure category, used by callers to decide how to present an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong: unknown column, unsupported index, bad path
    InputValidation,
    /// A collaborator failed: language model, file decoding, filesystem
    ExternalDependency,
    /// Rendering a map or image failed
    Rendering,
    /// Configuration is missing or invalid
    Configuration,
    Internal,
}

#[derive(Debug, Error)]
pub enum GeomapError {
    // Input validation
    #[error("Column '{column}' not found. Available columns: {}", available.join(", "))]
    ColumnNotFound { column: String, available: Vec<String> },

    #[error("No target column given for the map")]
    NoTargetColumn,

    #[error("Unsupported index type '{name}'. Supported: NDVI, NDWI, SAWI")]
    UnsupportedIndex { name: String },

    #[error("Band {band} out of range: raster has {band_count} band(s)")]
    BandOutOfRange { band: u16, band_count: usize },

    #[error("Band shape mismatch: band {first} is {first_shape:?}, band {second} is {second_shape:?}")]
    BandShapeMismatch {
        first: u16,
        first_shape: (usize, usize),
        second: u16,
        second_shape: (usize, usize),
    },

    #[error("Unsupported file extension '{extension}'. Supported: {}", supported.join(", "))]
    UnsupportedFormat { extension: String, supported: Vec<String> },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // External dependencies
    #[error("Language model unavailable: {reason}. Try: {remediation}")]
    LlmUnavailable { reason: String, remediation: String },

    #[error("Language model request failed: {reason}")]
    LlmRequest { reason: String },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    // Rendering
    #[error("Error creating {mode}: {reason}")]
    Render { mode: RenderMode, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeomapError {
    /// Shorthand for a rendering failure
    pub fn render(mode: RenderMode, reason: impl Into<String>) -> Self {
        GeomapError::Render { mode, reason: reason.into() }
    }

    /// Shorthand for a file decoding failure
    pub fn format(format: impl Into<String>, message: impl Into<String>) -> Self {
        GeomapError::FormatError { format: format.into(), message: message.into() }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeomapError::ColumnNotFound { .. }
            | GeomapError::NoTargetColumn
            | GeomapError::UnsupportedIndex { .. }
            | GeomapError::BandOutOfRange { .. }
            | GeomapError::BandShapeMismatch { .. }
            | GeomapError::UnsupportedFormat { .. }
            | GeomapError::InvalidPath { .. }
            | GeomapError::InvalidInput(_) => ErrorKind::InputValidation,
            GeomapError::LlmUnavailable { .. }
            | GeomapError::LlmRequest { .. }
            | GeomapError::FormatError { .. }
            | GeomapError::Io(_) => ErrorKind::ExternalDependency,
            GeomapError::Render { .. } => ErrorKind::Rendering,
            GeomapError::ConfigMissing { .. } | GeomapError::ConfigInvalid { .. } => {
                ErrorKind::Configuration
            }
            GeomapError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Column names worth showing to the user alongside the error, if any
    pub fn available_columns(&self) -> Option<&[String]> {
        match self {
            GeomapError::ColumnNotFound { available, .. } => Some(available),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeomapError>;
