//! Format abstraction layer for dataset loading
//!
//! Each file format implements the `FormatReader` trait, and the `FormatRegistry` manages
//! format detection and dispatching to the appropriate reader.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GeomapError, Result};
use crate::models::{ColumnKind, Dataset, Raster};

pub mod geojson;
pub mod geotiff;
pub mod shapefile;
pub mod validation;

pub use self::geojson::GeoJsonReader;
pub use self::geotiff::GeoTiffReader;
pub use self::shapefile::ShapefileFormatReader;

/// Format reader trait that all format implementations must implement
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Read a file from the given path
    async fn read(&self, path: &Path) -> Result<FormatData>;

    /// Get supported file extensions (e.g., ["shp", "geojson"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without full read
    async fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// What a reader produced
#[derive(Debug, Clone)]
pub enum FormatData {
    Vector(Dataset),
    Raster(Raster),
}

impl FormatData {
    pub fn into_vector(self) -> Result<Dataset> {
        match self {
            FormatData::Vector(ds) => Ok(ds),
            FormatData::Raster(r) => Err(GeomapError::InvalidInput(format!(
                "'{}' is a raster file; a vector dataset (GeoJSON or Shapefile) is required",
                r.name
            ))),
        }
    }

    pub fn into_raster(self) -> Result<Raster> {
        match self {
            FormatData::Raster(r) => Ok(r),
            FormatData::Vector(ds) => Err(GeomapError::InvalidInput(format!(
                "'{}' is a vector dataset; a raster file (GeoTIFF) is required",
                ds.name
            ))),
        }
    }

    /// Summary of the file contents
    pub fn summary(&self) -> FileSummary {
        match self {
            FormatData::Vector(ds) => FileSummary {
                file_type: FileType::Vector,
                name: ds.name.clone(),
                columns: ds.column_names(),
                numeric_columns: ds
                    .columns
                    .iter()
                    .filter(|c| c.kind == ColumnKind::Numeric)
                    .map(|c| c.name.clone())
                    .collect(),
                feature_count: Some(ds.len()),
                band_count: None,
                width: None,
                height: None,
                crs: Some(ds.crs),
            },
            FormatData::Raster(r) => FileSummary {
                file_type: FileType::Raster,
                name: r.name.clone(),
                columns: Vec::new(),
                numeric_columns: Vec::new(),
                feature_count: None,
                band_count: Some(r.band_count()),
                width: r.bands.first().map(|b| b.width),
                height: r.bands.first().map(|b| b.height),
                crs: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Vector,
    Raster,
}

/// What a loaded file contains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_type: FileType,
    pub name: String,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<u32>,
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with the GeoJSON, Shapefile and GeoTIFF readers
    pub fn with_builtin_readers() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GeoJsonReader));
        registry.register(Box::new(ShapefileFormatReader));
        registry.register(Box::new(GeoTiffReader));
        registry
    }

    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format by file extension (case-insensitive)
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            GeomapError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            }
        })?;
        let lowered = extension.to_ascii_lowercase();

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&lowered.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| GeomapError::UnsupportedFormat {
                extension: extension.to_string(),
                supported: self.supported_formats(),
            })
    }

    /// Validate and read a file with the matching reader
    pub async fn read(&self, path: &Path) -> Result<FormatData> {
        let reader = self.detect_format(path)?;

        let validation = reader.validate(path).await?;
        for warning in &validation.warnings {
            tracing::warn!(path = %path.display(), format = reader.format_name(), "{}", warning);
        }
        if !validation.is_valid() {
            return Err(GeomapError::format(reader.format_name(), validation.errors.join("; ")));
        }

        let data = reader.read(path).await?;
        tracing::info!(
            path = %path.display(),
            format = reader.format_name(),
            "Loaded file"
        );
        Ok(data)
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    pub fn readers(&self) -> &[Box<dyn FormatReader>] {
        &self.readers
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtin_readers()
    }
}

/// Dataset name from a file path
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string()
}
