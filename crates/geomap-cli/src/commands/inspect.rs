//! Inspect command implementation

use anyhow::{Context, Result};
use geomap_core::config::LayeredConfig;
use geomap_core::formats::{FileSummary, FileType, FormatRegistry};
use std::path::Path;

use crate::cli::{InspectArgs, InspectTarget};
use crate::output::OutputWriter;
use crate::output_types::{ConfigValue, InspectConfigOutput};

pub async fn execute(args: InspectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    match args.target {
        InspectTarget::File { path } => inspect_file(&path, output).await,
        InspectTarget::Config => inspect_config(config, output),
    }
}

/// Summarize a vector or raster file
async fn inspect_file(path: &Path, output: &OutputWriter) -> Result<()> {
    let registry = FormatRegistry::with_builtin_readers();
    let summary: FileSummary = registry
        .read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?
        .summary();

    if output.is_json() {
        return output.result(summary);
    }

    output.section(format!("File: {}", summary.name));
    match summary.file_type {
        FileType::Vector => {
            output.kv("Type", "vector");
            if let Some(count) = summary.feature_count {
                output.kv("Features", count);
            }
            if let Some(crs) = summary.crs {
                output.kv("CRS", format!("EPSG:{}", crs));
            }
            output.kv("Columns", summary.columns.join(", "));
            output.kv("Numeric columns", summary.numeric_columns.join(", "));
        }
        FileType::Raster => {
            output.kv("Type", "raster");
            if let Some(bands) = summary.band_count {
                output.kv("Bands", bands);
            }
            if let (Some(w), Some(h)) = (summary.width, summary.height) {
                output.kv("Size", format!("{}x{}", w, h));
            }
        }
    }
    Ok(())
}

/// Show each configuration value and the layer it came from
fn inspect_config(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut values: Vec<ConfigValue> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigValue { key, value, source: format!("{:?}", source) })
        .collect();
    values.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.result(InspectConfigOutput { config: values })
    } else {
        output.section("Configuration");
        output.table(values)
    }
}
