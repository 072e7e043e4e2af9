//! Index command: spectral index of a multi-band raster

use anyhow::{bail, Context, Result};
use geomap_core::config::LayeredConfig;
use geomap_core::formats::FormatRegistry;
use geomap_core::models::IndexType;
use geomap_geo::compute_index;
use geomap_render::{fonts, render_index};
use std::path::PathBuf;

use crate::cli::IndexArgs;
use crate::output::OutputWriter;
use crate::output_types::IndexOutput;

pub async fn execute(args: IndexArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let index: IndexType = args.index_type.parse()?;
    fonts::init(config.font_path.value.as_deref());
    let [a, b] = match args.bands.as_slice() {
        [a, b] => [*a, *b],
        other => bail!("Expected exactly two bands, got {}", other.len()),
    };

    let registry = FormatRegistry::with_builtin_readers();
    let raster = registry
        .read(&args.raster)
        .await
        .and_then(|data| data.into_raster())
        .with_context(|| format!("Failed to load raster {}", args.raster.display()))?;

    let values = compute_index(&raster, index, (a, b))?;
    let png = render_index(&values).context("Failed to render index raster")?;

    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", index.as_str().to_lowercase())));
    std::fs::write(&path, &png.bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    let result = IndexOutput {
        raster: raster.name.clone(),
        index_type: index.as_str().to_string(),
        bands: [a, b],
        path: path.display().to_string(),
        valid_pixels: values.values.iter().filter(|v| v.is_finite()).count(),
        total_pixels: values.values.len(),
    };

    if output.is_json() {
        output.result(result)
    } else {
        output.success(format!("{} written to {}", result.index_type, result.path));
        output.kv("Bands", format!("{}, {}", a, b));
        output.kv("Valid pixels", format!("{} of {}", result.valid_pixels, result.total_pixels));
        Ok(())
    }
}
