//! Command implementations

mod ask;
mod index;
mod inspect;
mod render;
mod stats;
mod style;

use anyhow::{Context, Result};
use geomap_core::config::LayeredConfig;
use geomap_core::formats::FormatRegistry;
use geomap_core::models::Dataset;
use geomap_geo::normalize_to_wgs84;
use geomap_render::{MapResponse, MapResponseGenerator};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Ask(args) => ask::execute(args, &config, output).await,
        Commands::Style(args) => style::execute(args, output),
        Commands::Render(args) => render::execute(args, &config, output).await,
        Commands::Index(args) => index::execute(args, &config, output).await,
        Commands::Stats(args) => stats::execute(args, output).await,
        Commands::Inspect(args) => inspect::execute(args, &config, output).await,
    }
}

/// Read a vector dataset and bring it to WGS84
async fn load_dataset(path: &Path) -> Result<Dataset> {
    let registry = FormatRegistry::with_builtin_readers();
    let mut dataset = registry
        .read(path)
        .await
        .and_then(|data| data.into_vector())
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    normalize_to_wgs84(&mut dataset)
        .with_context(|| format!("Failed to reproject {} to WGS84", dataset.name))?;
    Ok(dataset)
}

fn map_generator(config: &LayeredConfig) -> Result<MapResponseGenerator> {
    MapResponseGenerator::new(config.font_path.value.as_deref()).context("Failed to initialize map renderer")
}

/// Default output file for a rendered map
fn default_map_path(map: &MapResponse) -> PathBuf {
    match map {
        MapResponse::Image(_) => PathBuf::from("map.png"),
        MapResponse::Html(_) => PathBuf::from("map.html"),
    }
}

/// Write a rendered map to `out`, or to `map.png`/`map.html` when no path is given
fn write_map(map: &MapResponse, out: Option<PathBuf>) -> Result<PathBuf> {
    let path = out.unwrap_or_else(|| default_map_path(map));
    match map {
        MapResponse::Image(png) => std::fs::write(&path, &png.bytes),
        MapResponse::Html(html) => std::fs::write(&path, html),
    }
    .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_path() {
        assert_eq!(default_map_path(&MapResponse::Html(String::new())), PathBuf::from("map.html"));
    }

    #[test]
    fn test_write_map_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let written = write_map(&MapResponse::Html("<div></div>".into()), Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<div></div>");
    }
}
