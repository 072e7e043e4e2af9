//! Ask command: resolve a question against a dataset, then map and describe it

use anyhow::{Context, Result};
use geomap_core::config::LayeredConfig;
use geomap_core::error::RenderMode;
use geomap_core::stats::describe;
use geomap_core::GeomapError;
use geomap_llm::{GeminiGenerator, IntentResolver};
use geomap_render::{parse_style_instructions, wants_map, wants_statistics};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{load_dataset, map_generator, write_map};
use crate::cli::AskArgs;
use crate::output::OutputWriter;
use crate::output_types::AskOutput;

pub async fn execute(args: AskArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut dataset = load_dataset(&args.dataset).await?;

    let generator = GeminiGenerator::from_config(config).context("Failed to create language model client")?;
    let resolver = IntentResolver::new(Arc::new(generator));
    let intent = resolver
        .resolve(&args.message, &dataset.column_names())
        .await
        .context("Intent resolution failed")?;

    let targets = intent.matched_columns();
    let mut result = AskOutput {
        message: args.message.clone(),
        ai_response: intent.response_text.clone(),
        matched_column: intent.matched_column.clone(),
        map_path: None,
        statistics: None,
        error: None,
    };

    if !targets.is_empty() && wants_map(&args.message) {
        let maps = map_generator(config)?;
        let styles = parse_style_instructions(&args.message);
        match maps.generate(&mut dataset, &targets, &styles, &args.message) {
            Ok(map) => {
                let path = write_map(&map, args.out)?;
                result.map_path = Some(path.display().to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Map rendering failed");
                if matches!(e, GeomapError::Render { mode: RenderMode::Heatmap, .. }) {
                    if let Ok(fragment) = maps.heatmap_error_fragment(&e) {
                        let path = args.out.unwrap_or_else(|| "map.html".into());
                        std::fs::write(&path, fragment)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                    }
                }
                result.error = Some(format!("Rendering failed: {}", e));
            }
        }
    }

    if !targets.is_empty() && wants_statistics(&args.message) {
        let mut statistics = BTreeMap::new();
        for column in &targets {
            statistics.insert(column.clone(), describe(&dataset, column)?);
        }
        result.statistics = Some(statistics);
    }

    if output.is_json() {
        return output.result(result);
    }

    println!("{}", result.ai_response);
    if let Some(path) = &result.map_path {
        output.success(format!("Map written to {}", path));
    }
    if let Some(error) = &result.error {
        output.warning(error);
    }
    if let Some(statistics) = &result.statistics {
        output.section("Statistics");
        output.table(super::stats::rows(statistics))?;
    }
    Ok(())
}
