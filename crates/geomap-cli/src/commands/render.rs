//! Render command: map a column without the language model

use anyhow::{Context, Result};
use geomap_core::config::LayeredConfig;
use geomap_render::{parse_style_instructions, select_mode, MapResponse};

use super::{load_dataset, map_generator, write_map};
use crate::cli::RenderArgs;
use crate::output::OutputWriter;
use crate::output_types::RenderOutput;

pub async fn execute(args: RenderArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut dataset = load_dataset(&args.dataset).await?;
    let maps = map_generator(config)?;
    let styles = parse_style_instructions(&args.message);
    let mode = select_mode(&args.message);

    let map = maps
        .generate(&mut dataset, &args.column, &styles, &args.message)
        .with_context(|| format!("Failed to render {}", mode))?;
    let path = write_map(&map, args.out)?;

    let (width, height) = match &map {
        MapResponse::Image(png) => (Some(png.width), Some(png.height)),
        MapResponse::Html(_) => (None, None),
    };
    let result = RenderOutput {
        dataset: dataset.name.clone(),
        column: args.column[0].clone(),
        mode: mode.to_string(),
        path: path.display().to_string(),
        width,
        height,
    };

    if output.is_json() {
        output.result(result)
    } else {
        output.success(format!("Rendered {} of '{}' to {}", result.mode, result.column, result.path));
        if let (Some(w), Some(h)) = (width, height) {
            output.kv("Size", format!("{}x{} px", w, h));
        }
        Ok(())
    }
}
