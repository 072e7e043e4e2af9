//! Style command: show what the style parser makes of a message

use anyhow::Result;
use geomap_render::{parse_style_instructions, select_mode};

use crate::cli::StyleArgs;
use crate::output::OutputWriter;
use crate::output_types::StyleOutput;

pub fn execute(args: StyleArgs, output: &OutputWriter) -> Result<()> {
    let styles = parse_style_instructions(&args.message);

    if output.is_json() {
        return output.result(StyleOutput { message: args.message, styles });
    }

    output.section("Style Configuration");
    output.kv("Render mode", select_mode(&args.message));
    output.kv("Legend location", format!("{:?}", styles.legend_loc));
    output.kv("Legend size", format!("{:?}", styles.legend_size));
    output.kv("North arrow", format!("{:?}", styles.north_arrow_position));
    output.kv("Color scheme", format!("{:?}", styles.color_scheme));
    output.kv(
        "Classification",
        format!("{:?} ({} classes)", styles.classification_scheme, styles.k_classes),
    );
    output.kv("Grid", styles.grid);
    output.kv("Scale bar", styles.scale_bar);
    output.kv("Padding", styles.padding);
    if let Some(title) = &styles.title {
        output.kv("Title", title);
    }
    if let Some(legend_title) = &styles.legend_title {
        output.kv("Legend title", legend_title);
    }
    Ok(())
}
