//! Map response generation: mode selection and dispatch to the renderers

use serde::Serialize;
use std::path::Path;

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::{Dataset, StyleConfig};

use crate::encode::PngImage;
use crate::templates::TemplateEngine;
use crate::{fonts, heatmap, interactive, static_map};

const HEATMAP_KEYWORDS: [&str; 2] = ["heatmap", "density"];
const INTERACTIVE_KEYWORDS: [&str; 2] = ["interactive", "dynamic"];
const MAP_KEYWORDS: [&str; 3] = ["map", "visualize", "heatmap"];
const STATISTICS_KEYWORDS: [&str; 4] = ["statistics", "stats", "plot", "chart"];

fn mentions(message: &str, keywords: &[&str]) -> bool {
    let lower = message.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// True when the message asks for a map
pub fn wants_map(message: &str) -> bool {
    mentions(message, &MAP_KEYWORDS)
}

/// True when the message asks for statistics
pub fn wants_statistics(message: &str) -> bool {
    mentions(message, &STATISTICS_KEYWORDS)
}

/// A rendered map: a PNG image or an embeddable HTML fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MapResponse {
    #[serde(rename = "map_image")]
    Image(PngImage),
    #[serde(rename = "map_html")]
    Html(String),
}

impl MapResponse {
    pub fn as_image(&self) -> Option<&PngImage> {
        match self {
            MapResponse::Image(png) => Some(png),
            MapResponse::Html(_) => None,
        }
    }

    pub fn as_html(&self) -> Option<&str> {
        match self {
            MapResponse::Html(html) => Some(html),
            MapResponse::Image(_) => None,
        }
    }
}

/// Render mode requested by a message; the first keyword group that matches wins
pub fn select_mode(user_message: &str) -> RenderMode {
    if mentions(user_message, &HEATMAP_KEYWORDS) {
        RenderMode::Heatmap
    } else if mentions(user_message, &INTERACTIVE_KEYWORDS) {
        RenderMode::Interactive
    } else {
        RenderMode::Static
    }
}

/// Turns a dataset, target columns and style into a map
pub struct MapResponseGenerator {
    templates: TemplateEngine,
}

impl MapResponseGenerator {
    /// Compile the map templates and register the text font for static images
    pub fn new(font_path: Option<&Path>) -> Result<Self> {
        fonts::init(font_path);
        Ok(Self { templates: TemplateEngine::new()? })
    }

    /// Render the first target column in the mode the message asks for.
    ///
    /// Missing values of every numeric target column are replaced with 0 first.
    pub fn generate(
        &self,
        dataset: &mut Dataset,
        target_columns: &[String],
        styles: &StyleConfig,
        user_message: &str,
    ) -> Result<MapResponse> {
        let column = target_columns.first().ok_or(GeomapError::NoTargetColumn)?;
        for target in target_columns {
            let filled = dataset.fill_missing_numeric(target)?;
            if filled > 0 {
                tracing::debug!(column = %target, filled, "Filled missing numeric values with 0");
            }
        }

        let mode = select_mode(user_message);
        tracing::info!(dataset = %dataset.name, column = %column, %mode, "Generating map");

        match mode {
            RenderMode::Heatmap => heatmap::render(&self.templates, dataset, column).map(MapResponse::Html),
            RenderMode::Interactive => {
                interactive::render(&self.templates, dataset, column, styles, user_message).map(MapResponse::Html)
            }
            _ => static_map::render(dataset, column, styles, user_message).map(MapResponse::Image),
        }
    }

    /// Styled HTML presentation of a heatmap failure
    pub fn heatmap_error_fragment(&self, err: &GeomapError) -> Result<String> {
        heatmap::error_fragment(&self.templates, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, Geometry};
    use geomap_core::models::Value;

    fn regions(values: Vec<Value>) -> Dataset {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let x = i as f64;
                let g = Geometry::Polygon(polygon![
                    (x: x, y: 0.0),
                    (x: x + 1.0, y: 0.0),
                    (x: x + 1.0, y: 1.0),
                    (x: x, y: 0.0),
                ]);
                (Some(g), vec![("value".to_string(), v)])
            })
            .collect();
        Dataset::from_records("regions", 4326, records)
    }

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_mode() {
        assert_eq!(select_mode("show a Heatmap of crimes"), RenderMode::Heatmap);
        assert_eq!(select_mode("population density, interactive"), RenderMode::Heatmap);
        assert_eq!(select_mode("a DYNAMIC map please"), RenderMode::Interactive);
        assert_eq!(select_mode("map population"), RenderMode::Static);
    }

    #[test]
    fn test_request_keywords() {
        assert!(wants_map("Visualize population"));
        assert!(wants_map("heatmap of crimes"));
        assert!(!wants_map("what is this data?"));
        assert!(wants_statistics("give me STATS for area"));
        assert!(wants_statistics("chart the population"));
        assert!(!wants_statistics("map population"));
    }

    #[test]
    fn test_no_target_column() {
        let generator = MapResponseGenerator::new(None).unwrap();
        let mut ds = regions(vec![Value::Number(1.0)]);
        let err = generator.generate(&mut ds, &[], &StyleConfig::default(), "map").unwrap_err();
        assert!(matches!(err, GeomapError::NoTargetColumn));
    }

    #[test]
    fn test_unknown_target_column() {
        let generator = MapResponseGenerator::new(None).unwrap();
        let mut ds = regions(vec![Value::Number(1.0)]);
        let err = generator
            .generate(&mut ds, &targets(&["population"]), &StyleConfig::default(), "map")
            .unwrap_err();
        match err {
            GeomapError::ColumnNotFound { column, available } => {
                assert_eq!(column, "population");
                assert_eq!(available, vec!["value".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_missing_filled_before_render() {
        let generator = MapResponseGenerator::new(None).unwrap();
        let mut ds = regions(vec![Value::Number(4.0), Value::Null, Value::Number(8.0)]);
        let response = generator
            .generate(&mut ds, &targets(&["value"]), &StyleConfig::default(), "interactive map of value")
            .unwrap();
        assert!(response.as_html().is_some());
        assert_eq!(ds.rows[1].values[0], Value::Number(0.0));
    }

    #[test]
    fn test_static_map_is_png() {
        let generator = MapResponseGenerator::new(None).unwrap();
        let mut ds = regions((0..15).map(|i| Value::Text(format!("class {i}"))).collect());
        let response = generator
            .generate(&mut ds, &targets(&["value"]), &StyleConfig::default(), "map value")
            .unwrap();
        let png = response.as_image().unwrap();
        assert!(png.bytes.starts_with(b"\x89PNG"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["map_image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_heatmap_with_all_values_missing_is_an_error() {
        let generator = MapResponseGenerator::new(None).unwrap();
        let records = (0..3)
            .map(|i| {
                let g = Geometry::Point(point!(x: i as f64, y: 1.0));
                (Some(g), vec![("value".to_string(), Value::Null)])
            })
            .collect();
        let mut ds = Dataset::from_records("points", 4326, records);
        let err = generator
            .generate(&mut ds, &targets(&["value"]), &StyleConfig::default(), "heatmap of value")
            .unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Heatmap, .. }));

        let fragment = generator.heatmap_error_fragment(&err).unwrap();
        assert!(fragment.contains("No valid data points for heatmap"));
    }

    #[test]
    fn test_html_serializes_under_map_html() {
        let json = serde_json::to_value(MapResponse::Html("<div></div>".into())).unwrap();
        assert_eq!(json["map_html"], "<div></div>");
    }
}
