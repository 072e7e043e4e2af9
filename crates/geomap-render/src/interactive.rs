//! Interactive Leaflet map with a styled GeoJSON layer

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use std::collections::HashMap;
use tera::Context;
use uuid::Uuid;

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::{ColumnKind, Dataset, StyleConfig, UNKNOWN_CATEGORY};
use geomap_geo::{mercator_mean_center, require_wgs84, GeometryExt};

use crate::palette::{set3_scaled, Colormap, Rgb, UNIFORM_FILL};
use crate::style::extract_title;
use crate::templates::{script_json, TemplateEngine};

const ZOOM: u32 = 6;

/// Equal-width classes of the numeric choropleth
const CHOROPLETH_BINS: usize = 7;

/// Columns used as the feature label in numeric tooltips, in preference order
const JOIN_KEYS: [&str; 2] = ["GEOID", "STUSPS"];

const OSM_ATTRIBUTION: &str =
    "&copy; <a href='https://www.openstreetmap.org/copyright'>OpenStreetMap</a> contributors";
const CARTO_ATTRIBUTION: &str = "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"http://cartodb.com/attributions\">CartoDB</a>";

const BASE_LAYERS: [(&str, &str, &str); 3] = [
    ("OpenStreetMap", "https://tile.openstreetmap.org/{z}/{x}/{y}.png", OSM_ATTRIBUTION),
    ("CartoDB Positron", "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png", CARTO_ATTRIBUTION),
    ("CartoDB Dark Matter", "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png", CARTO_ATTRIBUTION),
];

const PLUGIN_CSS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.css",
    "https://cdn.jsdelivr.net/gh/ljagis/leaflet-measure@2.1.7/dist/leaflet-measure.min.css",
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.draw/1.0.2/leaflet.draw.css",
];

const PLUGIN_JS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.js",
    "https://cdn.jsdelivr.net/gh/ljagis/leaflet-measure@2.1.7/dist/leaflet-measure.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.draw/1.0.2/leaflet.draw.js",
];

#[derive(Debug, Serialize)]
struct LegendEntry {
    color: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct LegendView {
    title: String,
    entries: Vec<LegendEntry>,
}

#[derive(Debug, Serialize)]
struct TooltipField {
    field: String,
    alias: String,
}

#[derive(Debug, Serialize)]
struct BaseLayerView {
    name_json: String,
    url_json: String,
    attribution_json: String,
}

/// How the GeoJSON layer is drawn
struct LayerStyle {
    fills: Vec<Rgb>,
    legend: Option<LegendView>,
    tooltip: Vec<TooltipField>,
    line_color: &'static str,
    line_weight: f64,
    line_opacity: f64,
    fill_opacity: f64,
    highlight: bool,
}

impl LayerStyle {
    fn outlined(fills: Vec<Rgb>, legend: Option<LegendView>, column: &str) -> Self {
        Self {
            fills,
            legend,
            tooltip: vec![TooltipField { field: column.to_string(), alias: format!("{}:", column) }],
            line_color: "black",
            line_weight: 0.5,
            line_opacity: 1.0,
            fill_opacity: 0.2,
            highlight: false,
        }
    }
}

fn categorical_layer(dataset: &mut Dataset, column: &str) -> Result<LayerStyle> {
    dataset.fill_missing_categorical(column, UNKNOWN_CATEGORY)?;
    let idx = dataset.require_column(column)?;
    let categories: Vec<String> = dataset.distinct_values(column)?.iter().map(|v| v.label()).collect();
    let colors = set3_scaled(categories.len());
    let position: HashMap<&str, usize> =
        categories.iter().enumerate().rev().map(|(i, c)| (c.as_str(), i)).collect();

    let fills = dataset
        .values(idx)
        .map(|v| position.get(v.label().as_str()).map(|&i| colors[i]).unwrap_or(Rgb(128, 128, 128)))
        .collect();

    let legend = LegendView {
        title: column.to_string(),
        entries: categories
            .iter()
            .zip(&colors)
            .map(|(label, color)| LegendEntry { color: color.to_hex(), label: label.clone() })
            .collect(),
    };
    Ok(LayerStyle::outlined(fills, Some(legend), column))
}

fn numeric_layer(dataset: &mut Dataset, column: &str) -> Result<LayerStyle> {
    dataset.fill_missing_numeric(column)?;
    let idx = dataset.require_column(column)?;
    let values: Vec<f64> = dataset.values(idx).map(|v| v.as_f64().unwrap_or(0.0)).collect();

    let constant = values.first().map_or(true, |first| values.iter().all(|v| v == first));
    if constant {
        return Ok(LayerStyle::outlined(vec![UNIFORM_FILL; values.len()], None, column));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let edges = crate::classify::equal_width_edges(min, max, CHOROPLETH_BINS);
    let colors = Colormap::YLGN.discrete(CHOROPLETH_BINS);

    let fills = values.iter().map(|v| colors[crate::classify::bin_of(*v, &edges[1..])]).collect();

    let legend = LegendView {
        title: column.to_string(),
        entries: edges
            .windows(2)
            .zip(&colors)
            .map(|(w, color)| LegendEntry { color: color.to_hex(), label: format!("{:.2} - {:.2}", w[0], w[1]) })
            .collect(),
    };

    let mut tooltip = Vec::new();
    if let Some(key) = JOIN_KEYS.iter().find(|k| dataset.has_column(k)) {
        tooltip.push(TooltipField { field: key.to_string(), alias: "State ID: ".to_string() });
    }
    tooltip.push(TooltipField { field: column.to_string(), alias: format!("{}: ", column) });

    Ok(LayerStyle {
        fills,
        legend: Some(legend),
        tooltip,
        line_color: "black",
        line_weight: 1.0,
        line_opacity: 0.2,
        fill_opacity: 0.7,
        highlight: true,
    })
}

/// Features keyed by row index, carrying every attribute column
pub fn feature_collection(dataset: &Dataset) -> FeatureCollection {
    let features = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let properties: JsonObject = dataset
                .columns
                .iter()
                .zip(&row.values)
                .map(|(col, value)| (col.name.clone(), value.to_json()))
                .collect();
            Feature {
                bbox: None,
                geometry: row.geometry.as_ref().map(|g| g.to_geojson()),
                id: Some(Id::Number(i.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// Render the interactive map of `column`
pub fn render(
    engine: &TemplateEngine,
    dataset: &mut Dataset,
    column: &str,
    style: &StyleConfig,
    user_message: &str,
) -> Result<String> {
    let mode = RenderMode::Interactive;
    let kind = dataset
        .column_kind(column)
        .ok_or_else(|| GeomapError::ColumnNotFound { column: column.to_string(), available: dataset.column_names() })?;
    require_wgs84(dataset, mode)?;

    let layer = match kind {
        ColumnKind::Categorical => categorical_layer(dataset, column)?,
        ColumnKind::Numeric => numeric_layer(dataset, column)?,
    };

    let (center_lat, center_lon) = mercator_mean_center(dataset)
        .ok_or_else(|| GeomapError::render(mode, "dataset has no geometries to draw"))?;

    let base_layers = BASE_LAYERS
        .iter()
        .map(|(name, url, attribution)| {
            Ok(BaseLayerView {
                name_json: script_json(name, mode)?,
                url_json: script_json(url, mode)?,
                attribution_json: script_json(attribution, mode)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let fills: Vec<String> = layer.fills.iter().map(Rgb::to_hex).collect();
    let title = extract_title(user_message).or_else(|| style.title.clone());

    let mut ctx = Context::new();
    ctx.insert("map_id", &format!("map_{}", Uuid::new_v4().simple()));
    ctx.insert("extra_css", PLUGIN_CSS);
    ctx.insert("extra_js", PLUGIN_JS);
    ctx.insert("center_lat", &center_lat);
    ctx.insert("center_lon", &center_lon);
    ctx.insert("zoom", &ZOOM);
    ctx.insert("title", &title);
    ctx.insert("legend", &layer.legend);
    ctx.insert("base_layers", &base_layers);
    ctx.insert("default_layer_json", &script_json(BASE_LAYERS[0].0, mode)?);
    ctx.insert("fills", &script_json(&fills, mode)?);
    ctx.insert("tooltip_fields", &script_json(&layer.tooltip, mode)?);
    ctx.insert("geojson", &script_json(&feature_collection(dataset), mode)?);
    ctx.insert("line_color_json", &script_json(layer.line_color, mode)?);
    ctx.insert("line_weight", &layer.line_weight);
    ctx.insert("line_opacity", &layer.line_opacity);
    ctx.insert("fill_opacity", &layer.fill_opacity);
    ctx.insert("highlight", &layer.highlight);
    ctx.insert("layer_name_json", &script_json(column, mode)?);

    let html = engine.render("interactive.html", &ctx, mode)?;
    tracing::info!(
        dataset = %dataset.name,
        column,
        features = dataset.len(),
        bytes = html.len(),
        "Rendered interactive map"
    );
    Ok(html)
}
