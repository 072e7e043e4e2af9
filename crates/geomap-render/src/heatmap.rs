//! Point-density heatmap as a Leaflet HTML fragment

use tera::Context;
use uuid::Uuid;

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::Dataset;
use geomap_geo::{require_wgs84, GeometryExt};

use crate::templates::{script_json, TemplateEngine};

/// Suggestions shown with a heatmap error
pub const ERROR_SUGGESTIONS: [&str; 2] = ["check data quality", "use different column"];

const BLUR: u32 = 15;
const MAX_ZOOM: u32 = 15;
const MIN_OPACITY: f64 = 0.5;
const GRADIENT: [(f64, &str); 4] = [(0.4, "blue"), (0.6, "lime"), (0.8, "orange"), (1.0, "red")];

const PLUGIN_JS: &[&str] = &["https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"];

/// `[lat, lon, value]` for every row with a value and a usable geometry
pub fn heat_points(dataset: &Dataset, column: &str) -> Result<Vec<[f64; 3]>> {
    let idx = dataset.require_column(column)?;
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for row in &dataset.rows {
        let value = &row.values[idx];
        if value.is_null() {
            continue;
        }
        let centroid = row.geometry.as_ref().and_then(|g| g.centroid_coords());
        match (value.as_f64(), centroid) {
            (Some(v), Some([lon, lat])) => points.push([lat, lon, v]),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(column, skipped, "Skipped heatmap rows without a numeric value or centroid");
    }
    Ok(points)
}

/// Radius 20 above 500 points, 15 otherwise
pub fn radius_for(count: usize) -> u32 {
    if count > 500 {
        20
    } else {
        15
    }
}

/// Zoom 10 above 100 points, 12 otherwise
pub fn zoom_for(count: usize) -> u32 {
    if count > 100 {
        10
    } else {
        12
    }
}

/// Render the heatmap of `column`
pub fn render(engine: &TemplateEngine, dataset: &Dataset, column: &str) -> Result<String> {
    if dataset.is_empty() || !dataset.has_column(column) {
        return Err(GeomapError::render(RenderMode::Heatmap, "⚠️ Invalid data or column name"));
    }
    require_wgs84(dataset, RenderMode::Heatmap)?;

    let points = heat_points(dataset, column)?;
    if points.is_empty() {
        return Err(GeomapError::render(RenderMode::Heatmap, "🔴 No valid data points for heatmap"));
    }

    let n = points.len() as f64;
    let center_lat = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let center_lon = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let gradient: serde_json::Map<String, serde_json::Value> =
        GRADIENT.iter().map(|(stop, color)| (stop.to_string(), serde_json::Value::from(*color))).collect();

    let mut ctx = Context::new();
    ctx.insert("map_id", &format!("heatmap_{}", Uuid::new_v4().simple()));
    ctx.insert("extra_css", &Vec::<&str>::new());
    ctx.insert("extra_js", PLUGIN_JS);
    ctx.insert("center_lat", &center_lat);
    ctx.insert("center_lon", &center_lon);
    ctx.insert("zoom", &zoom_for(points.len()));
    ctx.insert("radius", &radius_for(points.len()));
    ctx.insert("blur", &BLUR);
    ctx.insert("max_zoom", &MAX_ZOOM);
    ctx.insert("min_opacity", &MIN_OPACITY);
    ctx.insert("gradient", &script_json(&gradient, RenderMode::Heatmap)?);
    ctx.insert("points", &script_json(&points, RenderMode::Heatmap)?);

    let html = engine.render("heatmap.html", &ctx, RenderMode::Heatmap)?;
    tracing::info!(dataset = %dataset.name, column, points = points.len(), "Rendered heatmap");
    Ok(html)
}

/// Styled HTML fragment presenting a heatmap failure with the two fixed suggestions
pub fn error_fragment(engine: &TemplateEngine, err: &GeomapError) -> Result<String> {
    let message = match err {
        GeomapError::Render { reason, .. } => reason.clone(),
        other => other.to_string(),
    };
    let mut ctx = Context::new();
    ctx.insert("message", &message);
    ctx.insert("suggestions", &ERROR_SUGGESTIONS);
    engine.render("heatmap_error.html", &ctx, RenderMode::Heatmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry};
    use geomap_core::models::Value;

    fn points_dataset(values: Vec<Value>) -> Dataset {
        points_dataset_in(4326, values)
    }

    fn points_dataset_in(crs: u32, values: Vec<Value>) -> Dataset {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let g = Geometry::Point(point!(x: 106.5 + i as f64 * 0.25, y: -6.2));
                (Some(g), vec![("density".to_string(), v)])
            })
            .collect();
        Dataset::from_records("pts", crs, records)
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(radius_for(500), 15);
        assert_eq!(radius_for(501), 20);
        assert_eq!(zoom_for(100), 12);
        assert_eq!(zoom_for(101), 10);
    }

    #[test]
    fn test_heat_points_skip_missing() {
        let ds = points_dataset(vec![Value::Number(3.0), Value::Null, Value::Text("x".into())]);
        let points = heat_points(&ds, "density").unwrap();
        assert_eq!(points, vec![[-6.2, 106.5, 3.0]]);
    }

    #[test]
    fn test_all_missing_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        let ds = points_dataset(vec![Value::Null, Value::Null]);
        let err = render(&engine, &ds, "density").unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Heatmap, .. }));
        assert!(err.to_string().contains("No valid data points"));
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        let ds = points_dataset(vec![Value::Number(1.0)]);
        let err = render(&engine, &ds, "population").unwrap_err();
        assert!(err.to_string().contains("Invalid data or column name"));
    }

    #[test]
    fn test_projected_dataset_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        let mut ds = points_dataset_in(32749, vec![Value::Number(1.0), Value::Number(2.0)]);
        for row in &mut ds.rows {
            row.geometry = Some(Geometry::Point(point!(x: 701250.0, y: 9300166.0)));
        }
        let err = render(&engine, &ds, "density").unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Heatmap, .. }));
        assert!(err.to_string().contains("EPSG:32749"));
    }

    #[test]
    fn test_render_fragment() {
        let engine = TemplateEngine::new().unwrap();
        let ds = points_dataset(vec![Value::Number(1.0), Value::Number(2.0)]);
        let html = render(&engine, &ds, "density").unwrap();
        assert!(html.contains("L.heatLayer([[-6.2,106.5,1.0],[-6.2,106.75,2.0]]"));
        assert!(html.contains("radius: 15"));
        assert!(html.contains("zoom: 12"));
        assert!(html.contains(r#"{"0.4":"blue","0.6":"lime","0.8":"orange","1":"red"}"#));
        assert!(html.contains("leaflet-heat.js"));
    }

    #[test]
    fn test_error_fragment() {
        let engine = TemplateEngine::new().unwrap();
        let err = GeomapError::render(RenderMode::Heatmap, "🔴 No valid data points for heatmap");
        let html = error_fragment(&engine, &err).unwrap();
        assert!(html.contains("Heatmap Error"));
        assert!(html.contains("🔴 No valid data points for heatmap"));
        assert!(html.contains("'check data quality' or 'use different column'"));
    }
}
