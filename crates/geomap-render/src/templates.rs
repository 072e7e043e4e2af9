//! HTML fragment templates for the Leaflet-based maps

use serde::Serialize;
use tera::{Context, Tera};

use geomap_core::error::{GeomapError, RenderMode, Result};

const TEMPLATES: &[(&str, &str)] = &[
    ("leaflet_head.html", include_str!("../templates/leaflet_head.html")),
    ("heatmap.html", include_str!("../templates/heatmap.html")),
    ("heatmap_error.html", include_str!("../templates/heatmap_error.html")),
    ("interactive.html", include_str!("../templates/interactive.html")),
];

/// Compiled fragment templates. Values are HTML-escaped unless passed through `safe`.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied()).map_err(|e| GeomapError::Render {
            mode: RenderMode::Interactive,
            reason: format!("Failed to compile map templates: {}", e),
        })?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context, mode: RenderMode) -> Result<String> {
        self.tera.render(name, context).map_err(|e| {
            let loaded: Vec<&str> = self.tera.get_template_names().collect();
            GeomapError::render(mode, format!("Template error: {}. Requested: '{}'. Loaded: {:?}", e, name, loaded))
        })
    }
}

/// Serialize a value for embedding inside a `<script>` element
pub fn script_json<T: Serialize + ?Sized>(value: &T, mode: RenderMode) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| GeomapError::render(mode, e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}
