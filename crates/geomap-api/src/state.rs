use std::sync::Arc;

use geomap_core::error::{GeomapError, Result};
use geomap_core::formats::FormatRegistry;
use geomap_llm::{GeminiGenerator, Generator, IntentResolver};
use geomap_render::MapResponseGenerator;

use crate::config::ApiConfig;

/// Shared, read-only state. Every request loads and owns its own dataset.
pub struct AppState {
    pub config: ApiConfig,
    pub registry: FormatRegistry,
    pub maps: MapResponseGenerator,
    resolver: Option<IntentResolver>,
}

impl AppState {
    pub fn new(config: ApiConfig, generator: Option<Arc<dyn Generator>>) -> Result<Self> {
        let maps = MapResponseGenerator::new(config.geomap.font_path.value.as_deref())?;
        Ok(Self {
            config,
            registry: FormatRegistry::with_builtin_readers(),
            maps,
            resolver: generator.map(IntentResolver::new),
        })
    }

    /// Build state with the Gemini generator. Without a usable API key the server still
    /// starts; chat queries then fail with 503 until a key is configured.
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let generator: Option<Arc<dyn Generator>> = match GeminiGenerator::from_config(&config.geomap) {
            Ok(g) => {
                tracing::info!(model = %config.geomap.llm_model.value, "Language model configured");
                Some(Arc::new(g))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Language model unavailable; /api/v1/query will return 503");
                None
            }
        };
        Self::new(config, generator)
    }

    pub fn llm_configured(&self) -> bool {
        self.resolver.is_some()
    }

    pub fn resolver(&self) -> Result<&IntentResolver> {
        self.resolver.as_ref().ok_or_else(|| GeomapError::LlmUnavailable {
            reason: "no language model configured".to_string(),
            remediation: "set GENAI_API_KEY or llm.api_key in geomap.toml and restart".to_string(),
        })
    }
}
