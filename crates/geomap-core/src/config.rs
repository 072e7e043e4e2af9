use crate::error::{GeomapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default hosted model used for intent resolution
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash";

/// Default bound on a single model call
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Default directory that dataset paths are resolved against
pub const DEFAULT_DATA_DIR: &str = "uploads";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geomap
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub llm_model: ConfigValue<String>,
    pub llm_api_key: ConfigValue<Option<String>>,
    pub llm_timeout_secs: ConfigValue<u64>,
    pub data_dir: ConfigValue<PathBuf>,
    pub font_path: ConfigValue<Option<PathBuf>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            llm_model: ConfigValue::new(DEFAULT_LLM_MODEL.to_string(), ConfigSource::Default),
            llm_api_key: ConfigValue::new(None, ConfigSource::Default),
            llm_timeout_secs: ConfigValue::new(DEFAULT_LLM_TIMEOUT_SECS, ConfigSource::Default),
            data_dir: ConfigValue::new(PathBuf::from(DEFAULT_DATA_DIR), ConfigSource::Default),
            font_path: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeomapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeomapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(llm) = file_config.llm {
            if let Some(model) = llm.model {
                self.llm_model.update(model, ConfigSource::File);
            }
            if let Some(api_key) = llm.api_key.filter(|k| !k.trim().is_empty()) {
                self.llm_api_key.update(Some(api_key), ConfigSource::File);
            }
            if let Some(timeout) = llm.timeout_secs {
                self.llm_timeout_secs.update(validate_timeout(timeout)?, ConfigSource::File);
            }
        }

        if let Some(data_dir) = file_config.data_dir {
            self.data_dir.update(data_dir, ConfigSource::File);
        }

        if let Some(font_path) = file_config.font_path {
            self.font_path.update(Some(font_path), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(model) = env::var("GEOMAP_LLM_MODEL") {
            if !model.trim().is_empty() {
                self.llm_model.update(model, ConfigSource::Environment);
            }
        }

        // GEOMAP_GENAI_API_KEY takes priority over the bare GENAI_API_KEY
        let api_key = env::var("GEOMAP_GENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env::var("GENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()));
        if let Some(api_key) = api_key {
            self.llm_api_key.update(Some(api_key), ConfigSource::Environment);
        }

        if let Ok(timeout_str) = env::var("GEOMAP_LLM_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>().map_err(|e| e.to_string()).and_then(|t| {
                validate_timeout(t).map_err(|e| e.to_string())
            }) {
                Ok(timeout) => self.llm_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMAP_LLM_TIMEOUT_SECS value '{}': expected a positive number of seconds",
                    timeout_str
                ),
            }
        }

        if let Ok(dir) = env::var("GEOMAP_DATA_DIR") {
            if dir.trim().is_empty() {
                tracing::warn!("Ignoring empty GEOMAP_DATA_DIR");
            } else {
                self.data_dir.update(PathBuf::from(dir), ConfigSource::Environment);
            }
        }

        if let Ok(font) = env::var("GEOMAP_FONT_PATH") {
            if !font.trim().is_empty() {
                self.font_path.update(Some(PathBuf::from(font)), ConfigSource::Environment);
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(model) = overrides.llm_model {
            self.llm_model.update(model, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.llm_timeout_secs {
            self.llm_timeout_secs.update(timeout, ConfigSource::Cli);
        }

        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }

        if let Some(font_path) = overrides.font_path {
            self.font_path.update(Some(font_path), ConfigSource::Cli);
        }
    }

    /// The API key, or an error explaining how to provide one
    pub fn require_api_key(&self) -> Result<&str> {
        self.llm_api_key
            .value
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GeomapError::LlmUnavailable {
                reason: "no API key configured".to_string(),
                remediation: "set GENAI_API_KEY or llm.api_key in geomap.toml".to_string(),
            })
    }

    /// Get all configuration values as a map for inspection. The API key is masked.
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "llm_model".to_string(),
            (self.llm_model.value.clone(), self.llm_model.source),
        );

        let masked = match &self.llm_api_key.value {
            Some(_) => "********".to_string(),
            None => "(not set)".to_string(),
        };
        map.insert("llm_api_key".to_string(), (masked, self.llm_api_key.source));

        map.insert(
            "llm_timeout_secs".to_string(),
            (format!("{}s", self.llm_timeout_secs.value), self.llm_timeout_secs.source),
        );

        map.insert(
            "data_dir".to_string(),
            (self.data_dir.value.display().to_string(), self.data_dir.source),
        );

        let font = self
            .font_path
            .value
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(auto-detect)".to_string());
        map.insert("font_path".to_string(), (font, self.font_path.source));

        map
    }
}

fn validate_timeout(secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(GeomapError::ConfigInvalid {
            key: "llm.timeout_secs".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    Ok(secs)
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    llm: Option<LlmSection>,
    data_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LlmSection {
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub llm_model: Option<String>,
    pub llm_timeout_secs: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.llm_model.value, "gemini-1.5-flash");
        assert_eq!(config.llm_model.source, ConfigSource::Default);
        assert_eq!(config.llm_timeout_secs.value, 30);
        assert_eq!(config.data_dir.value, PathBuf::from("uploads"));
        assert!(config.llm_api_key.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/geomap"

[llm]
model = "gemini-1.5-pro"
api_key = "secret"
timeout_secs = 10
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.llm_model.value, "gemini-1.5-pro");
        assert_eq!(config.llm_model.source, ConfigSource::File);
        assert_eq!(config.llm_timeout_secs.value, 10);
        assert_eq!(config.data_dir.value, PathBuf::from("/srv/geomap"));
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\ntimeout_secs = 0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(GeomapError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            llm_model: Some("gemini-2.0-flash".to_string()),
            data_dir: Some(PathBuf::from("data")),
            ..Default::default()
        });

        assert_eq!(config.llm_model.value, "gemini-2.0-flash");
        assert_eq!(config.llm_model.source, ConfigSource::Cli);
        assert_eq!(config.data_dir.value, PathBuf::from("data"));
        assert_eq!(config.llm_timeout_secs.source, ConfigSource::Default);
    }

    #[test]
    fn test_missing_api_key() {
        let config = LayeredConfig::with_defaults();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, GeomapError::LlmUnavailable { .. }));
        assert!(err.to_string().contains("GENAI_API_KEY"));
    }

    #[test]
    fn test_inspection_map_masks_key() {
        let mut config = LayeredConfig::with_defaults();
        config.llm_api_key.update(Some("abc".to_string()), ConfigSource::Cli);
        let map = config.to_inspection_map();

        let (key, source) = &map["llm_api_key"];
        assert_eq!(key, "********");
        assert_eq!(*source, ConfigSource::Cli);
        assert_eq!(map["llm_timeout_secs"].0, "30s");
        assert_eq!(map["font_path"].0, "(auto-detect)");
    }
}
