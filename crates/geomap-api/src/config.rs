use std::env;
use std::path::PathBuf;

use geomap_core::config::LayeredConfig;
use geomap_core::error::Result;

/// Default config file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "geomap.toml";

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Model, credential, data directory and font settings shared with the CLI
    pub geomap: LayeredConfig,
}

impl ApiConfig {
    /// Load configuration: `GEOMAP_CONFIG` or `geomap.toml` when present, then the environment
    pub fn from_env() -> Result<Self> {
        let port = match env::var("GEOMAP_PORT") {
            Ok(p) => p.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid GEOMAP_PORT value '{}', using 3001", p);
                3001
            }),
            Err(_) => 3001,
        };

        let cors_origin =
            env::var("GEOMAP_CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let config_file = env::var("GEOMAP_CONFIG").map(PathBuf::from).ok().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

        let mut geomap = LayeredConfig::with_defaults();
        if let Some(path) = config_file {
            geomap = geomap.load_from_file(&path)?;
        }
        let geomap = geomap.load_from_env();

        Ok(Self { port, cors_origin, geomap })
    }

    /// Configuration with defaults only, rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut geomap = LayeredConfig::with_defaults();
        geomap.data_dir.value = data_dir.into();
        Self { port: 3001, cors_origin: "http://localhost:3000".to_string(), geomap }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.geomap.data_dir.value
    }
}
