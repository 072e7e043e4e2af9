//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use geomap_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "geomap.toml";

/// Load layered configuration: defaults, config file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file(cli.config.as_deref()) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        llm_model: cli.model.clone(),
        font_path: cli.font.clone(),
        ..Default::default()
    });
    Ok(config)
}

/// The explicit config file, or `geomap.toml` in the working directory when it exists
fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}
