//! Configuration file loading and parsing.

use crate::config::ProviderKind;
use crate::errors::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loaded from TOML file. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub provider: Option<ProviderKind>,

    #[serde(default)]
    pub api_base: Option<String>,

    #[serde(default)]
    pub embedding_model: Option<String>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub max_retries: Option<u32>,

    #[serde(default)]
    pub initial_backoff_ms: Option<u64>,
}

/// Default config file location: `<config_dir>/recall/config.toml`.
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));
    config_dir.join("recall/config.toml")
}

/// Load configuration from the default TOML file, if present.
pub fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    load_from_path(&default_config_path())
}

/// Load configuration from `config_path`; `Ok(None)` if it does not exist.
pub fn load_from_path(config_path: &Path) -> Result<Option<ConfigFile>, Error> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            config_path.display()
        ))
    })?;

    Ok(Some(config))
}
