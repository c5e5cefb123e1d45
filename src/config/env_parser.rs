//! Environment variable overrides for configuration.

use crate::config::{Config, ProviderKind};
use crate::errors::Error;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;

/// Parse environment variable value or return error if empty/whitespace.
fn parse_env_string(name: &str, value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(value.trim().to_string())
}

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    let value = parse_env_string(name, value)?;
    Ok(paths::expanded(&PathBuf::from(value)))
}

/// Parse environment variable as a number.
fn parse_env_number<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_env_string(name, value)?
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {name} value: {e}")))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Apply `RECALL_*` environment variable overrides.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), Error> {
    if let Some(val) = env_var("RECALL_DATA_DIR") {
        config.data_dir = parse_env_path("RECALL_DATA_DIR", &val)?;
    }
    if let Some(val) = env_var("RECALL_PROVIDER") {
        config.provider = ProviderKind::from_str(&parse_env_string("RECALL_PROVIDER", &val)?)?;
    }
    if let Some(val) = env_var("RECALL_API_BASE") {
        config.api_base = Some(parse_env_string("RECALL_API_BASE", &val)?);
    }
    if let Some(val) = env_var("RECALL_EMBEDDING_MODEL") {
        config.embedding_model = Some(parse_env_string("RECALL_EMBEDDING_MODEL", &val)?);
    }
    if let Some(val) = env_var("RECALL_REQUEST_TIMEOUT") {
        config.request_timeout_secs = parse_env_number("RECALL_REQUEST_TIMEOUT", &val)?;
    }
    if let Some(val) = env_var("RECALL_MAX_RETRIES") {
        config.max_retries = parse_env_number("RECALL_MAX_RETRIES", &val)?;
    }
    Ok(())
}
