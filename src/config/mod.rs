//! Configuration system for recall.

mod env_parser;
mod loader;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;

use crate::embedding::{ollama, openai};
use crate::errors::Error;
use crate::memory::RetryPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use loader::ConfigFile;

/// Store file name inside the data directory.
const STORE_FILE: &str = "memories.db";
/// API key file name inside the data directory.
const API_KEY_FILE: &str = "api_key";

/// Embedding provider backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ProviderKind {
    /// OpenAI or any OpenAI-compatible `/embeddings` endpoint.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama server.
    #[serde(rename = "ollama")]
    Ollama,
}

impl ProviderKind {
    fn default_api_base(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_API_BASE,
            ProviderKind::Ollama => ollama::DEFAULT_API_BASE,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "text-embedding-ada-002",
            ProviderKind::Ollama => "nomic-embed-text",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(Error::Config(format!(
                "Unknown provider '{other}' (expected 'openai' or 'ollama')"
            ))),
        }
    }
}

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the store and the API key file.
    pub data_dir: PathBuf,

    /// Embedding provider backend.
    pub provider: ProviderKind,

    /// Provider base URL; `None` uses the provider's default.
    pub api_base: Option<String>,

    /// Embedding model; `None` uses the provider's default.
    pub embedding_model: Option<String>,

    /// Upper bound on a single embedding request.
    pub request_timeout_secs: u64,

    /// Retries for rate-limited or unavailable providers.
    pub max_retries: u32,

    /// First retry delay; doubles on each further retry.
    pub initial_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            data_dir: home.join(".recall"),
            provider: ProviderKind::OpenAi,
            api_base: None,
            embedding_model: None,
            request_timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        Self::from_layers(loader::load_from_file()?)
    }

    fn from_layers(file_config: Option<ConfigFile>) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(mut file) = file_config {
            paths::expand_tilde(&mut file.data_dir);
            config.merge_from_file(file);
        }

        env_parser::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if !file.data_dir.as_os_str().is_empty() {
            self.data_dir = file.data_dir;
        }
        if let Some(provider) = file.provider {
            self.provider = provider;
        }
        if file.api_base.is_some() {
            self.api_base = file.api_base;
        }
        if file.embedding_model.is_some() {
            self.embedding_model = file.embedding_model;
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(retries) = file.max_retries {
            self.max_retries = retries;
        }
        if let Some(backoff) = file.initial_backoff_ms {
            self.initial_backoff_ms = backoff;
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            data_dir: self.data_dir.clone(),
            api_base: self.api_base(),
            embedding_model: self.embedding_model().to_string(),
            request_timeout_secs: self.request_timeout_secs,
            max_retries: self.max_retries,
            initial_backoff_ms: self.initial_backoff_ms,
        };

        validator.validate()
    }

    /// Path of the SQLite store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Path of the stored API key.
    pub fn api_key_path(&self) -> PathBuf {
        self.data_dir.join(API_KEY_FILE)
    }

    /// Provider base URL, falling back to the provider default.
    pub fn api_base(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| self.provider.default_api_base().to_string())
    }

    /// Embedding model, falling back to the provider default.
    pub fn embedding_model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Backoff policy for retryable embedding failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create data directory {}: {e}",
                self.data_dir.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tests_utils::{ENV_MUTEX, cleanup_env_vars};

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.data_dir.ends_with(".recall"));
        assert!(config.store_path().ends_with(".recall/memories.db"));
        assert!(config.api_key_path().ends_with(".recall/api_key"));
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.api_base(), "https://api.openai.com/v1");
        assert_eq!(config.embedding_model(), "text-embedding-ada-002");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_provider_defaults_follow_provider() {
        let config = Config {
            provider: ProviderKind::Ollama,
            ..Config::default()
        };
        assert_eq!(config.api_base(), "http://localhost:11434");
        assert_eq!(config.embedding_model(), "nomic-embed-text");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" ollama ".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!(matches!(
            "cohere".parse::<ProviderKind>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let file: ConfigFile = toml::from_str(
            r#"
            data_dir = "/srv/recall"
            provider = "ollama"
            embedding_model = "mxbai-embed-large"
            max_retries = 5
            "#,
        )
        .unwrap();
        let config = Config::from_layers(Some(file)).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/recall"));
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.embedding_model(), "mxbai-embed-large");
        assert_eq!(config.api_base(), "http://localhost:11434");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        // SAFETY: env mutation is serialized by ENV_MUTEX.
        unsafe {
            std::env::set_var("RECALL_DATA_DIR", "/tmp/recall-env");
            std::env::set_var("RECALL_REQUEST_TIMEOUT", "5");
        }

        let file: ConfigFile = toml::from_str(
            r#"
            data_dir = "/srv/recall"
            request_timeout_secs = 60
            "#,
        )
        .unwrap();
        let config = Config::from_layers(Some(file)).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/recall-env"));
        assert_eq!(config.request_timeout_secs, 5);

        cleanup_env_vars();
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let file: ConfigFile = toml::from_str("request_timeout_secs = 0").unwrap();
        assert!(matches!(
            Config::from_layers(Some(file)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = Config {
            max_retries: 1,
            initial_backoff_ms: 20,
            ..Config::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.initial_backoff, Duration::from_millis(20));
    }

    #[test]
    fn test_ensure_directories_creates_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().join("a/b"),
            ..Config::default()
        };
        config.ensure_directories().unwrap();
        assert!(config.data_dir.is_dir());
    }
}
