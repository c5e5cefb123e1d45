//! Configuration validation logic.

use crate::errors::Error;
use std::path::PathBuf;

/// Longest accepted request timeout.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
/// Most retries accepted for one embedding call.
const MAX_RETRIES: u32 = 10;
/// Longest accepted initial backoff.
const MAX_INITIAL_BACKOFF_MS: u64 = 60_000;

/// Validates resolved configuration values.
pub struct ConfigValidator {
    pub data_dir: PathBuf,
    pub api_base: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl ConfigValidator {
    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_data_dir()?;
        self.validate_api_base()?;
        self.validate_embedding_model()?;
        self.validate_retry_settings()?;

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "Invalid request timeout: {}s (must be between 1 and {MAX_REQUEST_TIMEOUT_SECS})",
                self.request_timeout_secs
            )));
        }

        Ok(())
    }

    fn validate_data_dir(&self) -> Result<(), Error> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }
        Ok(())
    }

    fn validate_api_base(&self) -> Result<(), Error> {
        let url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("Invalid API base '{}': {e}", self.api_base)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Invalid API base '{}': scheme must be http or https",
                self.api_base
            )));
        }
        Ok(())
    }

    fn validate_embedding_model(&self) -> Result<(), Error> {
        if self.embedding_model.trim().is_empty() {
            return Err(Error::Config("Embedding model cannot be empty".to_string()));
        }
        Ok(())
    }

    fn validate_retry_settings(&self) -> Result<(), Error> {
        if self.max_retries > MAX_RETRIES {
            return Err(Error::Config(format!(
                "Invalid max retries: {} (must be at most {MAX_RETRIES})",
                self.max_retries
            )));
        }
        if self.initial_backoff_ms > MAX_INITIAL_BACKOFF_MS {
            return Err(Error::Config(format!(
                "Invalid initial backoff: {}ms (must be at most {MAX_INITIAL_BACKOFF_MS})",
                self.initial_backoff_ms
            )));
        }
        Ok(())
    }
}
