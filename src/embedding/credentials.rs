//! API key lookup and storage.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use tracing::debug;

use super::EmbeddingError;
use crate::errors::Error;

/// Environment variable that takes precedence over the key file.
pub const API_KEY_ENV: &str = "RECALL_API_KEY";

/// Where a provider gets its API key. Resolved on every call.
#[derive(Clone)]
pub enum Credentials {
    /// A key supplied directly.
    Key(String),
    /// `RECALL_API_KEY`, falling back to the key file.
    Environment { key_file: PathBuf },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Key(_) => f.write_str("Credentials::Key(<redacted>)"),
            Credentials::Environment { key_file } => f
                .debug_struct("Credentials::Environment")
                .field("key_file", key_file)
                .finish(),
        }
    }
}

impl Credentials {
    /// Resolve the API key.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::Unauthorized` if no non-empty key is available.
    pub fn api_key(&self) -> Result<String, EmbeddingError> {
        let key = match self {
            Credentials::Key(key) => key.trim().to_string(),
            Credentials::Environment { key_file } => match std::env::var(API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
                _ => read_key_file(key_file)?,
            },
        };

        if key.is_empty() {
            return Err(EmbeddingError::Unauthorized(
                "API key is empty; run `recall set-key <KEY>`".to_string(),
            ));
        }
        Ok(key)
    }
}

fn read_key_file(path: &Path) -> Result<String, EmbeddingError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(EmbeddingError::Unauthorized(format!(
                "no API key configured; set {API_KEY_ENV} or run `recall set-key <KEY>`"
            )))
        }
        Err(e) => Err(EmbeddingError::Unauthorized(format!(
            "failed to read API key file {}: {e}",
            path.display()
        ))),
    }
}

/// Write `key` to `key_file`, readable only by the owner on Unix.
///
/// # Errors
///
/// Returns `Error::EmptyInput` for a blank key and `Error::Io` if the file
/// cannot be written.
pub fn store_api_key(key_file: &Path, key: &str) -> Result<(), Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::EmptyInput);
    }

    if let Some(parent) = key_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(key_file)?;
    file.write_all(key.as_bytes())?;
    file.flush()?;

    debug!(path = %key_file.display(), "stored API key");
    Ok(())
}
