//! Tilde (`~`) expansion for configured paths.

use std::path::{Path, PathBuf};

/// Replace a leading `~` with the home directory, in place.
pub fn expand_tilde(path: &mut PathBuf) {
    *path = expanded(path);
}

/// A copy of `path` with a leading `~` replaced by the home directory.
pub fn expanded(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
