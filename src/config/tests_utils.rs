//! Shared test utilities for config module tests.

use std::sync::Mutex;

/// Serializes tests that mutate process environment variables.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Every variable read by the config layer.
pub const RECALL_ENV_VARS: [&str; 6] = [
    "RECALL_DATA_DIR",
    "RECALL_PROVIDER",
    "RECALL_API_BASE",
    "RECALL_EMBEDDING_MODEL",
    "RECALL_REQUEST_TIMEOUT",
    "RECALL_MAX_RETRIES",
];

/// Remove every recall config variable. Call with `ENV_MUTEX` held.
pub fn cleanup_env_vars() {
    for var in RECALL_ENV_VARS {
        // SAFETY: callers hold ENV_MUTEX, so no other test touches the environment.
        unsafe { std::env::remove_var(var) };
    }
}
