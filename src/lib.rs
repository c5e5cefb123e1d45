//! recall - remember shell commands by what they do.
//!
//! Commands are stored with a natural-language description. The description
//! is embedded by a remote provider and persisted in a local SQLite store;
//! queries are embedded the same way and ranked by exact cosine similarity
//! against every stored description. All operations are synchronous.
//!
//! # Example
//!
//! ```no_run
//! use recall::{Config, MemoryService, RecordStore, embedding};
//!
//! let config = Config::load()?;
//! config.ensure_directories()?;
//!
//! let store = RecordStore::open(&config.store_path())?;
//! let embedder = embedding::from_config(&config)?;
//! let mut service = MemoryService::new(store, embedder, config.retry_policy());
//!
//! service.insert("git diff HEAD^ HEAD", "show diff between last commit and current commit")?;
//!
//! if let Some(best) = service.get_best("diff between commits")? {
//!     println!("{}", best.record.command_text);
//! }
//! # Ok::<(), recall::Error>(())
//! ```

pub mod commands;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod memory;
pub mod memory_types;
pub mod output;
pub mod similarity;
pub mod store;

// Re-export public API
pub use config::{Config, ProviderKind};
pub use embedding::{Credentials, Embedder, EmbeddingError, OllamaEmbedder, OpenAiEmbedder};
pub use errors::Error;
pub use memory::{DEFAULT_QUERY_LIMIT, MAX_INPUT_LENGTH, MAX_SEARCH_LIMIT, MemoryService, RetryPolicy};
pub use memory_types::{MemoryRecord, ScoredMemory};
pub use store::{RecordStore, StoreError};
