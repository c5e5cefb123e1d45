//! SQLite-backed record store.
//!
//! This module provides:
//! - `RecordStore`: durable, append-only collection of `MemoryRecord`s
//! - `StoreError`: I/O, corruption and dimensionality failures
//! - `codec`: embedding BLOB conversion
//!
//! The store's embedding dimensionality `D` is recorded in `store_meta` by the
//! first append and checked on every later append and on load.

pub mod codec;

use std::path::{Component, Path};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use thiserror::Error;
use tracing::debug;

use crate::memory_types::MemoryRecord;

/// How long a writer waits for another process holding the store lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DIMENSIONS_KEY: &str = "dimensions";

/// Largest embedding dimensionality the store accepts.
pub const MAX_DIMENSIONS: usize = 1 << 16;

/// Error types for record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the database failed. Prior state is left intact.
    #[error("I/O failure: {0}")]
    Io(String),

    /// Persisted state cannot be trusted.
    #[error("corrupt store{}: {reason}", location(.id))]
    Corrupt { id: Option<i64>, reason: String },

    /// An embedding does not match the store's dimensionality.
    #[error(
        "embedding has {actual} dimensions but the store holds {expected}-dimensional embeddings"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    /// An embedding that can never be stored (empty, NaN, infinite).
    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),

    /// Store path rejected before opening.
    #[error("invalid store path: {0}")]
    InvalidPath(String),
}

fn location(id: &Option<i64>) -> String {
    match id {
        Some(id) => format!(" at record {id}"),
        None => String::new(),
    }
}

impl StoreError {
    /// Attach the offending record id to a corruption error.
    fn for_record(self, record_id: i64) -> Self {
        match self {
            StoreError::Corrupt { id: None, reason } => StoreError::Corrupt {
                id: Some(record_id),
                reason,
            },
            other => other,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => StoreError::Corrupt {
                id: None,
                reason: err.to_string(),
            },
            _ => StoreError::Io(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable, append-only memory collection in a single SQLite file.
pub struct RecordStore {
    conn: Connection,
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS memories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            command_text TEXT NOT NULL,
            description_text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS store_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Read the recorded dimensionality, if any record was ever written.
fn read_dimensions(conn: &Connection) -> Result<Option<usize>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = ?1",
            [DIMENSIONS_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(dims) if (1..=MAX_DIMENSIONS).contains(&dims) => Ok(Some(dims)),
            _ => Err(StoreError::Corrupt {
                id: None,
                reason: format!("invalid recorded dimensionality {raw:?}"),
            }),
        },
    }
}

/// Row values that fail to convert mean the file was tampered with, not an I/O problem.
fn decode_failure(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Corrupt {
            id: None,
            reason: err.to_string(),
        },
        other => other.into(),
    }
}

impl RecordStore {
    /// Open or create the store at `path` and validate its contents.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The path contains `..` components
    /// - The database cannot be opened or the schema created
    /// - Persisted records fail validation (see [`RecordStore::load`])
    pub fn open(path: &Path) -> Result<Self> {
        if path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(StoreError::InvalidPath(format!(
                "{} contains '..'",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        create_schema(&conn)?;

        let store = Self { conn };
        store.load()?;
        debug!(path = %path.display(), "opened record store");
        Ok(store)
    }

    /// Validate the persisted state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` naming the first bad record if an
    /// embedding's length disagrees with the recorded dimensionality, records
    /// exist without a recorded dimensionality, or a value cannot be decoded.
    pub fn load(&self) -> Result<()> {
        let records = self.all()?;
        debug!(records = records.len(), "validated record store");
        Ok(())
    }

    /// The store's embedding dimensionality, `None` until the first append.
    pub fn dimensions(&self) -> Result<Option<usize>> {
        read_dimensions(&self.conn)
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append a record and return its id.
    ///
    /// Runs in an exclusive transaction, so concurrent writers from other
    /// processes are serialised and a failed write leaves no partial record.
    /// The first append fixes the store's dimensionality.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidEmbedding` for an empty or non-finite embedding
    /// - `StoreError::DimensionMismatch` if the length differs from the store's
    /// - `StoreError::Io` if the write or commit fails
    pub fn append(
        &mut self,
        command_text: &str,
        description_text: &str,
        embedding: &[f32],
    ) -> Result<i64> {
        if embedding.is_empty() {
            return Err(StoreError::InvalidEmbedding(
                "embedding has no components".to_string(),
            ));
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(StoreError::InvalidEmbedding(
                "embedding contains NaN or infinite values".to_string(),
            ));
        }
        if embedding.len() > MAX_DIMENSIONS {
            return Err(StoreError::InvalidEmbedding(format!(
                "embedding has {} components, at most {MAX_DIMENSIONS} are supported",
                embedding.len()
            )));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match read_dimensions(&tx)? {
            Some(expected) if expected != embedding.len() => {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            Some(_) => {}
            None => {
                tx.execute(
                    "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
                    params![DIMENSIONS_KEY, embedding.len().to_string()],
                )?;
            }
        }

        let blob = codec::vec_to_blob(embedding);
        let now = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO memories (command_text, description_text, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![command_text, description_text, &blob, &now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, dims = embedding.len(), "appended memory");
        Ok(id)
    }

    /// Every record in insertion order.
    ///
    /// Reads inside one transaction so a concurrent first append cannot be
    /// observed half-way (a record without a recorded dimensionality).
    pub fn all(&self) -> Result<Vec<MemoryRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let dims = read_dimensions(&tx)?;

        let mut records = Vec::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT id, command_text, description_text, embedding, created_at
                FROM memories
                ORDER BY id ASC
                "#,
            )?;

            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            for row in rows {
                let (id, command_text, description_text, blob, created_at) =
                    row.map_err(decode_failure)?;

                let Some(dims) = dims else {
                    return Err(StoreError::Corrupt {
                        id: Some(id),
                        reason: "record present but no dimensionality recorded".to_string(),
                    });
                };
                let embedding =
                    codec::blob_to_vec(&blob, dims).map_err(|e| e.for_record(id))?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| StoreError::Corrupt {
                        id: Some(id),
                        reason: format!("invalid timestamp {created_at:?}: {e}"),
                    })?
                    .with_timezone(&Utc);

                records.push(MemoryRecord {
                    id,
                    command_text,
                    description_text,
                    embedding,
                    created_at,
                });
            }
        }
        tx.commit()?;

        Ok(records)
    }
}
