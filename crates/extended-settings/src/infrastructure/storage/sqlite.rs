//! SQLite-backed [`KeyValueStore`].
//!
//! The database holds one table:
//!
//! ```sql
//! CREATE TABLE entries (key TEXT PRIMARY KEY, value BLOB NOT NULL) WITHOUT ROWID;
//! ```
//!
//! Values are stored in the compact tagged encoding from
//! `extended_core::storage::codec`, so the table never needs to change when a
//! new value kind is stored.  `WITHOUT ROWID` keeps rows clustered by key,
//! which makes [`KeyValueStore::keys`] an ordered index scan.
//!
//! # Error routing
//!
//! Every engine error goes through the [`StoreErrorHandler`] before it is
//! returned.  Corruption-class errors (and every failure to open) are
//! reported as fatal; the rest are ordinary errors.  The default handler,
//! [`LoggingErrorHandler`], only logs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use extended_core::{decode_value, encode_value, EditOp, KeyValueStore, StoreError, StoredValue};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, error, info, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entries (
        key   TEXT PRIMARY KEY NOT NULL,
        value BLOB NOT NULL
    ) WITHOUT ROWID;
";

/// Receives storage engine errors as they happen.
#[cfg_attr(test, mockall::automock)]
pub trait StoreErrorHandler: Send + Sync {
    /// The store itself is compromised: it could not be opened, or the
    /// engine reported corruption or an I/O failure.
    fn on_fatal_error(&self, error: &StoreError);

    /// A single operation (`op`) failed; the store remains usable.
    fn on_error(&self, op: &str, error: &StoreError);
}

/// Logs fatal errors at `error` and everything else at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl StoreErrorHandler for LoggingErrorHandler {
    fn on_fatal_error(&self, error: &StoreError) {
        error!("Settings store failure: {error}");
    }

    fn on_error(&self, op: &str, error: &StoreError) {
        warn!("Settings store {op} failed: {error}");
    }
}

/// Key/value store persisted in a single SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    handler: Arc<dyn StoreErrorHandler>,
}

impl SqliteStore {
    /// Opens (or creates) the database `<dir>/<db_name>`.
    ///
    /// `dir` must already exist.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`StoreError::Backend`] if the file cannot be opened,
    /// is not a database, or the schema cannot be created.  The handler's
    /// `on_fatal_error` has been called by then.
    pub fn open(
        dir: &Path,
        db_name: &str,
        handler: Arc<dyn StoreErrorHandler>,
    ) -> Result<Self, StoreError> {
        let path = dir.join(db_name);
        let conn = Connection::open(&path)
            .and_then(|conn| {
                conn.execute_batch(
                    "
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                    ",
                )?;
                conn.execute_batch(SCHEMA)?;
                Ok(conn)
            })
            .map_err(|e| open_failure(&*handler, &path, e))?;

        info!("Settings store opened: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
            handler,
        })
    }

    /// Creates a store that lives only as long as this value.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`StoreError::Backend`] if SQLite cannot allocate the
    /// database.
    pub fn open_in_memory(handler: Arc<dyn StoreErrorHandler>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .and_then(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(conn)
            })
            .map_err(|e| open_failure(&*handler, Path::new(":memory:"), e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
            handler,
        })
    }

    /// Location of the database file; `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classifies an engine error and routes it to the handler.
    fn report(&self, op: &str, e: rusqlite::Error) -> StoreError {
        let err = classify(e);
        if err.is_fatal() {
            self.handler.on_fatal_error(&err);
        } else {
            self.handler.on_error(op, &err);
        }
        err
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        let bytes: Option<Vec<u8>> = self
            .lock()
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| self.report("get", e))?;

        bytes
            .map(|bytes| {
                decode_value(&bytes).map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.lock()
            .execute(
                "INSERT OR REPLACE INTO entries (key, value) VALUES (?1, ?2)",
                params![key, encode_value(&value)],
            )
            .map_err(|e| self.report("put", e))?;
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        self.lock()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM entries WHERE key = ?1)",
                params![key],
                |row| row.get(0),
            )
            .map_err(|e| self.report("contains", e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()
            .execute("DELETE FROM entries WHERE key = ?1", params![key])
            .map_err(|e| self.report("remove", e))?;
        Ok(())
    }

    fn apply(&self, ops: Vec<EditOp>) -> Result<(), StoreError> {
        let count = ops.len();
        let mut conn = self.lock();

        // Dropping the transaction on an early return rolls it back.
        let result = conn.transaction().and_then(|tx| {
            for op in &ops {
                match op {
                    EditOp::Put { key, value } => tx.execute(
                        "INSERT OR REPLACE INTO entries (key, value) VALUES (?1, ?2)",
                        params![key, encode_value(value)],
                    )?,
                    EditOp::Remove { key } => {
                        tx.execute("DELETE FROM entries WHERE key = ?1", params![key])?
                    }
                };
            }
            tx.commit()
        });
        drop(conn);

        result.map_err(|e| self.report("apply", e))?;
        debug!("Applied {count} batched operation(s)");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock();
        let result = conn
            .prepare("SELECT key FROM entries ORDER BY key")
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            });
        drop(conn);
        result.map_err(|e| self.report("keys", e))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn classify(e: rusqlite::Error) -> StoreError {
    let fatal = matches!(
        e.sqlite_error_code(),
        Some(
            ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
        )
    );
    StoreError::Backend {
        message: e.to_string(),
        fatal,
    }
}

fn open_failure(handler: &dyn StoreErrorHandler, path: &Path, e: rusqlite::Error) -> StoreError {
    let err = StoreError::Backend {
        message: format!("cannot open {}: {e}", path.display()),
        fatal: true,
    };
    handler.on_fatal_error(&err);
    err
}

// ── Tests ─────────────────────────────────────────────────────────────────────
