//! Storage infrastructure: where settings live on disk.
//!
//! - `config` reads and writes the TOML app config that locates the
//!   settings database and sets the log level.
//! - `sqlite` is the on-disk `KeyValueStore` adapter.
//! - `schema` keeps the persisted layout version marker current.
//!
//! Nothing outside this module knows that the store is SQLite; the rest of
//! the crate talks to `Arc<dyn KeyValueStore>`.

pub mod config;
pub mod schema;
pub mod sqlite;

pub use sqlite::{LoggingErrorHandler, SqliteStore, StoreErrorHandler};
