//! # extended-core
//!
//! Shared library for eXtended containing the closed table of boolean
//! settings, the typed values a settings store can hold, the binary value
//! codec, and the key/value store port that persistence adapters implement.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or storage
//! engines.
//!
//! # Architecture overview
//!
//! eXtended adds a handful of boolean switches to a messaging client.  Each
//! switch is persisted in an embedded ordered key/value store and can notify
//! interested parts of the app when it flips.
//!
//! - **`domain`** – The setting definitions.  Every setting is a row in an
//!   immutable table (key, default, notify flag) addressed through a `Copy`
//!   enum.  The mutable current values live elsewhere (in the registry of the
//!   `extended-settings` crate), never inside the type definitions.
//!
//! - **`storage`** – How values reach disk.  [`KeyValueStore`] is the port a
//!   storage engine implements; [`TypedStore`] layers the typed
//!   `get_bool`/`put_int`/... accessors and batched edits on top of any
//!   store; the `codec` module turns a [`StoredValue`] into bytes and back.

pub mod domain;
pub mod storage;

// Re-export the most-used types at the crate root so callers can write
// `extended_core::Setting` instead of `extended_core::domain::setting::Setting`.
pub use domain::setting::{Setting, SettingDef, SettingSet, VERSION_KEY};
pub use storage::codec::{decode_value, encode_value, CodecError};
pub use storage::memory::MemoryStore;
pub use storage::store::{Edit, EditOp, KeyValueStore, StoreError, TypedStore};
pub use storage::value::{StoredValue, ValueKind};
