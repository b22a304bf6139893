//! Storage port and value model.
//!
//! - `value`  – the typed values a store holds.
//! - `codec`  – byte encoding of a value for engines that store blobs.
//! - `store`  – the [`KeyValueStore`] port, typed accessors and batched edits.
//! - `memory` – an in-process ordered store for tests and ephemeral use.

pub mod codec;
pub mod memory;
pub mod store;
pub mod value;

pub use codec::{decode_value, encode_value, CodecError};
pub use memory::MemoryStore;
pub use store::{Edit, EditOp, KeyValueStore, StoreError, TypedStore};
pub use value::{StoredValue, ValueKind};
