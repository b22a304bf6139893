//! The key/value store port.
//!
//! [`KeyValueStore`] is the minimal surface a storage engine adapter provides:
//! untyped get/put/contains/remove, an atomic batch apply, and ordered key
//! listing.  [`TypedStore`] is blanket-implemented on top of it and gives
//! every store (including `dyn KeyValueStore`) the typed accessors and the
//! batched [`Edit`] handle.
//!
//! # Read policy
//!
//! `try_get_*` accessors report everything: `Ok(None)` for an absent key,
//! `Err(TypeMismatch)` when a different kind is stored, engine errors as-is.
//! `get_*(key, default)` accessors never fail; an absent key yields the
//! default silently and an unreadable one yields the default with a warning.

use thiserror::Error;
use tracing::warn;

use crate::storage::codec::CodecError;
use crate::storage::value::{StoredValue, ValueKind};

/// Error type for store operations.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// The key holds a value of a different kind than requested.
    #[error("value under {key:?} is a {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The stored bytes for the key could not be decoded.
    #[error("value under {key:?} cannot be decoded: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: CodecError,
    },

    /// The storage engine reported an error.
    ///
    /// `fatal` marks errors that compromise the store itself (corruption,
    /// unreadable database file); everything else is a logged warning.
    #[error("storage engine error: {message}")]
    Backend { message: String, fatal: bool },
}

impl StoreError {
    /// Returns `true` if the error leaves the store unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Backend { fatal: true, .. })
    }
}

/// One operation inside a batched edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Put { key: String, value: StoredValue },
    Remove { key: String },
}

impl EditOp {
    /// Key this operation touches.
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// Persisted key/value store port.
///
/// Implementations must be safe to share between threads; every method takes
/// `&self`.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value of any kind.
    fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError>;

    /// Returns `true` if `key` holds a value.  Never substitutes a default.
    fn contains(&self, key: &str) -> Result<bool, StoreError>;

    /// Deletes `key`.  Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Applies `ops` in order as one atomic unit: all of them or none.
    fn apply(&self, ops: Vec<EditOp>) -> Result<(), StoreError>;

    /// Returns every stored key in ascending byte order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Typed accessors and batched edits for any [`KeyValueStore`].
pub trait TypedStore: KeyValueStore {
    fn try_get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        typed_get(self, key, ValueKind::Bool, |v| v.as_bool())
    }

    /// Returns the bool under `key`, or `default` if absent or unreadable.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        or_default(key, self.try_get_bool(key), default)
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(key, StoredValue::Bool(value))
    }

    fn try_get_int(&self, key: &str) -> Result<Option<i32>, StoreError> {
        typed_get(self, key, ValueKind::Int, |v| v.as_int())
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        or_default(key, self.try_get_int(key), default)
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), StoreError> {
        self.put(key, StoredValue::Int(value))
    }

    fn try_get_long(&self, key: &str) -> Result<Option<i64>, StoreError> {
        typed_get(self, key, ValueKind::Long, |v| v.as_long())
    }

    fn get_long(&self, key: &str, default: i64) -> i64 {
        or_default(key, self.try_get_long(key), default)
    }

    fn put_long(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.put(key, StoredValue::Long(value))
    }

    fn try_get_float(&self, key: &str) -> Result<Option<f32>, StoreError> {
        typed_get(self, key, ValueKind::Float, |v| v.as_float())
    }

    fn get_float(&self, key: &str, default: f32) -> f32 {
        or_default(key, self.try_get_float(key), default)
    }

    fn put_float(&self, key: &str, value: f32) -> Result<(), StoreError> {
        self.put(key, StoredValue::Float(value))
    }

    fn try_get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        typed_get(self, key, ValueKind::String, StoredValue::into_string)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        or_default(key, self.try_get_string(key), default.to_string())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.put(key, StoredValue::String(value.to_string()))
    }

    fn try_get_long_array(&self, key: &str) -> Result<Option<Vec<i64>>, StoreError> {
        typed_get(self, key, ValueKind::LongArray, StoredValue::into_long_array)
    }

    /// Returns the array under `key`, or `None` if absent or unreadable.
    fn get_long_array(&self, key: &str) -> Option<Vec<i64>> {
        or_default(key, self.try_get_long_array(key).map(|v| v.map(Some)), None)
    }

    fn put_long_array(&self, key: &str, value: &[i64]) -> Result<(), StoreError> {
        self.put(key, StoredValue::LongArray(value.to_vec()))
    }

    /// Starts a batched edit.  Nothing is written until [`Edit::apply`].
    fn edit(&self) -> Edit<'_, Self> {
        Edit::new(self)
    }
}

impl<T: KeyValueStore + ?Sized> TypedStore for T {}

fn typed_get<S, T>(
    store: &S,
    key: &str,
    expected: ValueKind,
    extract: impl FnOnce(StoredValue) -> Option<T>,
) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(value) = store.get(key)? else {
        return Ok(None);
    };
    let actual = value.kind();
    extract(value)
        .map(Some)
        .ok_or_else(|| StoreError::TypeMismatch {
            key: key.to_string(),
            expected,
            actual,
        })
}

fn or_default<T>(key: &str, result: Result<Option<T>, StoreError>, default: T) -> T {
    match result {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("unreadable value under {key:?}, using default: {e}");
            default
        }
    }
}

// ── Batched edit ──────────────────────────────────────────────────────────────

/// A batch of writes applied atomically by [`Edit::apply`].
///
/// ```rust
/// use extended_core::{MemoryStore, TypedStore};
///
/// let store = MemoryStore::new();
/// store.edit().put_int("version", 1).put_bool("show_ids", true).apply().unwrap();
/// assert_eq!(store.get_int("version", 0), 1);
/// ```
#[must_use = "an edit writes nothing until `apply` is called"]
pub struct Edit<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    ops: Vec<EditOp>,
}

impl<'a, S: KeyValueStore + ?Sized> Edit<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    pub fn put(mut self, key: &str, value: impl Into<StoredValue>) -> Self {
        self.ops.push(EditOp::Put {
            key: key.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn put_bool(self, key: &str, value: bool) -> Self {
        self.put(key, value)
    }

    pub fn put_int(self, key: &str, value: i32) -> Self {
        self.put(key, value)
    }

    pub fn put_long(self, key: &str, value: i64) -> Self {
        self.put(key, value)
    }

    pub fn put_float(self, key: &str, value: f32) -> Self {
        self.put(key, value)
    }

    pub fn put_string(self, key: &str, value: &str) -> Self {
        self.put(key, value)
    }

    pub fn put_long_array(self, key: &str, value: &[i64]) -> Self {
        self.put(key, value.to_vec())
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.ops.push(EditOp::Remove {
            key: key.to_string(),
        });
        self
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Writes every queued operation as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`StoreError`]; in that case none of the
    /// operations are visible.
    pub fn apply(self) -> Result<(), StoreError> {
        if self.ops.is_empty() {
            return Ok(());
        }
        self.store.apply(self.ops)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
