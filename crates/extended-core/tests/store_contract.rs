//! Integration tests for the key/value store port as seen through
//! `dyn KeyValueStore`, the way the settings registry consumes it.

use std::sync::Arc;

use extended_core::{KeyValueStore, MemoryStore, StoreError, StoredValue, TypedStore, ValueKind};

fn shared_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

#[test]
fn test_typed_accessors_work_through_trait_object() {
    let store = shared_store();

    store.put_bool("b", true).unwrap();
    store.put_int("i", -5).unwrap();
    store.put_long("l", i64::MAX).unwrap();
    store.put_float("f", 0.5).unwrap();
    store.put_string("s", "eXtended").unwrap();
    store.put_long_array("a", &[7, 8, 9]).unwrap();

    assert!(store.get_bool("b", false));
    assert_eq!(store.get_int("i", 0), -5);
    assert_eq!(store.get_long("l", 0), i64::MAX);
    assert_eq!(store.get_float("f", 0.0), 0.5);
    assert_eq!(store.get_string("s", ""), "eXtended");
    assert_eq!(store.get_long_array("a"), Some(vec![7, 8, 9]));
}

#[test]
fn test_absent_keys_yield_defaults_without_seeding() {
    let store = shared_store();

    assert!(store.get_bool("missing", true));
    assert_eq!(store.get_int("missing", 42), 42);
    assert_eq!(store.get_string("missing", "fallback"), "fallback");

    // Reading a default never writes it back.
    assert!(!store.contains("missing").unwrap());
}

#[test]
fn test_contains_does_not_trigger_default() {
    let store = shared_store();
    store.put_bool("show_ids", false).unwrap();

    assert!(store.contains("show_ids").unwrap());
    assert_eq!(store.try_get_bool("show_ids"), Ok(Some(false)));
}

#[test]
fn test_type_mismatch_reports_both_kinds() {
    let store = shared_store();
    store.put_long("ts", 1).unwrap();

    let err = store.try_get_int("ts").unwrap_err();

    assert_eq!(
        err,
        StoreError::TypeMismatch {
            key: "ts".to_string(),
            expected: ValueKind::Int,
            actual: ValueKind::Long,
        }
    );
    assert_eq!(err.to_string(), "value under \"ts\" is a long, expected int");
}

#[test]
fn test_batched_edit_and_remove() {
    let store = shared_store();
    store.put_int("legacy", 1).unwrap();

    store
        .edit()
        .remove("legacy")
        .put_int("version", 1)
        .put("show_ids", StoredValue::Bool(true))
        .apply()
        .unwrap();

    assert_eq!(store.keys().unwrap(), vec!["show_ids", "version"]);
    assert!(store.get_bool("show_ids", false));
}

#[test]
fn test_dropped_edit_writes_nothing() {
    let store = shared_store();

    let edit = store.edit().put_int("version", 1);
    assert_eq!(edit.len(), 1);
    drop(edit);

    assert!(!store.contains("version").unwrap());
}
