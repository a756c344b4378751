//! Tests for the value store.

use super::*;
use crate::backend::{FsBackend, MemoryBackend, ObjectBackend};
use crate::error::StoreError;
use crate::keys::KeyMapper;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_store() -> (MemoryBackend, ValueStore) {
    let backend = MemoryBackend::new();
    let store = ValueStore::new(Arc::new(backend.clone()), KeyMapper::default());
    (backend, store)
}

#[test]
fn test_store_then_load_round_trips() {
    let (_backend, store) = memory_store();
    let value: Vec<u8> = (0..=255).collect();

    store.store("certificates/acme/a.crt", &value).unwrap();
    assert_eq!(store.load("certificates/acme/a.crt").unwrap(), value);
}

#[test]
fn test_empty_value_round_trips() {
    let (_backend, store) = memory_store();
    store.store("empty", b"").unwrap();
    assert!(store.load("empty").unwrap().is_empty());
    assert!(store.exists("empty"));
}

#[test]
fn test_store_writes_under_prefix() {
    let (backend, store) = memory_store();
    store.store("a/b", b"x").unwrap();
    assert!(backend.exists("certmagic/a/b").unwrap());
}

#[test]
fn test_store_overwrites() {
    let (_backend, store) = memory_store();
    store.store("k", b"first").unwrap();
    store.store("k", b"second").unwrap();
    assert_eq!(store.load("k").unwrap(), b"second");
}

#[test]
fn test_load_missing_is_not_found() {
    let (_backend, store) = memory_store();
    let err = store.load("missing").unwrap_err();
    match err {
        StoreError::NotFound { path } => assert_eq!(path, "certmagic/missing"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_delete_missing_is_ok() {
    let (_backend, store) = memory_store();
    store.delete("never-written").unwrap();

    store.store("k", b"v").unwrap();
    store.delete("k").unwrap();
    assert!(!store.exists("k"));
}

#[test]
fn test_exists_reports_absent_on_backend_error() {
    let (backend, store) = memory_store();
    store.store("k", b"v").unwrap();

    backend.set_outage(true);
    assert!(!store.exists("k"));

    backend.set_outage(false);
    assert!(store.exists("k"));
}

#[test]
fn test_other_operations_propagate_backend_errors() {
    let (backend, store) = memory_store();
    backend.set_outage(true);

    assert!(matches!(store.store("k", b"v"), Err(StoreError::Io { .. })));
    assert!(matches!(store.load("k"), Err(StoreError::Io { .. })));
    assert!(matches!(store.delete("k"), Err(StoreError::Io { .. })));
    assert!(matches!(store.list("", false), Err(StoreError::Io { .. })));
    assert!(matches!(store.stat("k"), Err(StoreError::Io { .. })));
}

#[test]
fn test_stat_reports_size_and_key() {
    let (_backend, store) = memory_store();
    store.store("acme/a.key", b"12345").unwrap();

    let info = store.stat("acme/a.key").unwrap();
    assert_eq!(info.key, "acme/a.key");
    assert_eq!(info.size, 5);
    assert!(info.is_terminal);

    assert!(store.stat("acme/missing").unwrap_err().is_not_found());
}

#[test]
fn test_list_respects_trailing_separator() {
    let (_backend, store) = memory_store();
    store.store("acme/a.crt", b"1").unwrap();
    store.store("acme/sub/b.crt", b"2").unwrap();
    store.store("acmex/c.crt", b"3").unwrap();
    store.store("other/d.crt", b"4").unwrap();

    let keys = store.list("acme/", false).unwrap();
    assert_eq!(keys, vec!["acme/a.crt", "acme/sub/b.crt"]);

    let keys = store.list("acme", false).unwrap();
    assert_eq!(keys, vec!["acme/a.crt", "acme/sub/b.crt", "acmex/c.crt"]);
}

#[test]
fn test_list_accepts_unnormalized_prefix() {
    let (_backend, store) = memory_store();
    store.store("acme/a.crt", b"1").unwrap();
    store.store("acme/sub/b.crt", b"2").unwrap();
    store.store("acmex/c.crt", b"3").unwrap();

    // Spellings that stat resolves to the same object also list it.
    assert!(store.stat("/acme/a.crt").is_ok());
    let expected = vec!["acme/a.crt", "acme/sub/b.crt"];
    assert_eq!(store.list("/acme/", false).unwrap(), expected);
    assert_eq!(store.list("./acme/", false).unwrap(), expected);
    assert_eq!(store.list("acme\\", false).unwrap(), expected);
    assert_eq!(store.list("acme\\sub", false).unwrap(), vec!["acme/sub/b.crt"]);
    assert_eq!(
        store.list("/acme", false).unwrap(),
        vec!["acme/a.crt", "acme/sub/b.crt", "acmex/c.crt"]
    );
}

#[test]
fn test_keys_in_lock_directory_are_refused() {
    let backend = MemoryBackend::new();
    let store = ValueStore::new(Arc::new(backend.clone()), KeyMapper::default());
    let locks = crate::locks::LockManager::new(Arc::new(backend.clone()), KeyMapper::default());
    assert!(locks.try_acquire("cert-a").unwrap());
    let marker = KeyMapper::default().lock_marker_path("cert-a");

    let err = store.store("locks/cert-a.lock", b"forged").unwrap_err();
    assert!(matches!(err, StoreError::UserError(_)));
    assert!(store.store("./locks/other.lock", b"forged").is_err());

    let err = store.delete("locks/cert-a.lock").unwrap_err();
    assert!(matches!(err, StoreError::UserError(_)));
    assert_eq!(backend.get(&marker).unwrap(), crate::locks::LOCK_SENTINEL);

    // Reads and look-alike keys outside the directory still work.
    assert!(store.exists("locks/cert-a.lock"));
    store.store("locksmith/notes", b"ok").unwrap();
    assert_eq!(store.load("locksmith/notes").unwrap(), b"ok");
}

#[test]
fn test_list_ignores_recursive_flag() {
    let (_backend, store) = memory_store();
    store.store("acme/a.crt", b"1").unwrap();
    store.store("acme/deep/er/b.crt", b"2").unwrap();

    assert_eq!(
        store.list("acme/", true).unwrap(),
        store.list("acme/", false).unwrap()
    );
}

#[test]
fn test_list_ignores_objects_outside_prefix() {
    let backend = MemoryBackend::new();
    backend.put("certmagicx/stray", b"1").unwrap();
    let store = ValueStore::new(Arc::new(backend), KeyMapper::default());
    store.store("inside", b"1").unwrap();

    assert_eq!(store.list("", false).unwrap(), vec!["inside"]);
}

#[test]
fn test_filesystem_backed_store() {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::open(dir.path()).unwrap();
    let store = ValueStore::new(Arc::new(backend), KeyMapper::new("certs"));

    store.store("acme/example.com/cert.pem", b"PEM").unwrap();
    assert_eq!(store.load("acme/example.com/cert.pem").unwrap(), b"PEM");
    assert_eq!(
        store.list("acme/", false).unwrap(),
        vec!["acme/example.com/cert.pem"]
    );
    assert!(dir.path().join("certs/acme/example.com/cert.pem").is_file());

    store.delete("acme/example.com/cert.pem").unwrap();
    assert!(!store.exists("acme/example.com/cert.pem"));
}
