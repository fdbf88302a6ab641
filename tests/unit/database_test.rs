//! Unit tests for the database layer (connection, migrations, key-value store).

use classroom_offline::database::kv_store::{self, MY_DOWNLOADS_KEY, USER_TOKEN_KEY};
use classroom_offline::database::migrations::{self, CURRENT_SCHEMA_VERSION};
use classroom_offline::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_kv_table() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "kv_store should exist after migrations");
    assert_eq!(migrations::get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    assert!(migrations::run_all(&conn).is_ok());
    assert_eq!(migrations::get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_get_missing_key_is_none() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_item(MY_DOWNLOADS_KEY).unwrap(), None);
}

#[test]
fn test_set_get_overwrite_remove() {
    let db = Database::open_in_memory().unwrap();
    db.set_item(USER_TOKEN_KEY, "abc").unwrap();
    assert_eq!(db.get_item(USER_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

    db.set_item(USER_TOKEN_KEY, "def").unwrap();
    assert_eq!(db.get_item(USER_TOKEN_KEY).unwrap().as_deref(), Some("def"));

    db.remove_item(USER_TOKEN_KEY).unwrap();
    assert_eq!(db.get_item(USER_TOKEN_KEY).unwrap(), None);

    // Removing again is not an error.
    db.remove_item(USER_TOKEN_KEY).unwrap();
}

#[test]
fn test_keys_lists_every_entry() {
    let db = Database::open_in_memory().unwrap();
    {
        let conn = db.connection();
        kv_store::set_item(&conn, "b", "2").unwrap();
        kv_store::set_item(&conn, "a", "1").unwrap();
    }
    let mut keys = db.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_file_database_persists_across_opens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("store.db");
    {
        let db = Database::open(&path).unwrap();
        db.set_item(MY_DOWNLOADS_KEY, "[]").unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_item(MY_DOWNLOADS_KEY).unwrap().as_deref(), Some("[]"));
}
