//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, validation and reset.

use classroom_offline::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use classroom_offline::types::errors::SettingsError;
use classroom_offline::types::settings::AppSettings;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.api.base_url, "https://imacampus.lk/api");
    assert_eq!(settings.storage.storage_limit_mb, 5120);
    assert_eq!(settings.transfer.resume_stall_polls, 30);
    assert_eq!(settings.transfer.poll_interval_ms, 1000);
    assert_eq!(settings.logging.level, "info");
    assert!(!settings.logging.file_enabled);
}

/// A change made through `set_value` must be visible to a fresh engine
/// reading the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("storage.storage_limit_mb", json!(2048))
            .unwrap();
    }

    let mut engine2 = engine_in_temp(&dir);
    let loaded = engine2.load().unwrap();
    assert_eq!(loaded.storage.storage_limit_mb, 2048);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine
        .set_value("api.base_url", json!("https://staging.example.com/api"))
        .unwrap();
    engine.set_value("logging.file_enabled", json!(true)).unwrap();

    engine.reset().unwrap();
    assert_eq!(*engine.get_settings(), AppSettings::default());

    let mut engine2 = engine_in_temp(&dir);
    assert_eq!(engine2.load().unwrap(), AppSettings::default());
}

#[rstest]
#[case("")]
#[case("storage.nope")]
#[case("nope.storage_limit_mb")]
#[case("storage.storage_limit_mb.deeper")]
fn test_unknown_keys_are_rejected(#[case] key: &str) {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value(key, json!(1));
    assert!(
        matches!(result, Err(SettingsError::InvalidKey(_))),
        "key {:?} should be rejected, got {:?}",
        key,
        result
    );
}

#[rstest]
#[case("storage.storage_limit_mb", json!("lots"))]
#[case("storage.storage_limit_mb", json!(-1))]
#[case("transfer.poll_interval_ms", json!(0))]
#[case("logging.file_enabled", json!("yes"))]
fn test_invalid_values_are_rejected(#[case] key: &str, #[case] value: serde_json::Value) {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value(key, value);
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert_eq!(*engine.get_settings(), AppSettings::default());
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
    let mut engine = engine_in_temp(&dir);

    assert!(matches!(
        engine.load(),
        Err(SettingsError::SerializationError(_))
    ));
    // The engine keeps working with defaults.
    assert_eq!(*engine.get_settings(), AppSettings::default());
}

#[test]
fn test_downloads_dir_setting_accepts_null() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine
        .set_value("storage.downloads_dir", json!("/tmp/lessons"))
        .unwrap();
    engine
        .set_value("storage.downloads_dir", serde_json::Value::Null)
        .unwrap();
    assert_eq!(engine.get_settings().storage.downloads_dir, None);
}
