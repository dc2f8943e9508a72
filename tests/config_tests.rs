//! Configuration file tests

use cmdbridge::config::{Config, CONFIG_FILE_NAME};
use cmdbridge::Backend;
use tempfile::TempDir;

#[test]
fn test_load_requires_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Configuration file not found"));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.cache_size, Config::default().cache_size);
    assert_eq!(config.mongo.database, None);
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.elastic.index_refresh = true;
    config.mongo.database = Some("shop".to_string());
    config.save(dir.path()).unwrap();

    assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    let loaded = Config::load(dir.path()).unwrap();
    assert!(loaded.elastic.index_refresh);
    assert_eq!(loaded.mongo.database.as_deref(), Some("shop"));
}

#[test]
fn test_load_partial_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "backend = \"mongo\"\n\n[mongo]\ndatabase = \"app\"\n",
    )
    .unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.mongo.database.as_deref(), Some("app"));
    assert!(!config.elastic.index_refresh);
    // The backend may be overridden from the environment; the file value
    // applies otherwise.
    if std::env::var(cmdbridge::config::ENV_BACKEND).is_err() {
        assert_eq!(config.backend, Backend::Mongo);
    }
}

#[test]
fn test_malformed_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "cache_size = \"lots\"").unwrap();
    assert!(Config::load(dir.path()).is_err());
}
