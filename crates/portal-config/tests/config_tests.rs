use std::time::Duration;

use portal_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_portal_defaults() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.finder_page_size, 10);
    assert_eq!(cfg.refresh_interval(), Duration::from_secs(1200));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.currency = "EUR".to_string();
    cfg.page_size = 25;
    cfg.log_filter = Some("crm_portal=debug".into());

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn missing_file_loads_defaults_and_partial_files_fill_gaps() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.load().expect("defaults"), Config::default());

    std::fs::write(manager.config_path(), r#"{"locale":"fr-FR","currency":"EUR"}"#)
        .expect("write partial");
    let loaded = manager.load().expect("partial");
    assert_eq!(loaded.locale, "fr-FR");
    assert_eq!(loaded.refresh_interval_secs, 1200);
    assert!(loaded.ui_color_enabled);
}

#[test]
fn corrupt_file_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");
    let err = ConfigManager::new(path).load().expect_err("corrupt");
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn settings_update_from_text() {
    let mut cfg = Config::default();
    cfg.set("page_size", "20").expect("page size");
    cfg.set("currency", "gbp").expect("currency");
    cfg.set("data_root", "/tmp/portal").expect("root");
    assert_eq!(cfg.page_size, 20);
    assert_eq!(cfg.currency, "GBP");
    assert_eq!(cfg.resolve_data_root(), std::path::PathBuf::from("/tmp/portal"));

    assert!(cfg.set("page_size", "0").is_err());
    assert!(cfg.set("finder_page_size", "5").is_err());
    assert!(matches!(
        cfg.set("theme", "dark"),
        Err(ConfigError::Invalid { .. })
    ));
}
