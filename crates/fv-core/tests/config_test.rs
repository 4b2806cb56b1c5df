use fv_core::config::{Config, ConfigError};

#[test]
fn default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.general.app_name, "finvision");
    assert_eq!(cfg.general.log_level, "info");
    assert_eq!(cfg.api.base_url, "http://localhost:5000/api");
    assert_eq!(cfg.session.storage_path, "~/.finvision/session.json");
    assert_eq!(cfg.attendance.geolocation_timeout_ms, 10_000);
    assert!(cfg.attendance.high_accuracy);
    assert_eq!(cfg.attendance.maximum_age_ms, 0);
    assert_eq!(cfg.export.output_dir, ".");
}

#[test]
fn config_roundtrip() {
    let cfg = Config::default();
    let toml_str = cfg.to_toml().expect("serialize to toml");
    assert!(toml_str.contains("localhost:5000"));

    let parsed: Config = toml::from_str(&toml_str).expect("parse toml back");
    assert_eq!(parsed, cfg);
    parsed.validate().expect("config validates");
}

#[test]
fn config_partial_toml() {
    let partial = r#"
[api]
base_url = "https://crm.example.com/api"

[attendance]
geolocation_timeout_ms = 5000
"#;
    let cfg = Config::from_toml(partial).expect("parse partial");
    assert_eq!(cfg.api.base_url, "https://crm.example.com/api");
    assert_eq!(cfg.attendance.geolocation_timeout_ms, 5000);
    // defaults should fill in the rest
    assert!(cfg.attendance.high_accuracy);
    assert_eq!(cfg.general.log_level, "info");
}

#[test]
fn non_http_base_url_fails_validation() {
    let mut cfg = Config::default();
    cfg.api.base_url = "localhost:5000".to_string();
    let err = cfg.validate().expect_err("validation should fail");
    assert!(err.to_string().contains("api.base_url"));
}

#[test]
fn zero_geolocation_timeout_fails_validation() {
    let err = Config::from_toml("[attendance]\ngeolocation_timeout_ms = 0\n")
        .expect_err("validation should fail");
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();
    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.general.log_level, "debug");

    let missing = Config::load_from(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));
}

#[test]
fn session_path_expands_home() {
    let mut cfg = Config::default();
    cfg.session.storage_path = "/tmp/fv/session.json".into();
    assert_eq!(cfg.session_path(), std::path::PathBuf::from("/tmp/fv/session.json"));
    let home_relative = Config::default().session_path();
    assert!(home_relative.ends_with(".finvision/session.json"));
}
