use std::fs;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::Settings;
use super::{load_config, load_config_from};

fn write_config(dir: &TempDir, toml: &str) -> String {
    let path = dir.path().join("ackqueue.toml");
    fs::write(&path, toml).expect("write config file");
    path.to_str().expect("utf-8 path").to_string()
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.broker.ttl_ms, 30_000);
    assert_eq!(settings.broker.ttl(), Duration::from_secs(30));
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("absent");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.broker.ttl_ms, 30_000);
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = write_config(
        &tmp,
        r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [broker]
            ttl_ms = 1500
        "#,
    );

    let cfg = load_config_from(&path).expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.broker.ttl(), Duration::from_millis(1500));
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = write_config(
        &tmp,
        r#"
            [broker]
            ttl_ms = 1500
        "#,
    );

    temp_env::with_vars(
        [
            ("ACKQUEUE__BROKER__TTL_MS", Some("250")),
            ("ACKQUEUE__LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config_from(&path).expect("load_config failed");
            assert_eq!(cfg.broker.ttl_ms, 250);
            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.server.port, 8080);
        },
    );
}

#[test]
#[serial]
fn test_zero_ttl_is_rejected() {
    temp_env::with_var("ACKQUEUE__BROKER__TTL_MS", Some("0"), || {
        assert!(load_config().is_err());
    });
}
