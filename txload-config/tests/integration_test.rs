//! Integration tests for txload-config

use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;
use txload_config::*;

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Loader whose prefix no test sets, so file tests ignore env overrides
fn file_loader() -> ConfigLoader {
    ConfigLoader::with_prefix("TXLOAD_FILE_TEST")
}

#[test]
fn test_default_config_validation() {
    let config = TxLoadConfig::default();
    assert!(config.validate_all().is_ok());
    assert!(config.tps.is_empty());
}

#[test]
fn test_json_file_keeps_slice_order() {
    let file = write_config(
        ".json",
        r#"{"tps": {"10": 1000, "2": 20, "7": 70}, "dispatch": {"pool_size": 4}}"#,
    );

    let config = file_loader().from_file(file.path()).unwrap();

    let labels: Vec<&str> = config.tps.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["10", "2", "7"]);
    assert_eq!(config.dispatch.pool_size, 4);
}

#[test]
fn test_yaml_file() {
    let yaml = r#"
tps:
  warmup: 50
  peak: 1000

server:
  bind_address: "127.0.0.1"
  ports:
    base: 9000
    count: 3
  idle_timeout: 30

dispatch:
  host: "127.0.0.1"
  ports:
    base: 9000
    count: 3
  pool_size: 3
  max_requests_per_connection: 20
  launch_interval_ms: 500
  io_timeout: 5
  pacing: disabled

store:
  record_count: 1000
  backend: sharded
  shards: 8

logging:
  level: debug
  format: json
"#;
    let file = write_config(".yaml", yaml);
    let config = file_loader().from_file(file.path()).unwrap();

    assert_eq!(config.tps.entries()[0].label, "warmup");
    assert_eq!(config.tps.entries()[1].tps, 1000);
    assert_eq!(config.server.ports.first(), 9001);
    assert_eq!(config.server.idle_timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.dispatch.launch_interval, Duration::from_millis(500));
    assert_eq!(config.dispatch.io_timeout, Some(Duration::from_secs(5)));
    assert_eq!(config.dispatch.pacing, PacingMode::Disabled);
    assert_eq!(config.store.backend, StoreBackend::Sharded);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = file_loader().from_file("/nonexistent/txload/config.json");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}

#[test]
fn test_malformed_json_is_an_error() {
    let file = write_config(".json", r#"{"tps": {"1": "lots"}}"#);
    let result = file_loader().from_file(file.path());
    assert!(matches!(result, Err(ConfigError::JsonError(_))));
}

#[test]
fn test_invalid_domain_value_is_rejected() {
    let file = write_config(".json", r#"{"dispatch": {"pool_size": 0}}"#);
    let result = file_loader().from_file(file.path());

    match result {
        Err(ConfigError::DomainError { domain, .. }) => assert_eq!(domain, "dispatch"),
        other => panic!("expected domain error, got {:?}", other),
    }
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("TXLOAD_BASE_PORT", Some("9100")),
        ("TXLOAD_PORT_COUNT", Some("2")),
        ("TXLOAD_POOL_SIZE", Some("2")),
        ("TXLOAD_RECORD_COUNT", Some("5")),
        ("TXLOAD_LOG_LEVEL", Some("trace")),
        ("TXLOAD_PACING", Some("disabled")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.server.ports.base, 9100);
        assert_eq!(config.dispatch.ports.base, 9100);
        assert_eq!(config.server.ports.count, 2);
        assert_eq!(config.dispatch.pool_size, 2);
        assert_eq!(config.store.record_count, 5);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.dispatch.pacing, PacingMode::Disabled);
    });
}

#[test]
fn test_invalid_env_override() {
    with_vars(vec![("TXLOAD_POOL_SIZE", Some("many"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("LOADGEN_RECORD_COUNT", Some("42"))], || {
        let config = ConfigLoader::with_prefix("LOADGEN").from_env().unwrap();
        assert_eq!(config.store.record_count, 42);
    });
}
