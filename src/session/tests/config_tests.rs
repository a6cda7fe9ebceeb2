use super::config::*;
use std::io::Write;
use std::time::Duration;

fn clear_env() {
    std::env::remove_var(ENV_LISTEN);
    std::env::remove_var(ENV_TOKEN);
    std::env::remove_var(ENV_PING_TIMEOUT_MS);
}

#[test]
fn test_defaults() {
    let config = SessionConfig::default();
    assert_eq!(config.listen_address, "127.0.0.1:0");
    assert_eq!(config.token, None);
    assert_eq!(config.ping_timeout(), Duration::from_millis(3000));
}

#[test]
fn test_from_yaml_file_fills_missing_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "token: abc").unwrap();
    writeln!(file, "ping_timeout_ms: 500").unwrap();

    let config = SessionConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.listen_address, DEFAULT_LISTEN_ADDRESS);
    assert_eq!(config.token.as_deref(), Some("abc"));
    assert_eq!(config.ping_timeout_ms, 500);
}

#[test]
fn test_from_yaml_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");

    let err = SessionConfig::from_yaml_file(&missing).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.yaml"));
}

#[test]
fn test_from_yaml_file_rejects_bad_types() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ping_timeout_ms: soon").unwrap();

    assert!(SessionConfig::from_yaml_file(file.path()).is_err());
}

#[test]
#[serial_test::serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var(ENV_LISTEN, "127.0.0.1:7777");
    std::env::set_var(ENV_TOKEN, "from-env");
    std::env::set_var(ENV_PING_TIMEOUT_MS, "1234");

    let config = SessionConfig::default().apply_env_overrides();
    clear_env();

    assert_eq!(config.listen_address, "127.0.0.1:7777");
    assert_eq!(config.token.as_deref(), Some("from-env"));
    assert_eq!(config.ping_timeout_ms, 1234);
}

#[test]
#[serial_test::serial]
fn test_env_override_ignores_unparseable_timeout() {
    clear_env();
    std::env::set_var(ENV_PING_TIMEOUT_MS, "later");

    let config = SessionConfig::default()
        .with_ping_timeout(Duration::from_millis(250))
        .apply_env_overrides();
    clear_env();

    assert_eq!(config.ping_timeout_ms, 250);
}

#[test]
#[serial_test::serial]
fn test_empty_token_env_disables_auth() {
    clear_env();
    std::env::set_var(ENV_TOKEN, "");

    let config = SessionConfig::default()
        .with_token("file-token")
        .apply_env_overrides();
    clear_env();

    assert_eq!(config.token, None);
}

#[test]
fn test_generate_token() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a, b);
}
