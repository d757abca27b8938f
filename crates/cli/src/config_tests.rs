// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use pulse_sync::Topic;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, content).unwrap();
    (temp, path)
}

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(&temp.path().join("absent.toml")).unwrap();

    assert_eq!(config.retry, RetryConfig::default());
    assert_eq!(config.push, PushSettings::default());
    assert!(config.api_url.is_none());
}

#[test]
fn loads_partial_tables() {
    let (_temp, path) = write_config(
        r#"
api_url = "https://api.example.com"
token = "abc"

[retry]
max_retries = 5
jitter_ms = 0

[push]
dealer_registrations = false
"#,
    );

    let config = Config::load(&path).unwrap();

    assert_eq!(config.api_url().unwrap(), "https://api.example.com");
    assert_eq!(config.token().unwrap(), "abc");
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.retry.jitter_ms, 0);
    assert!(config.push.order_notifications);
    assert!(!config.push.dealer_registrations);
}

#[test]
fn malformed_file_reports_path() {
    let (_temp, path) = write_config("api_url = [");

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn env_token_overrides_file() {
    let config = Config {
        token: Some("file".to_string()),
        ..Config::default()
    };

    assert_eq!(
        config.clone().with_token_override(Some("env".to_string())).token().unwrap(),
        "env"
    );
    assert_eq!(
        config.clone().with_token_override(Some("  ".to_string())).token().unwrap(),
        "file"
    );
    assert_eq!(config.with_token_override(None).token().unwrap(), "file");
}

#[test]
fn missing_api_url_and_token_are_errors() {
    let config = Config::default();
    assert!(matches!(config.api_url(), Err(Error::MissingApiUrl(_))));
    assert!(matches!(config.token(), Err(Error::MissingToken)));
}

#[test]
fn retry_policy_from_config() {
    let mut config = Config::default();
    config.retry.max_retries = 2;
    config.retry.base_delay_ms = 100;
    config.retry.timeout_ms = 0;

    let policy = config.retry_policy().unwrap();

    assert_eq!(policy.max_retries, 2);
    assert_eq!(policy.base_delay, Duration::from_millis(100));
    assert_eq!(policy.timeout, None);
}

#[test]
fn invalid_retry_policy_is_rejected() {
    let mut config = Config::default();
    config.retry.backoff_factor = 1.0;
    assert!(matches!(config.retry_policy(), Err(Error::Policy(_))));

    let mut config = Config::default();
    config.retry.base_delay_ms = 20_000;
    assert!(matches!(config.retry_policy(), Err(Error::Policy(_))));
}

#[test]
fn push_config_derives_endpoints_and_topics() {
    let (_temp, path) = write_config(
        r#"
api_url = "https://api.example.com"
token = "abc"

[push]
order_notifications = false
reconnect_delay_ms = 250
"#,
    );
    let config = Config::load(&path).unwrap();

    let push = config.push_config();

    assert_eq!(push.endpoints[0], "wss://ws.example.com/ws");
    assert_eq!(push.token.as_deref(), Some("abc"));
    assert_eq!(push.reconnect_delay, Duration::from_millis(250));
    assert_eq!(push.topics, vec![Topic::DealerRegistrations]);
}
