// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use rundag::config::{load_and_validate, load_from_path, load_or_default, ConfigFile};
use rundag::engine::RefreshPolicy;
use rundag::errors::RundagError;
use rundag::events::RetryPolicy;
use tempfile::NamedTempFile;

fn demo_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/Rundag.toml")
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(RundagError::ConfigError(msg)) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected config error mentioning {needle:?}, got {other:?}"),
    }
}

#[test]
fn demo_config_loads_and_validates() {
    let config = load_and_validate(demo_config()).expect("demo config is valid");

    assert_eq!(config.poll.interval_ms, 2000);
    assert!(config.poll.pause_while_ui_open);
    assert_eq!(config.events.namespace.as_deref(), Some("acme_"));
    assert_eq!(config.events.max_attempts, 4);

    let policy = RefreshPolicy::from(&config.poll);
    assert_eq!(policy.interval.as_millis(), 2000);
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");

    let config = load_and_validate(file.path()).expect("empty config is valid");

    assert_eq!(config.poll.interval_ms, 5000);
    assert!(config.poll.pause_while_ui_open);
    assert_eq!(config.events.namespace, None);
    assert_eq!(config.events.max_attempts, 3);
    assert_eq!(config.events.initial_delay_ms, 200);
    assert_eq!(config.events.max_delay_ms, 5000);
    assert_eq!(config.events.max_log_length, 1000);

    let retry = RetryPolicy::from(&config.events);
    assert_eq!(retry.max_attempts, 3);
}

#[test]
fn partial_sections_fill_in_defaults() {
    let file = write_config("[poll]\npause_while_ui_open = false\n");

    let config = load_and_validate(file.path()).expect("valid");

    assert_eq!(config.poll.interval_ms, 5000);
    assert!(!config.poll.pause_while_ui_open);
}

#[test]
fn unknown_sections_are_rejected() {
    let file = write_config("[watch]\npaths = [\"src\"]\n");

    let err = load_from_path(file.path()).expect_err("unknown section");

    assert!(matches!(err, RundagError::TomlError(_)), "{err:?}");
}

#[test]
fn invalid_values_are_reported() {
    expect_config_error("[poll]\ninterval_ms = 0\n", "interval_ms");
    expect_config_error("[events]\nmax_attempts = 0\n", "max_attempts");
    expect_config_error("[events]\nbackoff_factor = 0.5\n", "backoff_factor");
    expect_config_error("[events]\nbackoff_factor = nan\n", "backoff_factor");
    expect_config_error(
        "[events]\ninitial_delay_ms = 900\nmax_delay_ms = 100\n",
        "max_delay_ms",
    );
    expect_config_error("[events]\nmax_log_length = 0\n", "max_log_length");
    expect_config_error("[events]\nnamespace = \"  \"\n", "namespace");
}

#[test]
fn missing_default_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("Rundag.toml");

    let config = load_or_default(&path, false).expect("defaults");

    assert_eq!(config.poll.interval_ms, ConfigFile::default().poll.interval_ms);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nope.toml");

    let err = load_or_default(&path, true).expect_err("explicit path must exist");

    assert!(matches!(err, RundagError::IoError(_)), "{err:?}");
}
