// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the wacast configuration system.

use wacast_config::diagnostic::ConfigError;
use wacast_config::model::WacastConfig;
use wacast_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[server]
bind_address = "0.0.0.0"
port = 8080
admin_token = "admin-secret"
public_base_url = "https://wacast.example.com"
log_level = "debug"

[storage]
database_path = "/tmp/wacast-test.db"
wal_mode = false

[whatsapp]
api_version = "v19.0"
verify_token = "verify-me"
app_secret = "app-secret"

[queue]
token = "qstash-token"
retries = 5
current_signing_key = "sig_current"
next_signing_key = "sig_next"

[dispatch]
batch_size = 25
default_variable_value = "Friend"

[phone]
default_country_code = "44"
national_length = 10
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.admin_token.as_deref(), Some("admin-secret"));
    assert_eq!(config.server.log_level, "debug");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.whatsapp.api_version, "v19.0");
    assert_eq!(config.whatsapp.graph_base_url, "https://graph.facebook.com");
    assert_eq!(config.queue.retries, 5);
    assert_eq!(config.queue.next_signing_key.as_deref(), Some("sig_next"));
    assert_eq!(config.dispatch.batch_size, 25);
    assert_eq!(config.dispatch.worker_path, "/api/send-message");
    assert_eq!(config.phone.default_country_code, "44");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert!(config.server.admin_token.is_none());
    assert_eq!(config.storage.database_path, "wacast.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.whatsapp.language_code, "en_US");
    assert!(config.queue.token.is_none());
    assert_eq!(config.queue.url, "https://qstash.upstash.io");
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[logging]\nlevel = \"debug\"\n")
        .expect_err("unknown section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "got: {err_str}"
    );
}

#[test]
fn dotted_override_maps_to_nested_key() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: WacastConfig = Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::string("[queue]\ntoken = \"from-file\"\n"))
        .merge(("queue.current_signing_key", "from-env"))
        .merge(("queue.token", "env-token"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.queue.token.as_deref(), Some("env-token"));
    assert_eq!(config.queue.current_signing_key.as_deref(), Some("from-env"));
}

#[test]
fn unknown_key_diagnostic_suggests_and_lists_keys() {
    let errors = load_and_validate_str("[dispatch]\nbacth_size = 10\n")
        .expect_err("should produce errors");

    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. }
            if key == "bacth_size"
                && suggestion.as_deref() == Some("batch_size")
                && valid_keys.contains("worker_path"))
    });
    assert!(found, "expected UnknownKey for bacth_size, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let err = load_config_from_str("[server]\nport = \"eighty\"\n").expect_err("bad type");
    let err_str = err.to_string();
    assert!(
        err_str.contains("invalid type") || err_str.contains("port"),
        "got: {err_str}"
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let errors = load_and_validate_str("[dispatch]\nbatch_size = 5000\n")
        .expect_err("batch size too large");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("batch_size"))
    ));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "tokn".to_string(),
        suggestion: Some("token".to_string()),
        valid_keys: "url, token, retries".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `token`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("tokn"));
}

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wacast.toml");
    std::fs::write(&path, "[server]\nport = 4100\n").unwrap();

    let config = load_and_validate_path(&path).expect("file should load");
    assert_eq!(config.server.port, 4100);
}
