// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Collects every semantic error instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::WacastConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &WacastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation(
            "server.bind_address must not be empty",
        ));
    } else if addr.parse::<std::net::IpAddr>().is_err()
        && !addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.bind_address `{addr}` is not a valid IP address or hostname"
        )));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "server.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.server.log_level
        )));
    }

    if let Some(url) = &config.server.public_base_url {
        check_http_url("server.public_base_url", url, &mut errors);
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    check_http_url(
        "whatsapp.graph_base_url",
        &config.whatsapp.graph_base_url,
        &mut errors,
    );
    if !config.whatsapp.api_version.starts_with('v') {
        errors.push(ConfigError::validation(format!(
            "whatsapp.api_version must look like `v17.0`, got `{}`",
            config.whatsapp.api_version
        )));
    }
    if config.whatsapp.language_code.trim().is_empty() {
        errors.push(ConfigError::validation(
            "whatsapp.language_code must not be empty",
        ));
    }
    if config.whatsapp.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "whatsapp.request_timeout_secs must be at least 1",
        ));
    }

    check_http_url("queue.url", &config.queue.url, &mut errors);
    if config.queue.next_signing_key.is_some() && config.queue.current_signing_key.is_none() {
        errors.push(ConfigError::validation(
            "queue.next_signing_key requires queue.current_signing_key",
        ));
    }

    if !(1..=1000).contains(&config.dispatch.batch_size) {
        errors.push(ConfigError::validation(format!(
            "dispatch.batch_size must be between 1 and 1000, got {}",
            config.dispatch.batch_size
        )));
    }
    if !config.dispatch.worker_path.starts_with('/') {
        errors.push(ConfigError::validation(format!(
            "dispatch.worker_path must start with `/`, got `{}`",
            config.dispatch.worker_path
        )));
    }

    let cc = &config.phone.default_country_code;
    if cc.is_empty() || !cc.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ConfigError::validation(format!(
            "phone.default_country_code must be digits only, got `{cc}`"
        )));
    }
    if !(4..=15).contains(&config.phone.national_length) {
        errors.push(ConfigError::validation(format!(
            "phone.national_length must be between 4 and 15, got {}",
            config.phone.national_length
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(key: &str, url: &str, errors: &mut Vec<ConfigError>) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "{key} must be an http(s) URL, got `{url}`"
        )));
    }
}
