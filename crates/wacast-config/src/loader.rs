// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered loader.
//!
//! Merge order, later wins: compiled defaults, `/etc/wacast/wacast.toml`,
//! `~/.config/wacast/wacast.toml`, `./wacast.toml`, `WACAST_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WacastConfig;

/// Top-level sections, used to turn `WACAST_QUEUE_CURRENT_SIGNING_KEY` into
/// `queue.current_signing_key`.
const SECTIONS: &[&str] = &["server", "storage", "whatsapp", "queue", "dispatch", "phone"];

/// Config files of the hierarchy, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/wacast/wacast.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("wacast").join("wacast.toml"));
    }
    paths.push(PathBuf::from("wacast.toml"));
    paths
}

/// Build the full figment (defaults, files, env) without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(WacastConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<WacastConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over compiled defaults. No env, no files.
pub fn load_config_from_str(toml_content: &str) -> Result<WacastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WacastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores survive intact.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("WACAST_").map(|key| env_key_to_path(key.as_str()).into())
}
