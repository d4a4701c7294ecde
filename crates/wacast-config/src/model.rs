// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key
//! fails startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level wacast configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WacastConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// External dispatch queue (QStash) settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Campaign fan-out settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Phone normalization settings.
    #[serde(default)]
    pub phone: PhoneConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for the admin API. `None` rejects every admin request.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Externally reachable base URL of this service. The queue delivers jobs
    /// to `{public_base_url}{dispatch.worker_path}`.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            admin_token: None,
            public_base_url: None,
            log_level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "wacast.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// WhatsApp Cloud API configuration.
///
/// Per-company access tokens and number ids live in storage, not here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API base URL, without the version segment.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,

    /// Graph API version used for sends, e.g. `v17.0`.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Language code used when a template does not declare one.
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Token echoed back during webhook subscription verification.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret for `X-Hub-Signature-256` verification. `None` skips the check.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Per-request timeout for provider calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            graph_base_url: default_graph_base_url(),
            api_version: default_api_version(),
            language_code: default_language_code(),
            verify_token: None,
            app_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v17.0".to_string()
}

fn default_language_code() -> String {
    "en_US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// QStash dispatch queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    #[serde(default = "default_qstash_url")]
    pub url: String,

    /// QStash publish token. `None` disables campaign dispatch.
    #[serde(default)]
    pub token: Option<String>,

    /// Redelivery budget attached to every published job.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Signing keys for verifying `Upstash-Signature` on worker requests.
    /// `None` skips verification.
    #[serde(default)]
    pub current_signing_key: Option<String>,

    #[serde(default)]
    pub next_signing_key: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: default_qstash_url(),
            token: None,
            retries: default_retries(),
            current_signing_key: None,
            next_signing_key: None,
        }
    }
}

fn default_qstash_url() -> String {
    "https://qstash.upstash.io".to_string()
}

fn default_retries() -> u32 {
    3
}

/// Campaign fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Number of publishes issued concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Template variable value used when a contact has no name.
    #[serde(default = "default_variable_value")]
    pub default_variable_value: String,

    /// Path of the worker endpoint on this service.
    #[serde(default = "default_worker_path")]
    pub worker_path: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_variable_value: default_variable_value(),
            worker_path: default_worker_path(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}

fn default_variable_value() -> String {
    "Customer".to_string()
}

fn default_worker_path() -> String {
    "/api/send-message".to_string()
}

/// Phone normalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneConfig {
    /// Country code prepended to bare national numbers.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Digit count of a bare national number.
    #[serde(default = "default_national_length")]
    pub national_length: usize,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
            national_length: default_national_length(),
        }
    }
}

fn default_country_code() -> String {
    "91".to_string()
}

fn default_national_length() -> usize {
    10
}
