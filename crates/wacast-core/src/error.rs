// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the wacast campaign service.

use thiserror::Error;

/// The primary error type used across all wacast adapter traits and pipeline operations.
#[derive(Debug, Error)]
pub enum WacastError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level failures talking to the messaging provider
    /// (connection refused, 5xx, rate limiting, unparseable response).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failures publishing to the external dispatch queue.
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider accepted the request but rejected the send with a structured error.
    #[error("provider rejected message{}: {message}", code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    ProviderRejected { code: Option<i64>, message: String },

    /// No contacts remained after blocklist and duplicate filtering.
    #[error("no unique or non-blocked contacts available")]
    EmptyTargetSet,

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A request failed signature or token verification.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WacastError {
    /// Whether retrying the whole operation later could succeed.
    ///
    /// The worker endpoint maps transient errors to 5xx so the external
    /// queue redelivers the job.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WacastError::Storage { .. }
                | WacastError::Channel { .. }
                | WacastError::Queue { .. }
                | WacastError::Timeout { .. }
        )
    }

    /// Shorthand for a [`WacastError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        WacastError::NotFound {
            entity,
            id: id.into(),
        }
    }
}
