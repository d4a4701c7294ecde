// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging provider for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter`. Sends are accepted by default;
//! individual phones can be scripted to be rejected or to fail transiently.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use wacast_core::types::{SendReceipt, TemplateSend};
use wacast_core::{AdapterType, ChannelAdapter, HealthStatus, PluginAdapter, WacastError};

/// What the mock provider does with a send to a given phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    Accept,
    Reject { code: i64, message: String },
    Transient(String),
}

/// A mock messaging provider for testing.
#[derive(Default)]
pub struct MockChannel {
    outcomes: Arc<Mutex<HashMap<String, MockOutcome>>>,
    requests: Arc<Mutex<Vec<TemplateSend>>>,
    accepted: Arc<Mutex<HashMap<String, String>>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for sends to `phone`.
    pub async fn set_outcome(&self, phone: &str, outcome: MockOutcome) {
        self.outcomes.lock().await.insert(phone.to_string(), outcome);
    }

    /// Every request that reached the provider, in order.
    pub async fn requests(&self) -> Vec<TemplateSend> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Provider message id assigned to the last accepted send to `phone`.
    pub async fn provider_id_for(&self, phone: &str) -> Option<String> {
        self.accepted.lock().await.get(phone).cloned()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, WacastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WacastError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn send_template(&self, request: &TemplateSend) -> Result<SendReceipt, WacastError> {
        self.requests.lock().await.push(request.clone());
        let outcome = self
            .outcomes
            .lock()
            .await
            .get(&request.to)
            .cloned()
            .unwrap_or(MockOutcome::Accept);
        match outcome {
            MockOutcome::Accept => {
                let id = format!("wamid.mock-{}", uuid::Uuid::new_v4().simple());
                self.accepted
                    .lock()
                    .await
                    .insert(request.to.clone(), id.clone());
                Ok(SendReceipt {
                    provider_message_id: id,
                })
            }
            MockOutcome::Reject { code, message } => Err(WacastError::ProviderRejected {
                code: Some(code),
                message,
            }),
            MockOutcome::Transient(message) => Err(WacastError::Channel {
                message,
                source: None,
            }),
        }
    }
}
