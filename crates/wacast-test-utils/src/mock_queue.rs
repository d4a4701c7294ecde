// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock dispatch queue for deterministic testing.
//!
//! `MockQueue` implements `QueueAdapter`, captures every published job, and
//! can be told to refuse jobs for specific phones.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use wacast_core::types::DispatchJob;
use wacast_core::{AdapterType, HealthStatus, PluginAdapter, QueueAdapter, WacastError};

/// A mock queue for testing.
#[derive(Default)]
pub struct MockQueue {
    published: Arc<Mutex<Vec<DispatchJob>>>,
    refused: Arc<Mutex<HashSet<String>>>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish for `phone` (normalized form) fail.
    pub async fn refuse_phone(&self, phone: &str) {
        self.refused.lock().await.insert(phone.to_string());
    }

    /// Jobs accepted so far, in publish order.
    pub async fn published(&self) -> Vec<DispatchJob> {
        self.published.lock().await.clone()
    }

    pub async fn published_count(&self) -> usize {
        self.published.lock().await.len()
    }

    /// Drain the accepted jobs, as a queue delivering them would.
    pub async fn take_published(&self) -> Vec<DispatchJob> {
        std::mem::take(&mut *self.published.lock().await)
    }
}

#[async_trait]
impl PluginAdapter for MockQueue {
    fn name(&self) -> &str {
        "mock-queue"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, WacastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WacastError> {
        Ok(())
    }
}

#[async_trait]
impl QueueAdapter for MockQueue {
    async fn publish(&self, job: &DispatchJob) -> Result<String, WacastError> {
        if self.refused.lock().await.contains(&job.contact.phone) {
            return Err(WacastError::Queue {
                message: format!("mock queue refused {}", job.contact.phone),
                source: None,
            });
        }
        self.published.lock().await.push(job.clone());
        Ok(format!("msg_mock_{}", uuid::Uuid::new_v4().simple()))
    }
}
