// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue adapter trait for the external dispatch queue.

use async_trait::async_trait;

use crate::error::WacastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::DispatchJob;

/// Adapter that hands one job to an external queue for later delivery to the
/// worker endpoint.
///
/// Retries and backoff belong to the queue; implementations publish once and
/// attach the configured retry budget to the message.
#[async_trait]
pub trait QueueAdapter: PluginAdapter {
    /// Publishes one job and returns the queue-assigned message id.
    async fn publish(&self, job: &DispatchJob) -> Result<String, WacastError>;
}
