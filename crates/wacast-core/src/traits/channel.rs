// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging provider (WhatsApp Cloud API).

use async_trait::async_trait;

use crate::error::WacastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SendReceipt, TemplateSend};

/// Adapter that delivers template messages through a messaging provider.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Sends exactly one template request.
    ///
    /// Returns [`WacastError::ProviderRejected`] when the provider answers with
    /// a structured rejection, and a transient error (see
    /// [`WacastError::is_transient`]) for transport or provider-side outages.
    async fn send_template(&self, request: &TemplateSend) -> Result<SendReceipt, WacastError>;
}
