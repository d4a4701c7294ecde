// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution of one queue job: a single provider send and its result.

use std::sync::Arc;

use tracing::{info, warn};
use wacast_core::traits::OutboundRecord;
use wacast_core::types::{DispatchJob, MessageStatus, SendResult, TemplateSend};
use wacast_core::{ChannelAdapter, StorageAdapter, WacastError};

use crate::enqueue::outbound_body;
use crate::reconciler::Reconciler;

/// Where a delivery sits within the queue's retry budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryAttempt {
    /// Redeliveries that happened before this one.
    pub retried: u32,
}

impl DeliveryAttempt {
    pub fn retried(retried: u32) -> Self {
        Self { retried }
    }

    /// Whether the queue will not redeliver after this attempt.
    pub fn is_last(self, retries: u32) -> bool {
        self.retried >= retries
    }
}

/// Performs provider sends for delivered queue jobs.
#[derive(Clone)]
pub struct Worker {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    reconciler: Reconciler,
    retries: u32,
}

impl Worker {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        reconciler: Reconciler,
        retries: u32,
    ) -> Self {
        Self {
            storage,
            channel,
            reconciler,
            retries,
        }
    }

    /// Sends one job and records the result.
    ///
    /// `Ok` means the job reached a terminal outcome (accepted, rejected, or
    /// already handled) and must not be redelivered. `Err` carries a
    /// transient failure the queue should retry.
    pub async fn send_one(
        &self,
        job: &DispatchJob,
        attempt: DeliveryAttempt,
    ) -> Result<SendResult, WacastError> {
        if let Some(existing) = self
            .storage
            .find_outbound(&job.campaign_id, &job.contact.id)
            .await?
        {
            info!(
                campaign_id = %job.campaign_id,
                contact_id = %job.contact.id,
                status = %existing.status,
                "job already handled, not re-sending"
            );
            return Ok(SendResult {
                ok: existing.status != MessageStatus::Failed,
                provider_message_id: existing.wa_message_id,
                error: existing.error,
            });
        }

        let request = TemplateSend::from(job);
        let error = match self.channel.send_template(&request).await {
            Ok(receipt) => {
                self.record(
                    job,
                    MessageStatus::Sent,
                    Some(receipt.provider_message_id.clone()),
                    None,
                )
                .await?;
                info!(
                    campaign_id = %job.campaign_id,
                    contact_id = %job.contact.id,
                    wa_message_id = %receipt.provider_message_id,
                    "message sent"
                );
                return Ok(SendResult {
                    ok: true,
                    provider_message_id: Some(receipt.provider_message_id),
                    error: None,
                });
            }
            Err(WacastError::ProviderRejected { message, .. }) => message,
            Err(e) if e.is_transient() && !attempt.is_last(self.retries) => {
                warn!(
                    campaign_id = %job.campaign_id,
                    contact_id = %job.contact.id,
                    retried = attempt.retried,
                    error = %e,
                    "transient send failure, leaving for redelivery"
                );
                return Err(e);
            }
            Err(e) => e.to_string(),
        };

        warn!(
            campaign_id = %job.campaign_id,
            contact_id = %job.contact.id,
            error = %error,
            "send failed"
        );
        self.record(job, MessageStatus::Failed, None, Some(error.clone()))
            .await?;
        Ok(SendResult {
            ok: false,
            provider_message_id: None,
            error: Some(error),
        })
    }

    async fn record(
        &self,
        job: &DispatchJob,
        status: MessageStatus,
        wa_message_id: Option<String>,
        error: Option<String>,
    ) -> Result<(), WacastError> {
        let record = OutboundRecord {
            company_id: job.company_id.clone(),
            campaign_id: job.campaign_id.clone(),
            contact_id: job.contact.id.clone(),
            body: outbound_body(&job.template_name),
            wa_message_id,
            status,
            error,
        };
        self.reconciler.record_send_result(&record).await?;
        Ok(())
    }
}
