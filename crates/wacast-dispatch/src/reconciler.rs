// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery status reconciliation.
//!
//! The reconciler is the only writer of campaign counters. Send results and
//! webhook status events both land here, and every counter increment is
//! committed together with the message write that justifies it.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wacast_core::traits::{CounterField, OutboundRecord};
use wacast_core::types::{
    CampaignStatus, Direction, InboundOutcome, InboundReply, Message, MessageStatus, StatusEvent,
    StatusOutcome,
};
use wacast_core::{StorageAdapter, WacastError};

use crate::phone::PhoneNormalizer;

/// What a status event should do to a message in a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Move forward, incrementing these counters.
    Advance(Vec<CounterField>),
    /// Not ahead of the current status.
    Stale,
    /// The message already failed.
    Terminal,
}

/// Decides the transition for a message currently at `current` receiving `new`.
///
/// Only forward moves in `sent < delivered < read` apply. A message that
/// reaches `read` without a recorded `delivered` counts as delivered too, so
/// `read_count <= delivered_count` holds whatever order events arrive in.
pub fn plan_transition(current: MessageStatus, new: MessageStatus) -> Plan {
    let Some(from) = current.rank() else {
        return Plan::Terminal;
    };
    let Some(to) = new.rank() else {
        return Plan::Stale;
    };
    if to <= from {
        return Plan::Stale;
    }
    let mut increments = Vec::with_capacity(2);
    if current == MessageStatus::Sent {
        increments.push(CounterField::Delivered);
    }
    if new == MessageStatus::Read {
        increments.push(CounterField::Read);
    }
    Plan::Advance(increments)
}

/// Applies send results, status events, and inbound replies to storage.
#[derive(Clone)]
pub struct Reconciler {
    storage: Arc<dyn StorageAdapter>,
    normalizer: Arc<dyn PhoneNormalizer>,
}

impl Reconciler {
    pub fn new(storage: Arc<dyn StorageAdapter>, normalizer: Arc<dyn PhoneNormalizer>) -> Self {
        Self {
            storage,
            normalizer,
        }
    }

    /// Records the terminal result of one send and attempts settlement.
    ///
    /// Returns false when the `(campaign, contact)` pair already had a
    /// result; counters are then left untouched.
    pub async fn record_send_result(&self, record: &OutboundRecord) -> Result<bool, WacastError> {
        let inserted = self.storage.insert_outbound(record).await?;
        if !inserted {
            debug!(
                campaign_id = %record.campaign_id,
                contact_id = %record.contact_id,
                "send result already recorded"
            );
            return Ok(false);
        }
        debug!(
            campaign_id = %record.campaign_id,
            contact_id = %record.contact_id,
            status = %record.status,
            "send result recorded"
        );
        self.settle(&record.campaign_id).await?;
        Ok(true)
    }

    /// Applies one provider status event.
    pub async fn apply_status(&self, event: &StatusEvent) -> Result<StatusOutcome, WacastError> {
        if event.status == MessageStatus::Failed {
            warn!(
                wa_message_id = %event.wa_message_id,
                error = event.error.as_deref().unwrap_or("unknown"),
                "provider reported delivery failure"
            );
        }

        loop {
            let Some(message) = self
                .storage
                .get_message_by_wa_id(&event.wa_message_id)
                .await?
            else {
                debug!(wa_message_id = %event.wa_message_id, "status for unknown message");
                return Ok(StatusOutcome::UnknownMessage);
            };

            let increments = match plan_transition(message.status, event.status) {
                Plan::Advance(increments) => increments,
                Plan::Stale => {
                    debug!(
                        wa_message_id = %event.wa_message_id,
                        current = %message.status,
                        received = %event.status,
                        "stale status ignored"
                    );
                    return Ok(StatusOutcome::Stale);
                }
                Plan::Terminal => return Ok(StatusOutcome::Terminal),
            };

            let applied = self
                .storage
                .transition_message(&event.wa_message_id, message.status, event.status, &increments)
                .await?;
            if applied {
                debug!(
                    wa_message_id = %event.wa_message_id,
                    from = %message.status,
                    to = %event.status,
                    "status advanced"
                );
                return Ok(StatusOutcome::Applied {
                    from: message.status,
                    to: event.status,
                });
            }
            // The stored status moved between the read and the swap; re-plan
            // against the fresh value.
        }
    }

    /// Stores an inbound reply against the contact it came from.
    pub async fn handle_inbound(&self, reply: &InboundReply) -> Result<InboundOutcome, WacastError> {
        let Some(company) = self
            .storage
            .find_company_by_number_id(&reply.company_number_id)
            .await?
        else {
            info!(number_id = %reply.company_number_id, "reply for unknown company number");
            return Ok(InboundOutcome::UnknownCompany);
        };

        let from = self.normalizer.normalize(&reply.from_phone);
        let candidates = self.normalizer.stored_digit_forms(&from);
        let contact = self
            .storage
            .find_contacts_by_phone_digits(&company.id, &candidates)
            .await?
            .into_iter()
            .find(|c| self.normalizer.normalize(&c.phone) == from);
        let Some(contact) = contact else {
            info!(company_id = %company.id, "reply from unknown contact");
            return Ok(InboundOutcome::UnknownContact);
        };

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            company_id: company.id.clone(),
            contact_id: Some(contact.id.clone()),
            campaign_id: None,
            wa_message_id: Some(reply.wa_message_id.clone()),
            body: reply.text.clone(),
            direction: Direction::Inbound,
            status: MessageStatus::Delivered,
            is_read: false,
            error: None,
            created_at: String::new(),
        };
        if !self.storage.insert_inbound(&message).await? {
            debug!(wa_message_id = %reply.wa_message_id, "duplicate inbound reply");
            return Ok(InboundOutcome::Duplicate);
        }
        info!(company_id = %company.id, contact_id = %contact.id, "inbound reply stored");
        Ok(InboundOutcome::Stored)
    }

    /// Settles a campaign whose send results are all in. Idempotent.
    pub async fn settle(&self, campaign_id: &str) -> Result<Option<CampaignStatus>, WacastError> {
        let settled = self.storage.settle_campaign(campaign_id).await?;
        if let Some(status) = settled {
            info!(campaign_id, status = %status, "campaign settled");
        }
        Ok(settled)
    }
}
