// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite).

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::WacastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    BlocklistEntry, Campaign, CampaignStatus, Company, Contact, Message, MessageStatus,
    NewCampaign, Segment, Template,
};

/// A campaign aggregate counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl CounterField {
    /// Column backing this counter in the `campaigns` table.
    pub fn column(self) -> &'static str {
        match self {
            CounterField::Sent => "sent_count",
            CounterField::Delivered => "delivered_count",
            CounterField::Read => "read_count",
            CounterField::Failed => "failed_count",
        }
    }
}

/// The terminal result of one send attempt, written together with its counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub company_id: String,
    pub campaign_id: String,
    pub contact_id: String,
    pub body: String,
    pub wa_message_id: Option<String>,
    /// Either [`MessageStatus::Sent`] or [`MessageStatus::Failed`].
    pub status: MessageStatus,
    pub error: Option<String>,
}

impl OutboundRecord {
    /// The counter this record increments when it is first written.
    pub fn counter(&self) -> CounterField {
        match self.status {
            MessageStatus::Failed => CounterField::Failed,
            _ => CounterField::Sent,
        }
    }
}

/// Adapter for the persistence backend.
///
/// Counter-changing methods ([`insert_outbound`](Self::insert_outbound) and
/// [`transition_message`](Self::transition_message)) are conditional: the
/// counter moves only when the accompanying message write takes effect, and
/// both happen in one transaction.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), WacastError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), WacastError>;

    // --- Tenancy and catalog ---

    async fn create_company(&self, company: &Company) -> Result<(), WacastError>;
    async fn get_company(&self, id: &str) -> Result<Option<Company>, WacastError>;
    async fn find_company_by_number_id(
        &self,
        number_id: &str,
    ) -> Result<Option<Company>, WacastError>;
    async fn create_segment(&self, segment: &Segment) -> Result<(), WacastError>;
    async fn create_template(&self, template: &Template) -> Result<(), WacastError>;
    async fn get_template(&self, id: &str) -> Result<Option<Template>, WacastError>;

    // --- Contacts ---

    /// Inserts a contact together with its segment memberships.
    async fn create_contact(&self, contact: &Contact) -> Result<(), WacastError>;

    /// Contacts of `company_id` that belong to `segment_id`, in insertion order.
    async fn list_segment_contacts(
        &self,
        company_id: &str,
        segment_id: &str,
    ) -> Result<Vec<Contact>, WacastError>;

    /// Contacts of a company whose phone, with every non-digit removed,
    /// equals one of `digits`.
    async fn find_contacts_by_phone_digits(
        &self,
        company_id: &str,
        digits: &[String],
    ) -> Result<Vec<Contact>, WacastError>;

    // --- Blocklist ---

    /// Returns false if the phone is already blocked for the company.
    async fn add_blocklist_entry(&self, entry: &BlocklistEntry) -> Result<bool, WacastError>;
    async fn remove_blocklist_entry(&self, id: &str) -> Result<bool, WacastError>;
    async fn list_blocklist(
        &self,
        company_id: Option<&str>,
    ) -> Result<Vec<BlocklistEntry>, WacastError>;

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, WacastError>;
    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, WacastError>;

    /// Campaigns, newest first.
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, WacastError>;

    /// Deletes a campaign and its messages. Returns false if it did not exist.
    async fn delete_campaign(&self, id: &str) -> Result<bool, WacastError>;

    /// Moves a `Sending` campaign whose results are all in to `Completed`
    /// (any message sent) or `Failed` (none sent). Returns the new status when
    /// a transition happened, `None` otherwise.
    async fn settle_campaign(&self, id: &str) -> Result<Option<CampaignStatus>, WacastError>;

    // --- Messages ---

    /// Contact ids that already have a non-failed outbound message for the campaign.
    async fn contacts_with_active_messages(
        &self,
        campaign_id: &str,
    ) -> Result<HashSet<String>, WacastError>;

    /// The outbound message for `(campaign, contact)`, if one was recorded.
    async fn find_outbound(
        &self,
        campaign_id: &str,
        contact_id: &str,
    ) -> Result<Option<Message>, WacastError>;

    async fn get_message_by_wa_id(
        &self,
        wa_message_id: &str,
    ) -> Result<Option<Message>, WacastError>;

    /// Records a send result and increments its counter. Returns false without
    /// touching counters when `(campaign, contact)` already has an outbound
    /// message.
    async fn insert_outbound(&self, record: &OutboundRecord) -> Result<bool, WacastError>;

    /// Compare-and-set of a message status keyed by provider id: moves
    /// `from -> to` and increments `increments` on the owning campaign only if
    /// the stored status is still `from`.
    async fn transition_message(
        &self,
        wa_message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
        increments: &[CounterField],
    ) -> Result<bool, WacastError>;

    /// Inserts an inbound message. Returns false if its provider id is already stored.
    async fn insert_inbound(&self, message: &Message) -> Result<bool, WacastError>;

    /// Inbound messages, newest first.
    async fn list_inbound(&self, limit: Option<i64>) -> Result<Vec<Message>, WacastError>;

    async fn mark_read(&self, id: &str) -> Result<bool, WacastError>;
    async fn mark_all_read(&self) -> Result<u64, WacastError>;
}
