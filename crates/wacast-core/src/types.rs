// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the dispatch pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Queue,
    Storage,
}

// --- Tenancy ---

/// A tenant with its own WhatsApp Business number.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    /// Permanent Cloud API access token.
    pub whatsapp_token: String,
    /// Provider phone-number id used in the send URL and webhook metadata.
    pub number_id: String,
}

impl std::fmt::Debug for Company {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Company")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("whatsapp_token", &"[redacted]")
            .field("number_id", &self.number_id)
            .finish()
    }
}

/// A named, company-scoped tag grouping contacts for targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub company_id: String,
    pub name: String,
}

/// A contact, unique on `(phone, company_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub company_id: String,
    pub name: String,
    /// Phone exactly as stored (the blocklist matches on this form).
    pub phone: String,
    pub email: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
    pub segments: Vec<String>,
    pub created_at: String,
}

/// A provider-approved message template with zero or one body variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub template_name: String,
    /// Exact provider-side name, preferred over `template_name` when set.
    pub code_name: Option<String>,
    /// Name of the single declared body parameter, if the template has one.
    pub variable_name: Option<String>,
    pub language_code: String,
}

impl Template {
    /// The name sent to the provider.
    pub fn wire_name(&self) -> String {
        self.code_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.template_name.trim())
            .to_string()
    }

    /// The declared parameter name, with blank values treated as absent.
    pub fn declared_variable(&self) -> Option<&str> {
        self.variable_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A `(phone, company)` pair excluded from every campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistEntry {
    pub id: String,
    pub company_id: String,
    pub phone: String,
    pub reason: String,
    pub created_at: String,
}

// --- Campaigns ---

/// Lifecycle of a campaign: `Sending -> {Completed, Failed}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum CampaignStatus {
    Sending,
    Completed,
    Failed,
}

/// One bulk send of one template to one segment, with aggregate delivery counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub company_id: String,
    pub segment_id: String,
    pub template_name: String,
    pub status: CampaignStatus,
    pub total_sent: i64,
    pub sent_count: i64,
    pub delivered_count: i64,
    pub read_count: i64,
    pub failed_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Campaign {
    /// Whether every target has a terminal send result.
    pub fn is_fully_accounted(&self) -> bool {
        self.sent_count + self.failed_count >= self.total_sent
    }
}

/// Fields required to create a campaign record.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub company_id: String,
    pub segment_id: String,
    pub template_name: String,
    pub total_sent: i64,
}

// --- Messages ---

/// Direction of a stored message relative to the business.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Delivery status of a message.
///
/// `Sent < Delivered < Read` is the only forward order; `Failed` is terminal
/// and outside the order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    /// Position in the forward order, `None` for the terminal `Failed`.
    pub fn rank(self) -> Option<u8> {
        match self {
            MessageStatus::Sent => Some(0),
            MessageStatus::Delivered => Some(1),
            MessageStatus::Read => Some(2),
            MessageStatus::Failed => None,
        }
    }
}

/// A stored inbound or outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub company_id: String,
    pub contact_id: Option<String>,
    pub campaign_id: Option<String>,
    pub wa_message_id: Option<String>,
    pub body: String,
    pub direction: Direction,
    pub status: MessageStatus,
    pub is_read: bool,
    pub error: Option<String>,
    pub created_at: String,
}

// --- Dispatch ---

/// Contact fields carried inside a queue job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSnapshot {
    pub id: String,
    pub name: String,
    /// Phone already normalized to the provider wire format.
    pub phone: String,
}

/// One queue job: everything the worker needs to perform one send.
///
/// The worker never re-reads the company, template, or contact from storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchJob {
    pub contact: ContactSnapshot,
    pub template_name: String,
    pub company_token: String,
    pub company_number_id: String,
    pub company_id: String,
    pub campaign_id: String,
    #[serde(default)]
    pub variable_name: Option<String>,
    pub variable_value: String,
    pub language_code: String,
    pub api_version: String,
}

impl std::fmt::Debug for DispatchJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchJob")
            .field("contact", &self.contact)
            .field("template_name", &self.template_name)
            .field("company_token", &"[redacted]")
            .field("company_number_id", &self.company_number_id)
            .field("company_id", &self.company_id)
            .field("campaign_id", &self.campaign_id)
            .field("variable_name", &self.variable_name)
            .field("variable_value", &self.variable_value)
            .field("language_code", &self.language_code)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// A named body parameter for a template send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub name: String,
    pub value: String,
}

/// One well-formed template send request.
#[derive(Clone, PartialEq, Eq)]
pub struct TemplateSend {
    pub api_version: String,
    pub number_id: String,
    pub token: String,
    pub to: String,
    pub template_name: String,
    pub language_code: String,
    pub parameter: Option<TemplateParameter>,
}

impl std::fmt::Debug for TemplateSend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSend")
            .field("api_version", &self.api_version)
            .field("number_id", &self.number_id)
            .field("token", &"[redacted]")
            .field("to", &self.to)
            .field("template_name", &self.template_name)
            .field("language_code", &self.language_code)
            .field("parameter", &self.parameter)
            .finish()
    }
}

impl From<&DispatchJob> for TemplateSend {
    fn from(job: &DispatchJob) -> Self {
        let parameter = job
            .variable_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| TemplateParameter {
                name: name.to_string(),
                value: job.variable_value.clone(),
            });
        Self {
            api_version: job.api_version.clone(),
            number_id: job.company_number_id.clone(),
            token: job.company_token.clone(),
            to: job.contact.phone.clone(),
            template_name: job.template_name.clone(),
            language_code: job.language_code.clone(),
            parameter,
        }
    }
}

/// Provider acknowledgement of an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub provider_message_id: String,
}

/// Result of executing one queue job, returned to the worker endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Webhook events ---

/// A provider delivery-status event for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub wa_message_id: String,
    pub status: MessageStatus,
    /// Provider error title, present on `failed` statuses.
    pub error: Option<String>,
}

/// An inbound reply received on a company number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReply {
    pub from_phone: String,
    pub company_number_id: String,
    pub wa_message_id: String,
    pub text: String,
}

/// What the reconciler did with a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The message moved forward; counters were incremented as required.
    Applied {
        from: MessageStatus,
        to: MessageStatus,
    },
    /// The event was not ahead of the stored status.
    Stale,
    /// The message already failed.
    Terminal,
    /// No message carries this provider id.
    UnknownMessage,
}

/// What the reconciler did with an inbound reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    Stored,
    Duplicate,
    UnknownCompany,
    UnknownContact,
}
