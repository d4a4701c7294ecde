// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign start and test sends.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use wacast_core::types::{
    Campaign, Company, NewCampaign, SendReceipt, Template, TemplateParameter, TemplateSend,
};
use wacast_core::{ChannelAdapter, QueueAdapter, StorageAdapter, WacastError};

use crate::enqueue::{DispatchSettings, EnqueueFailure, Fanout};
use crate::phone::PhoneNormalizer;
use crate::reconciler::Reconciler;
use crate::selector::select_targets;
use crate::worker::Worker;

/// A request to send one template to one segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCampaign {
    pub company_id: String,
    pub segment_id: String,
    pub template_id: String,
    /// Campaign name; the template's display name when absent.
    #[serde(default)]
    pub name: Option<String>,
}

/// What starting a campaign did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReport {
    pub campaign_id: String,
    pub total_sent: i64,
    pub queued: usize,
    pub skipped_blocked: usize,
    pub skipped_duplicate: usize,
    pub skipped_existing: usize,
    pub enqueue_failures: Vec<EnqueueFailure>,
}

/// Entry point for campaign dispatch.
pub struct Dispatcher {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    queue: Option<Arc<dyn QueueAdapter>>,
    normalizer: Arc<dyn PhoneNormalizer>,
    reconciler: Reconciler,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        normalizer: Arc<dyn PhoneNormalizer>,
        settings: DispatchSettings,
    ) -> Self {
        let reconciler = Reconciler::new(storage.clone(), normalizer.clone());
        Self {
            storage,
            channel,
            queue: None,
            normalizer,
            reconciler,
            settings,
        }
    }

    /// Attaches the queue jobs are published to. Without one, campaigns
    /// cannot be started.
    pub fn with_queue(mut self, queue: Arc<dyn QueueAdapter>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// A worker sharing this dispatcher's storage, provider, and reconciler.
    pub fn worker(&self) -> Worker {
        Worker::new(
            self.storage.clone(),
            self.channel.clone(),
            self.reconciler.clone(),
            self.settings.retries,
        )
    }

    async fn company_and_template(
        &self,
        company_id: &str,
        template_id: &str,
    ) -> Result<(Company, Template), WacastError> {
        let company = self
            .storage
            .get_company(company_id)
            .await?
            .ok_or_else(|| WacastError::not_found("company", company_id))?;
        let template = self
            .storage
            .get_template(template_id)
            .await?
            .filter(|t| t.company_id == company.id)
            .ok_or_else(|| WacastError::not_found("template", template_id))?;
        Ok((company, template))
    }

    /// Selects targets, creates the campaign record, and enqueues one job
    /// per target.
    ///
    /// No campaign is created when selection comes back empty.
    pub async fn start_campaign(&self, request: &StartCampaign) -> Result<StartReport, WacastError> {
        let queue = self.queue.as_deref().ok_or_else(|| {
            WacastError::Config("queue.token is required to start campaigns".into())
        })?;
        let (company, template) = self
            .company_and_template(&request.company_id, &request.template_id)
            .await?;

        let selection = select_targets(
            self.storage.as_ref(),
            self.normalizer.as_ref(),
            &company.id,
            &request.segment_id,
        )
        .await?;

        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&template.name)
            .to_string();
        let campaign: Campaign = self
            .storage
            .create_campaign(&NewCampaign {
                name,
                company_id: company.id.clone(),
                segment_id: request.segment_id.clone(),
                template_name: template.wire_name(),
                total_sent: selection.targets.len() as i64,
            })
            .await?;
        info!(
            campaign_id = %campaign.id,
            company_id = %company.id,
            targets = selection.targets.len(),
            "campaign created"
        );

        let fanout = Fanout {
            queue,
            storage: self.storage.as_ref(),
            reconciler: &self.reconciler,
            settings: &self.settings,
        };
        let report = fanout
            .enqueue(&campaign, &company, &template, &selection.targets)
            .await?;
        info!(
            campaign_id = %campaign.id,
            queued = report.queued,
            failures = report.enqueue_failures.len(),
            "campaign enqueued"
        );

        Ok(StartReport {
            campaign_id: campaign.id,
            total_sent: campaign.total_sent,
            queued: report.queued,
            skipped_blocked: selection.skipped_blocked,
            skipped_duplicate: selection.skipped_duplicate,
            skipped_existing: report.skipped_existing,
            enqueue_failures: report.enqueue_failures,
        })
    }

    /// Sends one correctly shaped template message to an arbitrary phone,
    /// outside any campaign. Nothing is recorded.
    pub async fn test_send(
        &self,
        company_id: &str,
        template_id: &str,
        phone: &str,
    ) -> Result<SendReceipt, WacastError> {
        let (company, template) = self.company_and_template(company_id, template_id).await?;
        let language_code = match template.language_code.trim() {
            "" => self.settings.language_code.clone(),
            code => code.to_string(),
        };
        let request = TemplateSend {
            api_version: self.settings.api_version.clone(),
            number_id: company.number_id.clone(),
            token: company.whatsapp_token.clone(),
            to: self.normalizer.normalize(phone),
            template_name: template.wire_name(),
            language_code,
            parameter: template.declared_variable().map(|name| TemplateParameter {
                name: name.to_string(),
                value: self.settings.default_variable_value.clone(),
            }),
        };
        let receipt = self.channel.send_template(&request).await?;
        info!(
            company_id = %company.id,
            template = %request.template_name,
            wa_message_id = %receipt.provider_message_id,
            "test message sent"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::CountryCodeNormalizer;
    use crate::worker::DeliveryAttempt;
    use wacast_core::types::{CampaignStatus, MessageStatus, StatusEvent, StatusOutcome};
    use wacast_test_utils::harness::{COMPANY_ID, SEGMENT_ID, TEMPLATE_ID};
    use wacast_test_utils::{MockOutcome, TestHarness};

    fn dispatcher(h: &TestHarness) -> Dispatcher {
        Dispatcher::new(
            h.storage.clone(),
            h.channel.clone(),
            Arc::new(CountryCodeNormalizer::default()),
            DispatchSettings::default(),
        )
        .with_queue(h.queue.clone())
    }

    fn request() -> StartCampaign {
        StartCampaign {
            company_id: COMPANY_ID.into(),
            segment_id: SEGMENT_ID.into(),
            template_id: TEMPLATE_ID.into(),
            name: None,
        }
    }

    #[tokio::test]
    async fn blocked_and_duplicate_contacts_leave_one_target() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_contact("Asha (work)", "+91 98765 43210")
            .with_contact("Ravi", "9876500000")
            .with_blocked("9876500000")
            .build()
            .await
            .unwrap();

        let report = dispatcher(&h).start_campaign(&request()).await.unwrap();

        assert_eq!(report.total_sent, 1);
        assert_eq!(report.queued, 1);
        assert_eq!(report.skipped_blocked, 1);
        assert_eq!(report.skipped_duplicate, 1);
        let campaign = h.campaign(&report.campaign_id).await;
        assert_eq!(campaign.total_sent, 1);
        assert_eq!(campaign.name, "Festive Offer");
        assert_eq!(campaign.status, CampaignStatus::Sending);
    }

    #[tokio::test]
    async fn one_failed_publish_does_not_stop_the_batch() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_contact("Ravi", "9876500000")
            .build()
            .await
            .unwrap();
        h.queue.refuse_phone("919876500000").await;

        let report = dispatcher(&h).start_campaign(&request()).await.unwrap();

        assert_eq!(report.queued, 1);
        assert_eq!(report.enqueue_failures.len(), 1);
        assert_eq!(report.enqueue_failures[0].contact_id, "ct-2");
        assert_eq!(h.queue.published().await[0].contact.id, "ct-1");

        let campaign = h.campaign(&report.campaign_id).await;
        assert_eq!((campaign.sent_count, campaign.failed_count), (0, 1));
        let failed = h
            .storage
            .find_outbound(&report.campaign_id, "ct-2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failed.status, MessageStatus::Failed);
    }

    #[tokio::test]
    async fn empty_selection_creates_no_campaign() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_blocked("9876543210")
            .build()
            .await
            .unwrap();

        let err = dispatcher(&h).start_campaign(&request()).await.unwrap_err();
        assert!(matches!(err, WacastError::EmptyTargetSet));
        assert!(h.storage.list_campaigns().await.unwrap().is_empty());
        assert_eq!(h.queue.published_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .build()
            .await
            .unwrap();
        let mut req = request();
        req.template_id = "tpl-missing".into();

        let err = dispatcher(&h).start_campaign(&req).await.unwrap_err();
        assert!(matches!(err, WacastError::NotFound { entity: "template", .. }));
    }

    #[tokio::test]
    async fn no_queue_means_no_campaign() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .build()
            .await
            .unwrap();
        let d = Dispatcher::new(
            h.storage.clone(),
            h.channel.clone(),
            Arc::new(CountryCodeNormalizer::default()),
            DispatchSettings::default(),
        );

        let err = d.start_campaign(&request()).await.unwrap_err();
        assert!(matches!(err, WacastError::Config(_)));
        assert!(h.storage.list_campaigns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_pipeline_keeps_counters_consistent() {
        let h = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_contact("Ravi", "9876500000")
            .with_contact("Meera", "9876511111")
            .build()
            .await
            .unwrap();
        h.channel
            .set_outcome(
                "919876511111",
                MockOutcome::Reject {
                    code: 131026,
                    message: "Message undeliverable".into(),
                },
            )
            .await;
        let d = dispatcher(&h);
        let report = d.start_campaign(&request()).await.unwrap();

        let worker = d.worker();
        for job in h.queue.take_published().await {
            worker.send_one(&job, DeliveryAttempt::default()).await.unwrap();
        }

        let asha = h.channel.provider_id_for("919876543210").await.unwrap();
        let ravi = h.channel.provider_id_for("919876500000").await.unwrap();
        let events = [
            (ravi.as_str(), MessageStatus::Read),
            (asha.as_str(), MessageStatus::Delivered),
            (ravi.as_str(), MessageStatus::Delivered),
            (asha.as_str(), MessageStatus::Delivered),
            (asha.as_str(), MessageStatus::Failed),
        ];
        for (wa_id, status) in events {
            d.reconciler()
                .apply_status(&StatusEvent {
                    wa_message_id: wa_id.to_string(),
                    status,
                    error: None,
                })
                .await
                .unwrap();
        }
        let again = d
            .reconciler()
            .apply_status(&StatusEvent {
                wa_message_id: asha.clone(),
                status: MessageStatus::Read,
                error: None,
            })
            .await
            .unwrap();
        assert!(matches!(again, StatusOutcome::Applied { .. }));

        let c = h.campaign(&report.campaign_id).await;
        assert_eq!(c.status, CampaignStatus::Completed);
        assert_eq!(
            (c.sent_count, c.failed_count, c.delivered_count, c.read_count),
            (2, 1, 2, 2)
        );
        assert!(c.read_count <= c.delivered_count && c.delivered_count <= c.total_sent);
        assert!(c.sent_count + c.failed_count <= c.total_sent);
    }

    #[tokio::test]
    async fn test_send_uses_declared_parameter_once() {
        let h = TestHarness::builder().build().await.unwrap();
        let d = dispatcher(&h);

        let receipt = d.test_send(COMPANY_ID, TEMPLATE_ID, "98765 43210").await.unwrap();
        assert!(receipt.provider_message_id.starts_with("wamid."));

        let requests = h.channel.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].to, "919876543210");
        assert_eq!(requests[0].parameter.as_ref().unwrap().value, "Customer");
        assert!(h.storage.list_campaigns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_surfaces_provider_error() {
        let h = TestHarness::builder()
            .without_template_variable()
            .build()
            .await
            .unwrap();
        h.channel
            .set_outcome(
                "919876543210",
                MockOutcome::Reject {
                    code: 132000,
                    message: "Number of parameters does not match".into(),
                },
            )
            .await;

        let err = dispatcher(&h)
            .test_send(COMPANY_ID, TEMPLATE_ID, "9876543210")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Number of parameters does not match"));
        assert!(h.channel.requests().await[0].parameter.is_none());
    }
}
