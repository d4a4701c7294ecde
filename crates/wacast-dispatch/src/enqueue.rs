// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of one queue job per campaign target.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};
use wacast_config::model::WacastConfig;
use wacast_core::traits::OutboundRecord;
use wacast_core::types::{Campaign, Company, ContactSnapshot, DispatchJob, MessageStatus, Template};
use wacast_core::{QueueAdapter, StorageAdapter, WacastError};

use crate::reconciler::Reconciler;
use crate::selector::Target;

/// Settings shared by fan-out and the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub batch_size: usize,
    pub default_variable_value: String,
    pub api_version: String,
    /// Used when a template has no language code of its own.
    pub language_code: String,
    /// Redelivery budget the queue attaches to each job.
    pub retries: u32,
}

impl DispatchSettings {
    pub fn from_config(config: &WacastConfig) -> Self {
        Self {
            batch_size: config.dispatch.batch_size,
            default_variable_value: config.dispatch.default_variable_value.clone(),
            api_version: config.whatsapp.api_version.clone(),
            language_code: config.whatsapp.language_code.clone(),
            retries: config.queue.retries,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&WacastConfig::default())
    }
}

/// A target whose job could not be handed to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueFailure {
    pub contact_id: String,
    pub phone: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueReport {
    pub queued: usize,
    pub skipped_existing: usize,
    pub enqueue_failures: Vec<EnqueueFailure>,
}

/// Body stored on outbound messages.
pub(crate) fn outbound_body(template_name: &str) -> String {
    format!("Template: {template_name}")
}

/// Builds the self-contained job for one target.
pub fn build_job(
    settings: &DispatchSettings,
    company: &Company,
    template: &Template,
    campaign_id: &str,
    target: &Target,
) -> DispatchJob {
    let name = target.contact.name.trim();
    let variable_value = if name.is_empty() {
        settings.default_variable_value.clone()
    } else {
        name.to_string()
    };
    let language_code = match template.language_code.trim() {
        "" => settings.language_code.clone(),
        code => code.to_string(),
    };
    DispatchJob {
        contact: ContactSnapshot {
            id: target.contact.id.clone(),
            name: target.contact.name.clone(),
            phone: target.phone.clone(),
        },
        template_name: template.wire_name(),
        company_token: company.whatsapp_token.clone(),
        company_number_id: company.number_id.clone(),
        company_id: company.id.clone(),
        campaign_id: campaign_id.to_string(),
        variable_name: template.declared_variable().map(str::to_string),
        variable_value,
        language_code,
        api_version: settings.api_version.clone(),
    }
}

/// Publishes campaign jobs in bounded concurrent batches.
pub struct Fanout<'a> {
    pub queue: &'a dyn QueueAdapter,
    pub storage: &'a dyn StorageAdapter,
    pub reconciler: &'a Reconciler,
    pub settings: &'a DispatchSettings,
}

impl Fanout<'_> {
    /// Enqueues one job per target not already holding a live message for
    /// the campaign.
    ///
    /// A failed publish never aborts the batch: it is recorded as a failed
    /// outbound message so the campaign still settles, and reported back.
    pub async fn enqueue(
        &self,
        campaign: &Campaign,
        company: &Company,
        template: &Template,
        targets: &[Target],
    ) -> Result<EnqueueReport, WacastError> {
        let existing = self
            .storage
            .contacts_with_active_messages(&campaign.id)
            .await?;

        let mut report = EnqueueReport::default();
        let pending: Vec<&Target> = targets
            .iter()
            .filter(|t| {
                let keep = !existing.contains(&t.contact.id);
                if !keep {
                    report.skipped_existing += 1;
                }
                keep
            })
            .collect();

        for batch in pending.chunks(self.settings.batch_size.max(1)) {
            let publishes = batch.iter().map(|target| async move {
                let job = build_job(self.settings, company, template, &campaign.id, target);
                (*target, self.queue.publish(&job).await)
            });

            for (target, result) in join_all(publishes).await {
                match result {
                    Ok(queue_id) => {
                        report.queued += 1;
                        debug!(
                            campaign_id = %campaign.id,
                            contact_id = %target.contact.id,
                            queue_id = %queue_id,
                            "job enqueued"
                        );
                    }
                    Err(e) => {
                        warn!(
                            campaign_id = %campaign.id,
                            contact_id = %target.contact.id,
                            error = %e,
                            "enqueue failed"
                        );
                        let record = OutboundRecord {
                            company_id: company.id.clone(),
                            campaign_id: campaign.id.clone(),
                            contact_id: target.contact.id.clone(),
                            body: outbound_body(&template.wire_name()),
                            wa_message_id: None,
                            status: MessageStatus::Failed,
                            error: Some(format!("enqueue failed: {e}")),
                        };
                        let error = match self.reconciler.record_send_result(&record).await {
                            Ok(_) => e.to_string(),
                            Err(store_err) => {
                                warn!(
                                    campaign_id = %campaign.id,
                                    contact_id = %target.contact.id,
                                    error = %store_err,
                                    "failed to record enqueue failure"
                                );
                                format!("{e} (failure record not stored: {store_err})")
                            }
                        };
                        report.enqueue_failures.push(EnqueueFailure {
                            contact_id: target.contact.id.clone(),
                            phone: target.phone.clone(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use wacast_core::types::Contact;

    fn company() -> Company {
        Company {
            id: "co-1".into(),
            name: "Acme".into(),
            whatsapp_token: "EAAG".into(),
            number_id: "1098765".into(),
        }
    }

    fn template(variable: Option<&str>, language: &str) -> Template {
        Template {
            id: "tpl".into(),
            company_id: "co-1".into(),
            name: "Offer".into(),
            template_name: "offer".into(),
            code_name: Some(" offer_v2 ".into()),
            variable_name: variable.map(String::from),
            language_code: language.into(),
        }
    }

    fn target(name: &str) -> Target {
        Target {
            contact: Contact {
                id: "ct-1".into(),
                company_id: "co-1".into(),
                name: name.into(),
                phone: "9876543210".into(),
                email: None,
                city: None,
                notes: None,
                segments: vec![],
                created_at: String::new(),
            },
            phone: "919876543210".into(),
        }
    }

    #[test]
    fn job_carries_everything_the_worker_needs() {
        let job = build_job(
            &DispatchSettings::default(),
            &company(),
            &template(Some("name"), "hi"),
            "cmp-1",
            &target(" Asha "),
        );
        assert_eq!(job.template_name, "offer_v2");
        assert_eq!(job.contact.phone, "919876543210");
        assert_eq!(job.variable_name.as_deref(), Some("name"));
        assert_eq!(job.variable_value, "Asha");
        assert_eq!(job.language_code, "hi");
        assert_eq!(job.api_version, "v17.0");
        assert_eq!(job.company_token, "EAAG");
    }

    #[test]
    fn nameless_contact_gets_default_value() {
        let job = build_job(
            &DispatchSettings::default(),
            &company(),
            &template(None, ""),
            "cmp-1",
            &target("  "),
        );
        assert_eq!(job.variable_value, "Customer");
        assert_eq!(job.variable_name, None);
        assert_eq!(job.language_code, "en_US");
    }

    #[tokio::test]
    async fn batches_respect_size_and_skip_existing() {
        use crate::phone::CountryCodeNormalizer;
        use crate::selector::select_targets;
        use wacast_core::types::NewCampaign;
        use wacast_test_utils::TestHarness;
        use wacast_test_utils::harness::{COMPANY_ID, SEGMENT_ID};

        let mut builder = TestHarness::builder();
        for i in 0..5 {
            builder = builder.with_contact(&format!("C{i}"), &format!("98765000{i:02}"));
        }
        let h = builder.build().await.unwrap();
        let normalizer = Arc::new(CountryCodeNormalizer::default());
        let reconciler = Reconciler::new(h.storage.clone(), normalizer.clone());
        let settings = DispatchSettings {
            batch_size: 2,
            ..DispatchSettings::default()
        };
        let selection =
            select_targets(h.storage.as_ref(), normalizer.as_ref(), COMPANY_ID, SEGMENT_ID)
                .await
                .unwrap();
        let campaign = h
            .storage
            .create_campaign(&NewCampaign {
                name: "Offer".into(),
                company_id: COMPANY_ID.into(),
                segment_id: SEGMENT_ID.into(),
                template_name: h.template.wire_name(),
                total_sent: 5,
            })
            .await
            .unwrap();

        // ct-1 already went out in an earlier run of this campaign.
        reconciler
            .record_send_result(&OutboundRecord {
                company_id: COMPANY_ID.into(),
                campaign_id: campaign.id.clone(),
                contact_id: "ct-1".into(),
                body: outbound_body("festive_offer"),
                wa_message_id: Some("wamid.prev".into()),
                status: MessageStatus::Sent,
                error: None,
            })
            .await
            .unwrap();

        let fanout = Fanout {
            queue: h.queue.as_ref(),
            storage: h.storage.as_ref(),
            reconciler: &reconciler,
            settings: &settings,
        };
        let report = fanout
            .enqueue(&campaign, &h.company, &h.template, &selection.targets)
            .await
            .unwrap();

        assert_eq!(report.queued, 4);
        assert_eq!(report.skipped_existing, 1);
        assert!(report.enqueue_failures.is_empty());
        let ids: Vec<_> = h
            .queue
            .published()
            .await
            .into_iter()
            .map(|j| j.contact.id)
            .collect();
        assert_eq!(ids, ["ct-2", "ct-3", "ct-4", "ct-5"]);
    }

    #[tokio::test]
    async fn unrecordable_failure_does_not_stop_later_batches() {
        use crate::phone::CountryCodeNormalizer;
        use crate::selector::select_targets;
        use wacast_core::types::NewCampaign;
        use wacast_test_utils::TestHarness;
        use wacast_test_utils::harness::{COMPANY_ID, SEGMENT_ID};

        let h = TestHarness::builder()
            .with_contact("Asha", "9876500001")
            .with_contact("Ravi", "9876500002")
            .with_contact("Meera", "9876500003")
            .build()
            .await
            .unwrap();
        h.queue.refuse_phone("919876500002").await;
        let normalizer = Arc::new(CountryCodeNormalizer::default());
        let reconciler = Reconciler::new(h.storage.clone(), normalizer.clone());
        let settings = DispatchSettings {
            batch_size: 2,
            ..DispatchSettings::default()
        };
        let selection =
            select_targets(h.storage.as_ref(), normalizer.as_ref(), COMPANY_ID, SEGMENT_ID)
                .await
                .unwrap();
        let campaign = h
            .storage
            .create_campaign(&NewCampaign {
                name: "Offer".into(),
                company_id: COMPANY_ID.into(),
                segment_id: SEGMENT_ID.into(),
                template_name: h.template.wire_name(),
                total_sent: 3,
            })
            .await
            .unwrap();
        // Without its campaign row, writing the failure record hits a
        // foreign-key error in storage.
        assert!(h.storage.delete_campaign(&campaign.id).await.unwrap());

        let fanout = Fanout {
            queue: h.queue.as_ref(),
            storage: h.storage.as_ref(),
            reconciler: &reconciler,
            settings: &settings,
        };
        let report = fanout
            .enqueue(&campaign, &h.company, &h.template, &selection.targets)
            .await
            .unwrap();

        assert_eq!(report.queued, 2);
        assert_eq!(report.enqueue_failures.len(), 1);
        let failure = &report.enqueue_failures[0];
        assert_eq!(failure.phone, "919876500002");
        assert!(failure.error.contains("failure record not stored"));
        let phones: Vec<_> = h
            .queue
            .published()
            .await
            .into_iter()
            .map(|j| j.contact.phone)
            .collect();
        assert_eq!(phones, ["919876500001", "919876500003"]);
    }
}
