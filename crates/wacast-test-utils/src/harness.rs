// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite database and seeds one company, one
//! segment, and one template. Contacts and blocklist entries are added
//! through the builder. The mock queue and channel are shared via `Arc` so
//! tests can wire them into the dispatch pipeline and inspect them later.

use std::sync::Arc;

use wacast_config::model::{StorageConfig, WacastConfig};
use wacast_core::types::{BlocklistEntry, Campaign, Company, Contact, Segment, Template};
use wacast_core::{StorageAdapter, WacastError};
use wacast_storage::SqliteStorage;

use crate::mock_channel::MockChannel;
use crate::mock_queue::MockQueue;

pub const COMPANY_ID: &str = "co-test";
pub const NUMBER_ID: &str = "1098765";
pub const SEGMENT_ID: &str = "seg-vip";
pub const TEMPLATE_ID: &str = "tpl-offer";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    contacts: Vec<(String, String, Vec<String>)>,
    blocked: Vec<String>,
    variable_name: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            contacts: Vec::new(),
            blocked: Vec::new(),
            variable_name: Some("name".to_string()),
        }
    }

    /// Add a contact in the VIP segment.
    pub fn with_contact(self, name: &str, phone: &str) -> Self {
        self.with_contact_in(name, phone, &[SEGMENT_ID])
    }

    /// Add a contact tagged with the given segments.
    pub fn with_contact_in(mut self, name: &str, phone: &str, segments: &[&str]) -> Self {
        self.contacts.push((
            name.to_string(),
            phone.to_string(),
            segments.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Block a phone (stored format) for the seeded company.
    pub fn with_blocked(mut self, phone: &str) -> Self {
        self.blocked.push(phone.to_string());
        self
    }

    /// Seed the template without a declared body variable.
    pub fn without_template_variable(mut self) -> Self {
        self.variable_name = None;
        self
    }

    pub async fn build(self) -> Result<TestHarness, WacastError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| WacastError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let storage = SqliteStorage::new(storage_config.clone());
        storage.initialize().await?;

        let company = Company {
            id: COMPANY_ID.to_string(),
            name: "Test Traders".to_string(),
            whatsapp_token: "EAAG-test-token".to_string(),
            number_id: NUMBER_ID.to_string(),
        };
        storage.create_company(&company).await?;
        storage
            .create_segment(&Segment {
                id: SEGMENT_ID.to_string(),
                company_id: COMPANY_ID.to_string(),
                name: "VIP".to_string(),
            })
            .await?;
        let template = Template {
            id: TEMPLATE_ID.to_string(),
            company_id: COMPANY_ID.to_string(),
            name: "Festive Offer".to_string(),
            template_name: "festive_offer".to_string(),
            code_name: None,
            variable_name: self.variable_name,
            language_code: "en_US".to_string(),
        };
        storage.create_template(&template).await?;

        let mut contacts = Vec::with_capacity(self.contacts.len());
        for (idx, (name, phone, segments)) in self.contacts.into_iter().enumerate() {
            let contact = Contact {
                id: format!("ct-{}", idx + 1),
                company_id: COMPANY_ID.to_string(),
                name,
                phone,
                email: None,
                city: None,
                notes: None,
                segments,
                created_at: String::new(),
            };
            storage.create_contact(&contact).await?;
            contacts.push(contact);
        }

        for (idx, phone) in self.blocked.into_iter().enumerate() {
            storage
                .add_blocklist_entry(&BlocklistEntry {
                    id: format!("bl-{}", idx + 1),
                    company_id: COMPANY_ID.to_string(),
                    phone,
                    reason: "Manual Block".to_string(),
                    created_at: String::new(),
                })
                .await?;
        }

        let config = WacastConfig {
            storage: storage_config,
            ..WacastConfig::default()
        };

        Ok(TestHarness {
            storage: Arc::new(storage),
            queue: Arc::new(MockQueue::new()),
            channel: Arc::new(MockChannel::new()),
            company,
            template,
            contacts,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A seeded storage backend plus mock queue and provider.
pub struct TestHarness {
    pub storage: Arc<dyn StorageAdapter>,
    pub queue: Arc<MockQueue>,
    pub channel: Arc<MockChannel>,
    pub company: Company,
    pub template: Template,
    /// Seeded contacts in insertion order (ids `ct-1`, `ct-2`, ...).
    pub contacts: Vec<Contact>,
    pub config: WacastConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Current state of a campaign, failing the test if it is missing.
    pub async fn campaign(&self, id: &str) -> Campaign {
        match self.storage.get_campaign(id).await {
            Ok(Some(campaign)) => campaign,
            other => panic!("campaign {id} not loadable: {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_seeds_catalog_and_contacts() {
        let harness = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_contact_in("Ravi", "9876500000", &[])
            .with_blocked("9876543210")
            .build()
            .await
            .unwrap();

        let vip = harness
            .storage
            .list_segment_contacts(COMPANY_ID, SEGMENT_ID)
            .await
            .unwrap();
        assert_eq!(vip.len(), 1);
        assert_eq!(vip[0].name, "Asha");

        let blocked = harness.storage.list_blocklist(Some(COMPANY_ID)).await.unwrap();
        assert_eq!(blocked.len(), 1);

        let template = harness.storage.get_template(TEMPLATE_ID).await.unwrap();
        assert_eq!(template.unwrap().declared_variable(), Some("name"));
        assert_eq!(harness.contacts.len(), 2);
    }
}
