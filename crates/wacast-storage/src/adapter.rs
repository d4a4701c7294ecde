// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use wacast_config::model::StorageConfig;
use wacast_core::traits::{CounterField, OutboundRecord};
use wacast_core::types::{
    BlocklistEntry, Campaign, CampaignStatus, Company, Contact, Message, MessageStatus,
    NewCampaign, Segment, Template,
};
use wacast_core::{AdapterType, HealthStatus, PluginAdapter, StorageAdapter, WacastError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to
/// [`StorageAdapter::initialize`] and every query delegates to the typed
/// query modules.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
    closed: AtomicBool,
}

impl SqliteStorage {
    /// Create a new SqliteStorage. Nothing is opened until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn db(&self) -> Result<&Database, WacastError> {
        self.db.get().ok_or_else(|| WacastError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), WacastError> {
        self.db()?
            .connection()
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, WacastError> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(HealthStatus::Unhealthy("storage closed".into()));
        }
        self.db()?
            .connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WacastError> {
        if self.db.get().is_some() {
            self.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), WacastError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| WacastError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), WacastError> {
        self.checkpoint().await?;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    // --- Tenancy and catalog ---

    async fn create_company(&self, company: &Company) -> Result<(), WacastError> {
        queries::companies::create_company(self.db()?, company).await
    }

    async fn get_company(&self, id: &str) -> Result<Option<Company>, WacastError> {
        queries::companies::get_company(self.db()?, id).await
    }

    async fn find_company_by_number_id(
        &self,
        number_id: &str,
    ) -> Result<Option<Company>, WacastError> {
        queries::companies::find_company_by_number_id(self.db()?, number_id).await
    }

    async fn create_segment(&self, segment: &Segment) -> Result<(), WacastError> {
        queries::companies::create_segment(self.db()?, segment).await
    }

    async fn create_template(&self, template: &Template) -> Result<(), WacastError> {
        queries::companies::create_template(self.db()?, template).await
    }

    async fn get_template(&self, id: &str) -> Result<Option<Template>, WacastError> {
        queries::companies::get_template(self.db()?, id).await
    }

    // --- Contacts ---

    async fn create_contact(&self, contact: &Contact) -> Result<(), WacastError> {
        queries::contacts::create_contact(self.db()?, contact).await
    }

    async fn list_segment_contacts(
        &self,
        company_id: &str,
        segment_id: &str,
    ) -> Result<Vec<Contact>, WacastError> {
        queries::contacts::list_segment_contacts(self.db()?, company_id, segment_id).await
    }

    async fn find_contacts_by_phone_digits(
        &self,
        company_id: &str,
        digits: &[String],
    ) -> Result<Vec<Contact>, WacastError> {
        queries::contacts::find_contacts_by_phone_digits(self.db()?, company_id, digits).await
    }

    // --- Blocklist ---

    async fn add_blocklist_entry(&self, entry: &BlocklistEntry) -> Result<bool, WacastError> {
        queries::blocklist::add_entry(self.db()?, entry).await
    }

    async fn remove_blocklist_entry(&self, id: &str) -> Result<bool, WacastError> {
        queries::blocklist::remove_entry(self.db()?, id).await
    }

    async fn list_blocklist(
        &self,
        company_id: Option<&str>,
    ) -> Result<Vec<BlocklistEntry>, WacastError> {
        queries::blocklist::list_entries(self.db()?, company_id).await
    }

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, WacastError> {
        queries::campaigns::create_campaign(self.db()?, campaign).await
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, WacastError> {
        queries::campaigns::get_campaign(self.db()?, id).await
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, WacastError> {
        queries::campaigns::list_campaigns(self.db()?).await
    }

    async fn delete_campaign(&self, id: &str) -> Result<bool, WacastError> {
        queries::campaigns::delete_campaign(self.db()?, id).await
    }

    async fn settle_campaign(&self, id: &str) -> Result<Option<CampaignStatus>, WacastError> {
        queries::campaigns::settle_campaign(self.db()?, id).await
    }

    // --- Messages ---

    async fn contacts_with_active_messages(
        &self,
        campaign_id: &str,
    ) -> Result<HashSet<String>, WacastError> {
        queries::messages::contacts_with_active_messages(self.db()?, campaign_id).await
    }

    async fn find_outbound(
        &self,
        campaign_id: &str,
        contact_id: &str,
    ) -> Result<Option<Message>, WacastError> {
        queries::messages::find_outbound(self.db()?, campaign_id, contact_id).await
    }

    async fn get_message_by_wa_id(
        &self,
        wa_message_id: &str,
    ) -> Result<Option<Message>, WacastError> {
        queries::messages::get_by_wa_id(self.db()?, wa_message_id).await
    }

    async fn insert_outbound(&self, record: &OutboundRecord) -> Result<bool, WacastError> {
        queries::messages::insert_outbound(self.db()?, record).await
    }

    async fn transition_message(
        &self,
        wa_message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
        increments: &[CounterField],
    ) -> Result<bool, WacastError> {
        queries::messages::transition(self.db()?, wa_message_id, from, to, increments).await
    }

    async fn insert_inbound(&self, message: &Message) -> Result<bool, WacastError> {
        queries::messages::insert_inbound(self.db()?, message).await
    }

    async fn list_inbound(&self, limit: Option<i64>) -> Result<Vec<Message>, WacastError> {
        queries::messages::list_inbound(self.db()?, limit).await
    }

    async fn mark_read(&self, id: &str) -> Result<bool, WacastError> {
        queries::messages::mark_read(self.db()?, id).await
    }

    async fn mark_all_read(&self) -> Result<u64, WacastError> {
        queries::messages::mark_all_read(self.db()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_identifies_itself() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("t.db")));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_creates_database_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("init.db");
        let storage = SqliteStorage::new(make_config(&path));

        storage.initialize().await.unwrap();
        assert!(path.exists());
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_tracks_lifecycle() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("health.db")));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn queries_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("none.db")));
        let err = storage.list_campaigns().await.unwrap_err();
        assert!(err.is_transient());
    }
}
