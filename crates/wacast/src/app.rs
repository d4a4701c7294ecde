// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of adapters and the dispatch pipeline from configuration.

use std::sync::Arc;

use tracing::{info, warn};
use wacast_config::model::WacastConfig;
use wacast_core::{StorageAdapter, WacastError};
use wacast_dispatch::{CountryCodeNormalizer, DispatchSettings, Dispatcher};
use wacast_gateway::GatewayState;
use wacast_qstash::QStashPublisher;
use wacast_storage::SqliteStorage;
use wacast_whatsapp::CloudApiClient;

/// A fully wired service instance.
pub struct App {
    pub config: WacastConfig,
    pub storage: Arc<dyn StorageAdapter>,
    pub dispatcher: Arc<Dispatcher>,
}

/// The URL the queue delivers jobs to, when a public base URL is configured.
pub fn worker_destination(config: &WacastConfig) -> Option<String> {
    let base = config
        .server
        .public_base_url
        .as_deref()
        .map(|u| u.trim_end_matches('/'))
        .filter(|u| !u.is_empty())?;
    Some(format!("{base}{}", config.dispatch.worker_path))
}

impl App {
    /// Opens storage and builds the provider client, queue publisher, and
    /// dispatcher.
    ///
    /// Campaign dispatch is left disabled (with a warning) when the queue
    /// token or the public base URL is missing; the webhook and worker paths
    /// still work.
    pub async fn build(config: WacastConfig) -> Result<Self, WacastError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let channel = Arc::new(CloudApiClient::new(&config.whatsapp)?);
        let normalizer = Arc::new(CountryCodeNormalizer::from_config(&config.phone));
        let mut dispatcher = Dispatcher::new(
            storage.clone(),
            channel,
            normalizer,
            DispatchSettings::from_config(&config),
        );

        let has_token = config.queue.token.as_deref().is_some_and(|t| !t.is_empty());
        match (has_token, worker_destination(&config)) {
            (true, Some(destination)) => {
                info!(destination = %destination, "queue dispatch enabled");
                let publisher = QStashPublisher::new(&config.queue, destination)?;
                dispatcher = dispatcher.with_queue(Arc::new(publisher));
            }
            (true, None) => {
                warn!("server.public_base_url is not set, campaign dispatch disabled");
            }
            (false, _) => {
                warn!("queue.token is not set, campaign dispatch disabled");
            }
        }

        Ok(Self {
            config,
            storage,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn gateway_state(&self) -> GatewayState {
        GatewayState::new(&self.config, self.storage.clone(), self.dispatcher.clone())
    }

    /// Flushes and closes storage.
    pub async fn close(&self) -> Result<(), WacastError> {
        self.storage.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_joins_base_and_worker_path() {
        let mut config = WacastConfig::default();
        assert_eq!(worker_destination(&config), None);

        config.server.public_base_url = Some("https://wacast.example.com/".into());
        assert_eq!(
            worker_destination(&config).as_deref(),
            Some("https://wacast.example.com/api/send-message")
        );
    }
}
