// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publishes one dispatch job per QStash message.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use wacast_config::model::QueueConfig;
use wacast_core::types::DispatchJob;
use wacast_core::{AdapterType, HealthStatus, PluginAdapter, QueueAdapter, WacastError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    message_id: String,
}

/// QStash publisher targeting a single worker URL.
#[derive(Debug, Clone)]
pub struct QStashPublisher {
    client: reqwest::Client,
    base_url: String,
    token: String,
    destination: String,
    retries: u32,
}

impl QStashPublisher {
    /// Build a publisher delivering to `destination` (the public worker URL).
    ///
    /// Fails with a config error when no QStash token is configured.
    pub fn new(config: &QueueConfig, destination: String) -> Result<Self, WacastError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WacastError::Config("queue.token is required to dispatch".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WacastError::Queue {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token,
            destination,
            retries: config.retries,
        })
    }

    /// Overrides the QStash base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    fn publish_url(&self) -> String {
        format!("{}/v2/publish/{}", self.base_url, self.destination)
    }
}

#[async_trait]
impl PluginAdapter for QStashPublisher {
    fn name(&self) -> &str {
        "qstash"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, WacastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WacastError> {
        Ok(())
    }
}

#[async_trait]
impl QueueAdapter for QStashPublisher {
    async fn publish(&self, job: &DispatchJob) -> Result<String, WacastError> {
        let response = self
            .client
            .post(self.publish_url())
            .bearer_auth(&self.token)
            .header("Upstash-Retries", self.retries.to_string())
            .json(job)
            .send()
            .await
            .map_err(|e| WacastError::Queue {
                message: format!("publish request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| WacastError::Queue {
            message: format!("failed to read publish response: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(WacastError::Queue {
                message: format!("QStash returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: PublishResponse =
            serde_json::from_str(&body).map_err(|e| WacastError::Queue {
                message: format!("failed to parse publish response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(
            message_id = %parsed.message_id,
            campaign_id = %job.campaign_id,
            contact_id = %job.contact.id,
            "job published"
        );
        Ok(parsed.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wacast_core::types::ContactSnapshot;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DESTINATION: &str = "https://wacast.example.com/api/send-message";

    fn publisher(base_url: &str) -> QStashPublisher {
        let config = QueueConfig {
            token: Some("qstash-token".into()),
            ..QueueConfig::default()
        };
        QStashPublisher::new(&config, DESTINATION.into())
            .unwrap()
            .with_base_url(base_url)
    }

    fn job() -> DispatchJob {
        DispatchJob {
            contact: ContactSnapshot {
                id: "ct-1".into(),
                name: "Asha".into(),
                phone: "919876543210".into(),
            },
            template_name: "diwali_offer".into(),
            company_token: "EAAG".into(),
            company_number_id: "1098765".into(),
            company_id: "co-1".into(),
            campaign_id: "cmp-1".into(),
            variable_name: Some("name".into()),
            variable_value: "Asha".into(),
            language_code: "en_US".into(),
            api_version: "v17.0".into(),
        }
    }

    #[tokio::test]
    async fn publish_sends_job_with_retry_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v2/publish/{DESTINATION}")))
            .and(header("authorization", "Bearer qstash-token"))
            .and(header("upstash-retries", "3"))
            .and(body_partial_json(serde_json::json!({
                "campaignId": "cmp-1",
                "contact": {"phone": "919876543210"}
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"messageId": "msg_1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = publisher(&server.uri()).publish(&job()).await.unwrap();
        assert_eq!(id, "msg_1");
    }

    #[tokio::test]
    async fn rejected_publish_is_queue_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = publisher(&server.uri()).publish(&job()).await.unwrap_err();
        assert!(matches!(err, WacastError::Queue { .. }), "got {err:?}");
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = QStashPublisher::new(&QueueConfig::default(), DESTINATION.into()).unwrap_err();
        assert!(matches!(err, WacastError::Config(_)));
    }
}
