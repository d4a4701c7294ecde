// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud API.
//!
//! Each call issues exactly one request. Redelivery is the dispatch queue's
//! job, so there is no retry loop here.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use wacast_config::model::WhatsAppConfig;
use wacast_core::types::{SendReceipt, TemplateSend};
use wacast_core::{AdapterType, ChannelAdapter, HealthStatus, PluginAdapter, WacastError};

use crate::types::{ApiErrorResponse, SendResponse, SendTemplateRequest};

/// Cloud API client shared by every company. Credentials travel with each
/// request because tokens and number ids are per company.
#[derive(Debug, Clone)]
pub struct CloudApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CloudApiClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, WacastError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WacastError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Overrides the Graph base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self, send: &TemplateSend) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, send.api_version, send.number_id
        )
    }

    /// Send one template message.
    ///
    /// Structured 4xx rejections become [`WacastError::ProviderRejected`] with
    /// the provider's message verbatim. Rate limits, 5xx, network failures,
    /// and unreadable bodies are transient [`WacastError::Channel`] errors.
    pub async fn send_template(&self, send: &TemplateSend) -> Result<SendReceipt, WacastError> {
        let request = SendTemplateRequest::from(send);
        let response = self
            .client
            .post(self.messages_url(send))
            .bearer_auth(&send.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WacastError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    WacastError::Channel {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| WacastError::Channel {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, to = %send.to, template = %send.template_name, "send response received");

        if status.is_success() {
            let parsed: SendResponse =
                serde_json::from_str(&body).map_err(|e| WacastError::Channel {
                    message: format!("failed to parse send response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            return parsed
                .messages
                .into_iter()
                .next()
                .map(|m| SendReceipt {
                    provider_message_id: m.id,
                })
                .ok_or_else(|| WacastError::Channel {
                    message: "send response carried no message id".into(),
                    source: None,
                });
        }

        if is_transient_status(status) {
            warn!(status = %status, body = %body, "transient provider error");
            return Err(WacastError::Channel {
                message: format!("provider returned {status}: {body}"),
                source: None,
            });
        }

        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => Err(WacastError::ProviderRejected {
                code: api_err.error.code,
                message: api_err.error.message,
            }),
            Err(_) => Err(WacastError::ProviderRejected {
                code: None,
                message: format!("provider returned {status}: {body}"),
            }),
        }
    }
}

/// Statuses worth a redelivery by the queue.
fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

#[async_trait]
impl PluginAdapter for CloudApiClient {
    fn name(&self) -> &str {
        "whatsapp-cloud"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, WacastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WacastError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for CloudApiClient {
    async fn send_template(&self, request: &TemplateSend) -> Result<SendReceipt, WacastError> {
        CloudApiClient::send_template(self, request).await
    }
}
