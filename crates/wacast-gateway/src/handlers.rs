// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin API and health handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use wacast_core::types::{BlocklistEntry, Campaign, CampaignStatus, HealthStatus, Message};
use wacast_core::{PluginAdapter, WacastError};
use wacast_dispatch::phone::blocklist_format;
use wacast_dispatch::{StartCampaign, StartReport};

use crate::error::{ApiError, ErrorResponse};
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

// --- Campaigns ---

/// POST /api/campaigns
pub async fn start_campaign(
    State(state): State<GatewayState>,
    Json(request): Json<StartCampaign>,
) -> ApiResult<(StatusCode, Json<StartReport>)> {
    let report = state.dispatcher.start_campaign(&request).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/campaigns
pub async fn list_campaigns(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Campaign>>> {
    Ok(Json(state.storage.list_campaigns().await?))
}

/// GET /api/campaigns/{id}
pub async fn get_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Campaign>> {
    let campaign = state
        .storage
        .get_campaign(&id)
        .await?
        .ok_or_else(|| WacastError::not_found("campaign", id))?;
    Ok(Json(campaign))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    /// The status this call moved the campaign to, if any.
    pub settled: Option<CampaignStatus>,
    pub campaign: Campaign,
}

/// POST /api/campaigns/{id}/settle
pub async fn settle_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SettleResponse>> {
    let settled = state.dispatcher.reconciler().settle(&id).await?;
    let campaign = state
        .storage
        .get_campaign(&id)
        .await?
        .ok_or_else(|| WacastError::not_found("campaign", id))?;
    Ok(Json(SettleResponse { settled, campaign }))
}

/// DELETE /api/campaigns/{id}
pub async fn delete_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.storage.delete_campaign(&id).await? {
        tracing::info!(campaign_id = %id, "campaign deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WacastError::not_found("campaign", id).into())
    }
}

// --- Inbox ---

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /api/inbox
pub async fn list_inbox(
    State(state): State<GatewayState>,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.storage.list_inbound(query.limit).await?))
}

/// POST /api/inbox/{id}/read
pub async fn mark_read(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.storage.mark_read(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WacastError::not_found("message", id).into())
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    pub updated: u64,
}

/// POST /api/inbox/read-all
pub async fn mark_all_read(State(state): State<GatewayState>) -> ApiResult<Json<MarkAllResponse>> {
    let updated = state.storage.mark_all_read().await?;
    Ok(Json(MarkAllResponse { updated }))
}

// --- Blocklist ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistQuery {
    #[serde(default)]
    pub company_id: Option<String>,
}

/// GET /api/blocklist
pub async fn list_blocklist(
    State(state): State<GatewayState>,
    Query(query): Query<BlocklistQuery>,
) -> ApiResult<Json<Vec<BlocklistEntry>>> {
    let entries = state
        .storage
        .list_blocklist(query.company_id.as_deref())
        .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub company_id: String,
    pub phone: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /api/blocklist
pub async fn add_blocklist(
    State(state): State<GatewayState>,
    Json(request): Json<BlockRequest>,
) -> Result<Response, ApiError> {
    state
        .storage
        .get_company(&request.company_id)
        .await?
        .ok_or_else(|| WacastError::not_found("company", request.company_id.clone()))?;

    let entry = BlocklistEntry {
        id: uuid::Uuid::new_v4().to_string(),
        company_id: request.company_id,
        phone: blocklist_format(&request.phone),
        reason: request
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Manual Block".to_string()),
        created_at: String::new(),
    };
    if !state.storage.add_blocklist_entry(&entry).await? {
        let body = ErrorResponse {
            error: format!("{} is already blocked", entry.phone),
            code: None,
        };
        return Ok((StatusCode::CONFLICT, Json(body)).into_response());
    }
    tracing::info!(company_id = %entry.company_id, "phone blocked");
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

/// DELETE /api/blocklist/{id}
pub async fn remove_blocklist(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.storage.remove_blocklist_entry(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WacastError::not_found("blocklist entry", id).into())
    }
}

// --- Test send ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSendRequest {
    pub company_id: String,
    pub template_id: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSendResponse {
    pub provider_message_id: String,
}

/// POST /api/test-send
pub async fn test_send(
    State(state): State<GatewayState>,
    Json(request): Json<TestSendRequest>,
) -> ApiResult<Json<TestSendResponse>> {
    let receipt = state
        .dispatcher
        .test_send(&request.company_id, &request.template_id, &request.phone)
        .await?;
    Ok(Json(TestSendResponse {
        provider_message_id: receipt.provider_message_id,
    }))
}
