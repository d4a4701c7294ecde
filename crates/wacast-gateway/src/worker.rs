// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue worker endpoint.
//!
//! QStash redelivers on any non-2xx answer, so terminal outcomes (accepted,
//! rejected, duplicate) answer 200 and only transient failures answer 5xx.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;
use wacast_core::types::{DispatchJob, SendResult};
use wacast_dispatch::DeliveryAttempt;

use crate::server::GatewayState;

fn failure(status: StatusCode, error: String) -> Response {
    let body = SendResult {
        ok: false,
        provider_message_id: None,
        error: Some(error),
    };
    (status, Json(body)).into_response()
}

/// POST {worker_path}
pub async fn send_message(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.upstash {
        let token = headers
            .get("upstash-signature")
            .and_then(|v| v.to_str().ok());
        let verified = match token {
            Some(token) => verifier.verify(token, &body),
            None => Err(wacast_core::WacastError::Unauthorized(
                "missing Upstash-Signature".into(),
            )),
        };
        if let Err(e) = verified {
            warn!(error = %e, "rejecting unsigned queue delivery");
            return failure(StatusCode::UNAUTHORIZED, e.to_string());
        }
    }

    let job: DispatchJob = match serde_json::from_slice(&body) {
        Ok(job) => job,
        Err(e) => {
            warn!(error = %e, "malformed dispatch job");
            return failure(StatusCode::BAD_REQUEST, format!("malformed job: {e}"));
        }
    };

    let retried = headers
        .get("upstash-retried")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);

    match state
        .worker
        .send_one(&job, DeliveryAttempt::retried(retried))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            let status = if e.is_transient() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            failure(status, e.to_string())
        }
    }
}
