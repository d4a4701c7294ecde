// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meta webhook endpoint: subscription handshake and event delivery.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use wacast_whatsapp::{WebhookPayload, parse_events, verify_signature};

use crate::server::GatewayState;

/// GET /api/webhook
pub async fn verify_subscription(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let challenge = wacast_whatsapp::verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        state.webhook.verify_token.as_deref(),
    );
    match challenge {
        Some(challenge) => (StatusCode::OK, challenge.to_string()).into_response(),
        None => {
            warn!("webhook verification failed");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST /api/webhook
///
/// Acknowledges every authentic delivery with 200, including ones whose
/// events could not be applied, so Meta does not replay them.
pub async fn receive(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = state.webhook.app_secret.as_deref().filter(|s| !s.is_empty()) {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(secret, &body, signature) {
            warn!("webhook signature mismatch");
            return StatusCode::FORBIDDEN;
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unparseable webhook payload");
            return StatusCode::OK;
        }
    };

    let events = parse_events(&payload);
    if events.is_empty() {
        debug!("webhook carried no events");
        return StatusCode::OK;
    }

    let reconciler = state.dispatcher.reconciler();
    for event in &events.statuses {
        match reconciler.apply_status(event).await {
            Ok(outcome) => {
                debug!(wa_message_id = %event.wa_message_id, ?outcome, "status handled")
            }
            Err(e) => {
                warn!(wa_message_id = %event.wa_message_id, error = %e, "status not applied")
            }
        }
    }
    for reply in &events.replies {
        match reconciler.handle_inbound(reply).await {
            Ok(outcome) => {
                debug!(wa_message_id = %reply.wa_message_id, ?outcome, "reply handled")
            }
            Err(e) => {
                warn!(wa_message_id = %reply.wa_message_id, error = %e, "reply not stored")
            }
        }
    }
    StatusCode::OK
}
