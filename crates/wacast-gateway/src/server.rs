// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wacast_config::model::WacastConfig;
use wacast_core::{StorageAdapter, WacastError};
use wacast_dispatch::{Dispatcher, Worker};
use wacast_qstash::SignatureVerifier;

use crate::auth::{AuthConfig, auth_middleware};
use crate::{handlers, webhook, worker};

/// Secrets used to authenticate Meta webhook traffic.
#[derive(Clone, Default)]
pub struct WebhookSecrets {
    /// Token echoed back during the subscription handshake.
    pub verify_token: Option<String>,
    /// App secret for `X-Hub-Signature-256`. Unset skips the check.
    pub app_secret: Option<String>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub storage: Arc<dyn StorageAdapter>,
    pub dispatcher: Arc<Dispatcher>,
    pub worker: Worker,
    pub auth: AuthConfig,
    pub webhook: WebhookSecrets,
    /// Verifier for queue deliveries. Unset accepts unsigned jobs.
    pub upstash: Option<SignatureVerifier>,
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(
        config: &WacastConfig,
        storage: Arc<dyn StorageAdapter>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let upstash = config
            .queue
            .current_signing_key
            .clone()
            .filter(|k| !k.is_empty())
            .map(|current| SignatureVerifier::new(current, config.queue.next_signing_key.clone()));
        if upstash.is_none() {
            tracing::warn!(
                worker_path = %config.dispatch.worker_path,
                "queue.current_signing_key is not set, worker endpoint accepts unsigned jobs"
            );
        }
        Self {
            worker: dispatcher.worker(),
            storage,
            dispatcher,
            auth: AuthConfig {
                bearer_token: config.server.admin_token.clone(),
            },
            webhook: WebhookSecrets {
                verify_token: config.whatsapp.verify_token.clone(),
                app_secret: config.whatsapp.app_secret.clone(),
            },
            upstash,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Builds the full route table.
///
/// - `GET /health` (public)
/// - `GET|POST /api/webhook` (Meta, token and signature checked per request)
/// - `POST {worker_path}` (QStash, signature checked per request)
/// - `/api/campaigns`, `/api/inbox`, `/api/blocklist`, `/api/test-send` (bearer auth)
pub fn router(state: GatewayState, worker_path: &str) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/api/webhook",
            get(webhook::verify_subscription).post(webhook::receive),
        )
        .route(worker_path, post(worker::send_message))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/campaigns",
            get(handlers::list_campaigns).post(handlers::start_campaign),
        )
        .route(
            "/api/campaigns/{id}",
            get(handlers::get_campaign).delete(handlers::delete_campaign),
        )
        .route("/api/campaigns/{id}/settle", post(handlers::settle_campaign))
        .route("/api/inbox", get(handlers::list_inbox))
        .route("/api/inbox/read-all", post(handlers::mark_all_read))
        .route("/api/inbox/{id}/read", post(handlers::mark_read))
        .route(
            "/api/blocklist",
            get(handlers::list_blocklist).post(handlers::add_blocklist),
        )
        .route("/api/blocklist/{id}", delete(handlers::remove_blocklist))
        .route("/api/test-send", post(handlers::test_send))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `shutdown` is cancelled.
pub async fn start_server(
    config: &WacastConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), WacastError> {
    let app = router(state, &config.dispatch.worker_path);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WacastError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| WacastError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
