// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wacast serve` command implementation.

use wacast_config::model::WacastConfig;
use wacast_core::WacastError;

use crate::app::App;
use crate::shutdown;

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wacast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Runs the gateway until SIGINT/SIGTERM, then closes storage.
pub async fn run_serve(config: WacastConfig) -> Result<(), WacastError> {
    let app = App::build(config).await?;
    let cancel = shutdown::install_signal_handler();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wacast starting");
    let served = wacast_gateway::start_server(&app.config, app.gateway_state(), cancel).await;

    tracing::info!("shutting down");
    app.close().await?;
    served
}
