// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wacast - WhatsApp campaign dispatch and delivery reconciliation.
//!
//! This is the binary entry point for the wacast service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wacast::App;
use wacast::commands;
use wacast::serve::{init_tracing, run_serve};
use wacast_config::model::WacastConfig;
use wacast_core::WacastError;
use wacast_dispatch::StartCampaign;

/// Wacast - WhatsApp campaign dispatch and delivery reconciliation.
#[derive(Parser, Debug)]
#[command(name = "wacast", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway (admin API, webhook, queue worker).
    Serve,
    /// Start a campaign for one template and segment.
    StartCampaign {
        #[arg(long)]
        company: String,
        #[arg(long)]
        segment: String,
        #[arg(long)]
        template: String,
        /// Campaign name; defaults to the template name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Show campaign counters, newest first.
    Report {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Finalize a campaign whose send results are all in.
    Settle { campaign_id: String },
    /// Validate configuration and exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> WacastConfig {
    let loaded = match path {
        Some(path) => wacast_config::load_and_validate_path(path),
        None => wacast_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            wacast_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Runs a command that needs storage, closing it afterwards.
async fn run_oneshot(config: WacastConfig, command: Commands) -> Result<(), WacastError> {
    let app = App::build(config).await?;
    let result = match command {
        Commands::StartCampaign {
            company,
            segment,
            template,
            name,
        } => {
            let request = StartCampaign {
                company_id: company,
                segment_id: segment,
                template_id: template,
                name,
            };
            commands::run_start_campaign(&app, request).await
        }
        Commands::Report { json } => commands::run_report(&app, json).await,
        Commands::Settle { campaign_id } => commands::run_settle(&app, &campaign_id).await,
        Commands::Serve | Commands::CheckConfig => Ok(()),
    };
    app.close().await?;
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.server.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => run_serve(config).await,
        Some(Commands::CheckConfig) => {
            eprintln!(
                "wacast: config ok (database={}, port={})",
                config.storage.database_path, config.server.port
            );
            Ok(())
        }
        Some(command) => run_oneshot(config, command).await,
        None => {
            println!("wacast: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("wacast: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc answers epoch/stats queries.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_start_campaign() {
        let cli = Cli::try_parse_from([
            "wacast",
            "--config",
            "/tmp/wacast.toml",
            "start-campaign",
            "--company",
            "co-1",
            "--segment",
            "seg-1",
            "--template",
            "tpl-1",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/wacast.toml")));
        match cli.command {
            Some(Commands::StartCampaign { company, name, .. }) => {
                assert_eq!(company, "co-1");
                assert_eq!(name, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = wacast_config::load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.server.log_level, "info");
    }
}
