// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot CLI commands: `start-campaign`, `report`, `settle`.

use std::io::IsTerminal;

use colored::Colorize;
use wacast_core::WacastError;
use wacast_core::types::{Campaign, CampaignStatus};
use wacast_dispatch::StartCampaign;

use crate::app::App;

/// Run `wacast start-campaign` and print what happened.
pub async fn run_start_campaign(app: &App, request: StartCampaign) -> Result<(), WacastError> {
    let report = app.dispatcher.start_campaign(&request).await?;

    println!("campaign {}", report.campaign_id);
    println!("  targets            {}", report.total_sent);
    println!("  queued             {}", report.queued);
    println!("  skipped (blocked)  {}", report.skipped_blocked);
    println!("  skipped (dupes)    {}", report.skipped_duplicate);
    println!("  skipped (existing) {}", report.skipped_existing);
    if !report.enqueue_failures.is_empty() {
        println!("  enqueue failures   {}", report.enqueue_failures.len());
        for failure in &report.enqueue_failures {
            println!("    {} ({}): {}", failure.contact_id, failure.phone, failure.error);
        }
    }
    Ok(())
}

/// Run `wacast settle <campaign-id>`.
pub async fn run_settle(app: &App, campaign_id: &str) -> Result<(), WacastError> {
    let campaign = app
        .storage
        .get_campaign(campaign_id)
        .await?
        .ok_or_else(|| WacastError::not_found("campaign", campaign_id))?;

    match app.dispatcher.reconciler().settle(campaign_id).await? {
        Some(status) => println!("campaign {campaign_id} settled as {status}"),
        None => println!(
            "campaign {campaign_id} unchanged ({}, {}/{} results in)",
            campaign.status,
            campaign.sent_count + campaign.failed_count,
            campaign.total_sent
        ),
    }
    Ok(())
}

fn paint_status(status: CampaignStatus, plain: bool) -> String {
    let text = status.to_string();
    if plain {
        return text;
    }
    match status {
        CampaignStatus::Sending => text.yellow().to_string(),
        CampaignStatus::Completed => text.green().to_string(),
        CampaignStatus::Failed => text.red().to_string(),
    }
}

/// Render campaigns as a fixed-width table.
pub fn render_report(campaigns: &[Campaign], plain: bool) -> String {
    let mut out = format!(
        "{:<36}  {:<24}  {:<9}  {:>6}  {:>6}  {:>9}  {:>6}  {:>6}\n",
        "ID", "NAME", "STATUS", "TOTAL", "SENT", "DELIVERED", "READ", "FAILED"
    );
    for c in campaigns {
        let name: String = c.name.chars().take(24).collect();
        // Pad before painting so escape codes do not break alignment.
        let status = format!("{:<9}", c.status.to_string());
        let status = status.replacen(&c.status.to_string(), &paint_status(c.status, plain), 1);
        out.push_str(&format!(
            "{:<36}  {:<24}  {}  {:>6}  {:>6}  {:>9}  {:>6}  {:>6}\n",
            c.id,
            name,
            status,
            c.total_sent,
            c.sent_count,
            c.delivered_count,
            c.read_count,
            c.failed_count
        ));
    }
    out
}

/// Run `wacast report`, newest campaign first.
pub async fn run_report(app: &App, json: bool) -> Result<(), WacastError> {
    let campaigns = app.storage.list_campaigns().await?;
    if json {
        let rendered = serde_json::to_string_pretty(&campaigns)
            .map_err(|e| WacastError::Internal(format!("failed to encode report: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }
    if campaigns.is_empty() {
        println!("no campaigns yet");
        return Ok(());
    }
    let plain = !std::io::stdout().is_terminal();
    print!("{}", render_report(&campaigns, plain));
    Ok(())
}
