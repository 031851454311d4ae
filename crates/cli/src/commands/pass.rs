// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `expiry run`, `expiry admins`, `expiry send`

use anyhow::Result;
use clap::Args;
use expiry_core::format_date;

use super::Paths;
use crate::output::alert_summary;

#[derive(Args)]
pub struct SendArgs {
    /// Login name of the user to notify
    pub username: String,
}

pub async fn run(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;
    let runner = paths.runner()?;
    let report = runner.run_pass(&config).await?;

    println!("Processed: {}", report.processed);
    println!("Notified:  {}", report.notified);
    for (stage, count) in &report.per_stage {
        println!("  {:<8} {}", stage.name(), count);
    }
    println!("Skipped:   {}", report.skipped);
    println!("Reset:     {}", report.markers_reset);
    if report.delivery_failures > 0 {
        println!("Failed deliveries: {}", report.delivery_failures);
    }
    println!(
        "Admin digest: {}",
        if report.digest_sent { "sent" } else { "not sent" }
    );
    Ok(())
}

pub async fn admins(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;
    let runner = paths.runner()?;
    let report = runner.run_admin_alert(&config).await?;

    println!("{}", alert_summary(&report, config.admin_threshold()));
    Ok(())
}

pub async fn send(paths: &Paths, args: SendArgs) -> Result<()> {
    let config = paths.load_config()?;
    let runner = paths.runner()?;
    let event = runner.send_manual(&config, &args.username).await?;

    println!(
        "Sent {} notification to {} <{}> ({} days left, expires {})",
        event.stage,
        event.username,
        event.email,
        event.days_left,
        format_date(event.expires_at)
    );
    Ok(())
}
