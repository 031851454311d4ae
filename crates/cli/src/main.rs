// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! expiry - account expiry notifier operator CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, markers, pass, users};
use expiry_daemon::{DEFAULT_CONFIG_PATH, DEFAULT_SETTINGS_PATH};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "expiry",
    version,
    about = "Account expiry notifier - run passes and inspect the directory"
)]
struct Cli {
    /// Service settings (directory, mail, daemon)
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Notifier configuration (thresholds, messages, trigger times)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one user notification pass now
    Run,
    /// Send the expiring-accounts alert to admins now
    Admins,
    /// Send one user the message for their current stage
    Send(pass::SendArgs),
    /// List users with their expiry
    Users(users::UsersArgs),
    /// Clear the notification marker on every user
    ResetMarkers,
    /// Validate the settings and configuration files
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let paths = commands::Paths {
        settings: cli.settings,
        config: cli.config,
    };

    match cli.command {
        Commands::Run => pass::run(&paths).await,
        Commands::Admins => pass::admins(&paths).await,
        Commands::Send(args) => pass::send(&paths, args).await,
        Commands::Users(args) => users::list(&paths, args).await,
        Commands::ResetMarkers => markers::reset(&paths).await,
        Commands::CheckConfig => check::check_config(&paths),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
