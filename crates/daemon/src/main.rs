// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account expiry notifier daemon (expiryd)
//!
//! Holds the host lock and starts notification passes at the configured
//! times of day.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use expiry_daemon::{
    startup, Coordinator, ServiceSettings, DEFAULT_CONFIG_PATH, DEFAULT_SETTINGS_PATH,
};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(name = "expiryd", version, about = "Account expiry notifier daemon")]
struct Args {
    /// Service settings (directory, mail, daemon)
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Notifier configuration, re-read on every wake
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = ServiceSettings::load(&args.settings)
        .with_context(|| format!("loading {}", args.settings.display()))?;

    let _log_guard = setup_logging(settings.daemon.log_path.as_deref())?;
    info!(
        pid = std::process::id(),
        settings = %args.settings.display(),
        "starting expiryd"
    );

    let runner = match startup(&settings) {
        Ok(runner) => runner,
        Err(e) => {
            error!(error = %e, "failed to start daemon");
            return Err(e.into());
        }
    };

    let Some(coordinator) = Coordinator::acquire(
        &settings.daemon.lock_path,
        runner,
        args.config,
        settings.daemon.poll_interval,
    )?
    else {
        info!(
            lock = %settings.daemon.lock_path.display(),
            "another instance already owns the notifier lock"
        );
        return Ok(());
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
    };

    coordinator.run(shutdown).await;

    info!("Daemon stopped");
    Ok(())
}

/// File logging through a non-blocking appender when a path is set,
/// stderr otherwise. The guard must live until exit.
fn setup_logging(log_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = log_path else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", log_path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}
