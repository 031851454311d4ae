// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule coordinator
//!
//! Owns the host lock and the debounce state. Each wake re-reads the notifier
//! configuration and starts whichever pass is due. Failures inside a wake are
//! logged and the loop carries on.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use expiry_adapters::{DirectoryAdapter, MailAdapter};
use expiry_core::{Clock, Debouncer, NotifierConfig, TriggerKind, TriggerTime};
use expiry_engine::{AlertReport, PassError, PassReport, Runner};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::lifecycle::{LifecycleError, LockFile};

/// The two passes a trigger can start
#[async_trait]
pub trait Passes: Send + Sync {
    async fn user_pass(&self, config: &NotifierConfig) -> Result<PassReport, PassError>;
    async fn admin_pass(&self, config: &NotifierConfig) -> Result<AlertReport, PassError>;
}

#[async_trait]
impl<D, M, C> Passes for Runner<D, M, C>
where
    D: DirectoryAdapter,
    M: MailAdapter,
    C: Clock,
{
    async fn user_pass(&self, config: &NotifierConfig) -> Result<PassReport, PassError> {
        self.run_pass(config).await
    }

    async fn admin_pass(&self, config: &NotifierConfig) -> Result<AlertReport, PassError> {
        self.run_admin_alert(config).await
    }
}

pub struct Coordinator<P> {
    // NOTE(lifetime): Held to keep other instances out; released on drop
    #[allow(dead_code)]
    lock: LockFile,
    passes: P,
    config_path: PathBuf,
    poll_interval: Duration,
    debouncer: Debouncer,
}

impl<P: Passes> Coordinator<P> {
    /// Take the host lock and build a coordinator.
    ///
    /// `Ok(None)` means another instance owns the lock.
    pub fn acquire(
        lock_path: &Path,
        passes: P,
        config_path: PathBuf,
        poll_interval: Duration,
    ) -> Result<Option<Self>, LifecycleError> {
        let Some(lock) = LockFile::acquire(lock_path)? else {
            return Ok(None);
        };
        info!(lock = %lock_path.display(), "notifier lock acquired");
        Ok(Some(Self {
            lock,
            passes,
            config_path,
            poll_interval,
            debouncer: Debouncer::new(),
        }))
    }

    /// One wake at local minute `now`. Returns the passes that fired.
    pub async fn tick(&mut self, now: TriggerTime) -> Vec<TriggerKind> {
        let config = match NotifierConfig::load(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "failed to load notifier configuration"
                );
                return Vec::new();
            }
        };

        let triggers = [
            (
                TriggerKind::UserPass,
                config.notification_time.automatic_message_all_users,
            ),
            (
                TriggerKind::AdminPass,
                config.notification_time.automatic_message_admins,
            ),
        ];

        let mut fired = Vec::new();
        for (kind, trigger) in triggers {
            if !self.debouncer.should_fire(kind, now, trigger) {
                continue;
            }
            info!(%kind, %trigger, "trigger fired");
            fired.push(kind);
            match kind {
                TriggerKind::UserPass => match self.passes.user_pass(&config).await {
                    Ok(report) => info!(
                        processed = report.processed,
                        notified = report.notified,
                        skipped = report.skipped,
                        markers_reset = report.markers_reset,
                        delivery_failures = report.delivery_failures,
                        digest_sent = report.digest_sent,
                        "user pass complete"
                    ),
                    Err(e) => log_pass_error(kind, &e),
                },
                TriggerKind::AdminPass => match self.passes.admin_pass(&config).await {
                    Ok(report) => info!(
                        listed = report.listed,
                        recipients = report.recipients,
                        sent = report.sent,
                        "admin pass complete"
                    ),
                    Err(e) => log_pass_error(kind, &e),
                },
            }
        }
        fired
    }

    /// Wake every poll interval until `shutdown` resolves.
    ///
    /// The lock is released when the coordinator is dropped on return.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            config = %self.config_path.display(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "coordinator running"
        );
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("coordinator stopping");
                    break;
                }
                _ = interval.tick() => {
                    let now = TriggerTime::of(&chrono::Local::now());
                    self.tick(now).await;
                }
            }
        }
    }
}

fn log_pass_error(kind: TriggerKind, e: &PassError) {
    match e.category() {
        Some(category) => error!(%kind, %category, error = %e, "pass failed"),
        None => error!(%kind, error = %e, "pass failed"),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
