// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: lock file and startup wiring.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use expiry_adapters::{LdapDirectory, MailError, SmtpMailer, TracedDirectory, TracedMailer};
use expiry_core::{EmailRenderer, SystemClock, TemplateError};
use expiry_engine::{Runner, RunnerDeps};
use fs2::FileExt;
use thiserror::Error;
use tracing::info;

use crate::settings::ServiceSettings;

/// Runner with concrete adapter types (wrapped with tracing)
pub type DaemonRunner =
    Runner<TracedDirectory<LdapDirectory>, TracedMailer<SmtpMailer>, SystemClock>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to open lock file {path}: {source}")]
    LockOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to acquire lock: {0}")]
    LockFailed(#[source] std::io::Error),

    #[error("invalid mail settings: {0}")]
    Mail(#[from] MailError),

    #[error("invalid email templates: {0}")]
    Templates(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive advisory lock, released on drop
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    file: File,
}

impl LockFile {
    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn acquire(path: &Path) -> Result<Option<Self>, LifecycleError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // No truncate: the holder's PID must survive a losing attempt
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LifecycleError::LockOpen {
                path: path.to_path_buf(),
                source,
            })?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Ok(None);
            }
            return Err(LifecycleError::LockFailed(e));
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        Ok(Some(Self {
            path: path.to_path_buf(),
            file,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build the runner from service settings.
pub fn startup(settings: &ServiceSettings) -> Result<DaemonRunner, LifecycleError> {
    let renderer = match &settings.daemon.template_dir {
        Some(dir) => EmailRenderer::new().with_overrides(dir)?,
        None => EmailRenderer::new(),
    };

    let directory = TracedDirectory::new(LdapDirectory::new(settings.ldap_config()));
    let mail = TracedMailer::new(SmtpMailer::new(&settings.smtp_config())?);

    info!(
        url = %settings.directory.url,
        base_dn = %settings.directory.base_dn,
        smtp_host = %settings.mail.host,
        "notifier runner ready"
    );

    Ok(Runner::new(
        RunnerDeps { directory, mail },
        SystemClock,
        settings.catalog_settings(),
        renderer,
    ))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
