// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification runner
//!
//! One user pass: build the catalog, decide a stage per user against the
//! stored marker, persist the new marker, mail each user, then send the admin
//! digest. Also hosts the admin alert pass, the manual single send and the
//! marker reset.
//!
//! Every directory connection the runner opens is unbound exactly once on
//! every path out of the operation that opened it.

use crate::catalog::{build_catalog, Catalog, CatalogSettings, UserRecord};
use crate::error::{PassError, UserDataError};
use chrono::{DateTime, Utc};
use expiry_adapters::{
    AttributeChange, DirectoryAdapter, DirectoryConnection, DirectoryError, ErrorCategory,
    MailAdapter, OutgoingMail, SearchScope,
};
use expiry_core::{
    days_until, evaluate, format_date, user_context, AdminDigest, Clock, EmailRenderer,
    ExpiringAccount, ExpiryAlert, MessageTexts, NotificationEvent, NotificationMarker,
    NotifierConfig, Recipient, RenderedEmail, Stage, StageDecision, TemplateEngine,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Adapter dependencies
pub struct RunnerDeps<D, M> {
    pub directory: D,
    pub mail: M,
}

/// Outcome of a user pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Users considered
    pub processed: usize,
    /// Users with a queued notification
    pub notified: usize,
    pub per_stage: BTreeMap<Stage, usize>,
    /// Users skipped for missing or unreadable data
    pub skipped: usize,
    pub markers_reset: usize,
    /// User emails or the digest that could not be rendered or sent
    pub delivery_failures: usize,
    pub digest_sent: bool,
}

/// Outcome of an admin alert pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertReport {
    pub listed: usize,
    pub recipients: usize,
    pub sent: bool,
}

/// Outcome of a marker reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub cleared: usize,
    pub failed: usize,
}

/// Runs notification passes against a directory and a mailer
pub struct Runner<D, M, C> {
    directory: D,
    mail: M,
    clock: C,
    settings: CatalogSettings,
    renderer: EmailRenderer,
    templates: TemplateEngine,
}

impl<D, M, C> Runner<D, M, C>
where
    D: DirectoryAdapter,
    M: MailAdapter,
    C: Clock,
{
    pub fn new(
        deps: RunnerDeps<D, M>,
        clock: C,
        settings: CatalogSettings,
        renderer: EmailRenderer,
    ) -> Self {
        Self {
            directory: deps.directory,
            mail: deps.mail,
            clock,
            settings,
            renderer,
            templates: TemplateEngine::new(),
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Fresh catalog over its own connection
    pub async fn catalog(&self) -> Result<Catalog, PassError> {
        let now = self.clock.now();
        let mut conn = self.directory.connect().await?;
        let result = build_catalog(&mut conn, &self.settings, now).await;
        close(&mut conn).await;
        Ok(result?)
    }

    /// Run one user pass.
    pub async fn run_pass(&self, config: &NotifierConfig) -> Result<PassReport, PassError> {
        config.validate()?;
        let catalog = self.catalog().await?;
        let mut report = PassReport {
            processed: catalog.users.len(),
            ..PassReport::default()
        };

        if catalog.users.is_empty() {
            tracing::info!("no users to check");
            return Ok(report);
        }

        let mut conn = self.directory.connect().await?;
        let result = self
            .notify_users(&mut conn, &catalog, config, &mut report)
            .await;
        close(&mut conn).await;
        result?;

        tracing::info!(
            processed = report.processed,
            notified = report.notified,
            skipped = report.skipped,
            markers_reset = report.markers_reset,
            delivery_failures = report.delivery_failures,
            "pass complete"
        );
        Ok(report)
    }

    async fn notify_users<Conn: DirectoryConnection>(
        &self,
        conn: &mut Conn,
        catalog: &Catalog,
        config: &NotifierConfig,
        report: &mut PassReport,
    ) -> Result<(), PassError> {
        let now = self.clock.now();
        let mut events = Vec::new();

        for user in &catalog.users {
            match self.decide(conn, user, config, now).await {
                Ok(Outcome::Queued(event)) => {
                    *report.per_stage.entry(event.stage).or_insert(0) += 1;
                    events.push(*event);
                }
                Ok(Outcome::Reset) => report.markers_reset += 1,
                Ok(Outcome::Unchanged) => {}
                // A lost connection ends the pass before anything is mailed
                Err(UserDataError::MarkerRead(e)) if e.category() == ErrorCategory::Connection => {
                    tracing::error!(
                        username = %user.username,
                        error = %e,
                        "directory connection lost, aborting pass"
                    );
                    return Err(PassError::Directory(e));
                }
                Err(e) => {
                    tracing::warn!(username = %user.username, error = %e, "skipping user");
                    report.skipped += 1;
                }
            }
        }
        report.notified = events.len();

        for event in &events {
            let sent = match self.renderer.render_user(event) {
                Ok(email) => self.deliver(email, vec![event.email.clone()]).await,
                Err(e) => {
                    tracing::error!(username = %event.username, error = %e, "render failed");
                    false
                }
            };
            if !sent {
                report.delivery_failures += 1;
            }
        }

        let admins = catalog.admin_recipients();
        if admins.is_empty() {
            tracing::warn!("no admin recipients, digest not sent");
            return Ok(());
        }
        let digest = AdminDigest::from_events(&events);
        let rendered = digest
            .texts(&config.admin_auto_report, now, &self.templates)
            .and_then(|texts| self.renderer.render_digest(&digest, &texts));
        report.digest_sent = match rendered {
            Ok(email) => self.deliver(email, admins).await,
            Err(e) => {
                tracing::error!(error = %e, "digest render failed");
                false
            }
        };
        if !report.digest_sent {
            report.delivery_failures += 1;
        }
        Ok(())
    }

    /// Evaluate one user and persist the marker change.
    async fn decide<Conn: DirectoryConnection>(
        &self,
        conn: &mut Conn,
        user: &UserRecord,
        config: &NotifierConfig,
        now: DateTime<Utc>,
    ) -> Result<Outcome, UserDataError> {
        if !user.has_email() {
            return Err(UserDataError::MissingEmail);
        }
        let dn = user.dn.as_deref().ok_or(UserDataError::MissingDn)?;
        let expires_at = user.expires_at.ok_or(UserDataError::MissingExpiry)?;
        let days_left = days_until(expires_at, now);

        let raw = self
            .read_marker(conn, dn)
            .await
            .map_err(UserDataError::MarkerRead)?;
        let marker = NotificationMarker::decode(raw.as_deref().unwrap_or(""));

        match evaluate(days_left, &marker, &config.notification_days) {
            StageDecision::Nothing => Ok(Outcome::Unchanged),
            StageDecision::ResetMarker => {
                tracing::info!(username = %user.username, days_left, "expiry moved, clearing marker");
                let change = AttributeChange::clear(&self.settings.marker_attribute);
                if let Err(e) = conn.modify(dn, vec![change]).await {
                    tracing::error!(username = %user.username, error = %e, "marker reset failed");
                }
                Ok(Outcome::Reset)
            }
            StageDecision::Notify(stage) => {
                let context = user_context(
                    Recipient {
                        username: &user.username,
                        email: &user.email,
                        first_name: &user.first_name,
                        last_name: &user.last_name,
                    },
                    days_left,
                    expires_at,
                    now,
                );
                let texts =
                    MessageTexts::render(&config.message_for(stage), &context, &self.templates)?;

                let updated = marker.with_stage(stage).encode();
                let change = match raw {
                    Some(_) => AttributeChange::replace(&self.settings.marker_attribute, updated),
                    None => AttributeChange::add(&self.settings.marker_attribute, updated),
                };
                // The email still goes out if the marker cannot be stored
                if let Err(e) = conn.modify(dn, vec![change]).await {
                    tracing::error!(username = %user.username, %stage, error = %e, "marker write failed");
                }

                tracing::info!(username = %user.username, %stage, days_left, "queued notification");
                Ok(Outcome::Queued(Box::new(NotificationEvent {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    stage,
                    texts,
                    days_left,
                    expires_at,
                    sent_at: now,
                })))
            }
        }
    }

    /// Current marker text, `None` when the attribute is absent or empty
    async fn read_marker<Conn: DirectoryConnection>(
        &self,
        conn: &mut Conn,
        dn: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let attr = self.settings.marker_attribute.as_str();
        let entries = conn
            .search(dn, SearchScope::Base, "(objectClass=*)", &[attr])
            .await?;
        Ok(entries
            .first()
            .and_then(|e| e.first(attr))
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    async fn deliver(&self, email: RenderedEmail, recipients: Vec<String>) -> bool {
        let mail = OutgoingMail {
            subject: email.subject,
            recipients,
            html: email.html,
            text: email.text,
        };
        match self.mail.send(&mail).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(recipients = ?mail.recipients, error = %e, "delivery failed");
                false
            }
        }
    }

    /// Send the expiring-accounts alert to admins.
    ///
    /// No markers are read or written.
    pub async fn run_admin_alert(&self, config: &NotifierConfig) -> Result<AlertReport, PassError> {
        config.validate()?;
        let now = self.clock.now();
        let catalog = self.catalog().await?;
        let threshold = config.admin_threshold();

        let accounts: Vec<ExpiringAccount> = catalog
            .users
            .iter()
            .filter_map(|user| {
                let expires_at = user.expires_at?;
                let days_left = days_until(expires_at, now);
                (days_left <= threshold).then(|| ExpiringAccount {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    days_left,
                    expiry_date: format_date(expires_at),
                })
            })
            .collect();

        let mut report = AlertReport {
            listed: accounts.len(),
            ..AlertReport::default()
        };
        if accounts.is_empty() {
            tracing::info!(threshold, "no accounts within the alert threshold");
            return Ok(report);
        }

        let admins = catalog.admin_recipients();
        report.recipients = admins.len();
        if admins.is_empty() {
            tracing::error!("no admin email addresses found");
            return Ok(report);
        }

        let settings = &config.admin_notification_settings;
        let alert = ExpiryAlert::new(
            settings.email_subject.clone(),
            settings.alert_message.clone(),
            threshold,
            accounts,
        );
        let email = self.renderer.render_alert(&alert, now)?;
        report.sent = self.deliver(email, admins).await;
        tracing::info!(
            listed = report.listed,
            recipients = report.recipients,
            sent = report.sent,
            "admin alert complete"
        );
        Ok(report)
    }

    /// Send one user the message for their current stage, regardless of
    /// what was sent before. Markers are neither read nor written.
    pub async fn send_manual(
        &self,
        config: &NotifierConfig,
        username: &str,
    ) -> Result<NotificationEvent, PassError> {
        config.validate()?;
        let now = self.clock.now();
        let catalog = self.catalog().await?;
        let user = catalog
            .find(username)
            .ok_or_else(|| PassError::UnknownUser(username.to_string()))?;

        let user_error = |source: UserDataError| PassError::UserData {
            username: user.username.clone(),
            source,
        };
        if !user.has_email() {
            return Err(user_error(UserDataError::MissingEmail));
        }
        let expires_at = user
            .expires_at
            .ok_or_else(|| user_error(UserDataError::MissingExpiry))?;
        let days_left = days_until(expires_at, now);
        let stage = Stage::for_days(days_left, &config.notification_days);

        let context = user_context(
            Recipient {
                username: &user.username,
                email: &user.email,
                first_name: &user.first_name,
                last_name: &user.last_name,
            },
            days_left,
            expires_at,
            now,
        );
        let texts = MessageTexts::render(&config.message_for(stage), &context, &self.templates)
            .map_err(|e| user_error(e.into()))?;

        let event = NotificationEvent {
            username: user.username.clone(),
            email: user.email.clone(),
            stage,
            texts,
            days_left,
            expires_at,
            sent_at: now,
        };
        let email = self.renderer.render_user(&event)?;
        self.mail
            .send(&OutgoingMail {
                subject: email.subject,
                recipients: vec![event.email.clone()],
                html: email.html,
                text: email.text,
            })
            .await?;

        tracing::info!(username = %event.username, %stage, days_left, "manual notification sent");
        Ok(event)
    }

    /// Clear the marker on every user with a DN.
    pub async fn reset_markers(&self) -> Result<ResetReport, PassError> {
        let catalog = self.catalog().await?;
        let mut report = ResetReport::default();

        let mut conn = self.directory.connect().await?;
        for user in &catalog.users {
            let Some(dn) = user.dn.as_deref() else {
                continue;
            };
            let change = AttributeChange::clear(&self.settings.marker_attribute);
            match conn.modify(dn, vec![change]).await {
                Ok(()) => report.cleared += 1,
                Err(e) => {
                    tracing::warn!(username = %user.username, error = %e, "marker reset failed");
                    report.failed += 1;
                }
            }
        }
        close(&mut conn).await;

        tracing::info!(cleared = report.cleared, failed = report.failed, "markers reset");
        Ok(report)
    }
}

enum Outcome {
    Queued(Box<NotificationEvent>),
    Reset,
    Unchanged,
}

async fn close<Conn: DirectoryConnection>(conn: &mut Conn) {
    if let Err(e) = conn.unbind().await {
        tracing::warn!(error = %e, "unbind failed");
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
