// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrator reports
//!
//! [`AdminDigest`] summarizes what a user pass sent. [`ExpiryAlert`] lists
//! accounts close to (or past) expiry for the admin-only trigger.

use crate::config::MessageTemplate;
use crate::notification::{MessageTexts, NotificationEvent};
use crate::stage::Stage;
use crate::template::{Context, TemplateEngine, TemplateError};
use crate::time::{format_date, format_iso_date, format_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One line of the digest table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestRow {
    pub index: usize,
    pub username: String,
    pub email: String,
    pub days_left: i64,
    pub stage: Stage,
    pub expiry_date: String,
    pub sent_at: String,
}

/// Aggregate of the notifications sent in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminDigest {
    pub total: usize,
    pub unique_recipients: usize,
    pub per_stage: BTreeMap<Stage, usize>,
    pub rows: Vec<DigestRow>,
}

impl AdminDigest {
    pub fn from_events(events: &[NotificationEvent]) -> Self {
        let mut per_stage = BTreeMap::new();
        let mut recipients = BTreeSet::new();
        let rows = events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                *per_stage.entry(event.stage).or_insert(0) += 1;
                recipients.insert(event.email.as_str());
                DigestRow {
                    index: i + 1,
                    username: event.username.clone(),
                    email: event.email.clone(),
                    days_left: event.days_left,
                    stage: event.stage,
                    expiry_date: format_date(event.expires_at),
                    sent_at: format_timestamp(event.sent_at),
                }
            })
            .collect();

        Self {
            total: events.len(),
            unique_recipients: recipients.len(),
            per_stage,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.per_stage.get(&stage).copied().unwrap_or(0)
    }

    /// Render the report texts with `{date}` and `{total_users}`.
    pub fn texts(
        &self,
        template: &MessageTemplate,
        now: DateTime<Utc>,
        engine: &TemplateEngine,
    ) -> Result<MessageTexts, TemplateError> {
        let context = Context::new()
            .with("date", format_iso_date(now))
            .with("total_users", self.total);
        MessageTexts::render(template, &context, engine)
    }
}

/// An account listed in the admin alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringAccount {
    pub username: String,
    pub email: String,
    pub days_left: i64,
    pub expiry_date: String,
}

/// Accounts at or below the admin alert threshold, soonest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryAlert {
    pub subject: String,
    pub message: String,
    pub threshold: i64,
    pub accounts: Vec<ExpiringAccount>,
}

impl ExpiryAlert {
    pub fn new(
        subject: impl Into<String>,
        message: impl Into<String>,
        threshold: i64,
        mut accounts: Vec<ExpiringAccount>,
    ) -> Self {
        accounts.sort_by(|a, b| {
            a.days_left
                .cmp(&b.days_left)
                .then_with(|| a.username.cmp(&b.username))
        });
        Self {
            subject: subject.into(),
            message: message.into(),
            threshold,
            accounts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;
