// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user notification decisions

use crate::config::MessageTemplate;
use crate::stage::Stage;
use crate::template::{Context, TemplateEngine, TemplateError};
use crate::time::{format_date, format_iso_date};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// Subject and body parts after placeholder substitution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageTexts {
    pub subject: String,
    pub header: String,
    pub body: String,
    pub footer: String,
}

impl MessageTexts {
    /// Render every part of a message template against one context.
    pub fn render(
        template: &MessageTemplate,
        context: &Context,
        engine: &TemplateEngine,
    ) -> Result<Self, TemplateError> {
        let content = &template.email_content;
        Ok(Self {
            subject: engine.render_simple(&template.subject, context)?,
            header: engine.render_simple(&content.header, context)?,
            body: engine.render_simple(&content.body, context)?,
            footer: engine.render_simple(&content.footer, context)?,
        })
    }
}

/// Who is being notified, as seen by the message placeholders
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Placeholder bindings for a user message.
///
/// `days` and `expired_days` both carry the signed days left; `days_overdue`
/// is its absolute value so expired-stage texts read naturally. `date` is
/// today's date, `expiry_date` the account's.
pub fn user_context(
    recipient: Recipient<'_>,
    days_left: i64,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Context {
    Context::new()
        .with("email", recipient.email)
        .with("username", recipient.username)
        .with("first_name", recipient.first_name)
        .with("last_name", recipient.last_name)
        .with("days", days_left)
        .with("expired_days", days_left)
        .with("days_overdue", days_left.abs())
        .with("year", i64::from(now.year()))
        .with("date", format_iso_date(now))
        .with("expiry_date", format_date(expires_at))
}

/// One decision to notify a user, produced during a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub username: String,
    pub email: String,
    pub stage: Stage,
    #[serde(flatten)]
    pub texts: MessageTexts,
    pub days_left: i64,
    pub expires_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
