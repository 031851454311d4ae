// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTML email rendering
//!
//! Three page templates are built in: the user notification, the admin digest
//! and the admin alert. Any of them can be replaced by a same-named file in a
//! template directory. Every rendered email carries a plain-text alternative
//! derived from the HTML.

use crate::digest::{AdminDigest, ExpiryAlert};
use crate::notification::{MessageTexts, NotificationEvent};
use crate::template::TemplateError;
use crate::time::{format_date, format_timestamp};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use std::collections::BTreeMap;
use std::path::Path;

pub const USER_TEMPLATE: &str = "user_notification.html";
pub const DIGEST_TEMPLATE: &str = "admin_auto_report.html";
pub const ALERT_TEMPLATE: &str = "admin_alert.html";

const USER_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ subject }}</title></head>
<body style="font-family: Arial, sans-serif; color: #222;">
<h2>{{ header }}</h2>
<p>{{ body }}</p>
<p>Account: <strong>{{ username }}</strong></p>
<p>Expiry date: <strong>{{ expiry_date }}</strong></p>
<hr>
<p style="color: #777; font-size: 12px;">{{ footer }}</p>
</body>
</html>
"#;

const DIGEST_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ subject }}</title></head>
<body style="font-family: Arial, sans-serif; color: #222;">
<h2>{{ header }}</h2>
<p>{{ body }}</p>
{% if rows %}
<table border="1" cellpadding="4" cellspacing="0">
<thead>
<tr><th>#</th><th>Username</th><th>Email</th><th>Days Left</th><th>Stage</th><th>Expiry Date</th><th>Sent At</th></tr>
</thead>
<tbody>
{% for row in rows %}
<tr><td>{{ row.index }}</td><td>{{ row.username }}</td><td>{{ row.email }}</td><td>{{ row.days_left }}</td><td>{{ row.stage }}</td><td>{{ row.expiry_date }}</td><td>{{ row.sent_at }}</td></tr>
{% endfor %}
</tbody>
</table>
{% else %}
<p>No users were notified.</p>
{% endif %}
<hr>
<p style="color: #777; font-size: 12px;">{{ footer }}</p>
</body>
</html>
"#;

const ALERT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ subject }}</title></head>
<body style="font-family: Arial, sans-serif; color: #222;">
<h2>{{ subject }}</h2>
<p>{{ alert_message }}</p>
<p>{{ total_users }} account(s) expire within {{ threshold_days }} days or have already expired.</p>
<table border="1" cellpadding="4" cellspacing="0">
<thead>
<tr><th>Username</th><th>Email</th><th>Expiry Date</th><th>Days Remaining</th></tr>
</thead>
<tbody>
{% for account in accounts %}
<tr><td>{{ account.username }}</td><td>{{ account.email }}</td><td>{{ account.expiry_date }}</td><td>{{ account.days_left }}</td></tr>
{% endfor %}
</tbody>
</table>
<hr>
<p style="color: #777; font-size: 12px;">Generated {{ notification_date }}</p>
</body>
</html>
"#;

/// A fully rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders notification emails from HTML page templates.
#[derive(Debug, Clone)]
pub struct EmailRenderer {
    sources: BTreeMap<&'static str, String>,
}

impl Default for EmailRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailRenderer {
    /// Renderer with the built-in templates.
    pub fn new() -> Self {
        let sources = [
            (USER_TEMPLATE, USER_HTML),
            (DIGEST_TEMPLATE, DIGEST_HTML),
            (ALERT_TEMPLATE, ALERT_HTML),
        ]
        .into_iter()
        .map(|(name, source)| (name, source.to_string()))
        .collect();
        Self { sources }
    }

    /// Replace built-in templates with files found in `dir`.
    ///
    /// Missing files keep the built-in version. Overrides are syntax-checked
    /// here so a broken file is reported at startup.
    pub fn with_overrides(mut self, dir: &Path) -> Result<Self, TemplateError> {
        for (name, source) in self.sources.iter_mut() {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    Environment::new().template_from_named_str(name, &content)?;
                    tracing::info!(template = %path.display(), "using template override");
                    *source = content;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(TemplateError::Render(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Ok(self)
    }

    fn render_page(&self, name: &'static str, ctx: minijinja::Value) -> Result<String, TemplateError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| TemplateError::Render(format!("unknown template {}", name)))?;
        let env = Environment::new();
        let tmpl = env.template_from_named_str(name, source)?;
        Ok(tmpl.render(ctx)?)
    }

    pub fn render_user(&self, event: &NotificationEvent) -> Result<RenderedEmail, TemplateError> {
        let texts = &event.texts;
        let html = self.render_page(
            USER_TEMPLATE,
            context! {
                subject => &texts.subject,
                header => &texts.header,
                body => &texts.body,
                footer => &texts.footer,
                username => &event.username,
                email => &event.email,
                stage => event.stage.name(),
                days_left => event.days_left,
                expiry_date => format_date(event.expires_at),
            },
        )?;
        Ok(finish(texts.subject.clone(), html))
    }

    pub fn render_digest(
        &self,
        digest: &AdminDigest,
        texts: &MessageTexts,
    ) -> Result<RenderedEmail, TemplateError> {
        let html = self.render_page(
            DIGEST_TEMPLATE,
            context! {
                subject => &texts.subject,
                header => &texts.header,
                body => &texts.body,
                footer => &texts.footer,
                total_users => digest.total,
                unique_recipients => digest.unique_recipients,
                per_stage => minijinja::Value::from_serialize(&digest.per_stage),
                rows => minijinja::Value::from_serialize(&digest.rows),
            },
        )?;
        Ok(finish(texts.subject.clone(), html))
    }

    pub fn render_alert(
        &self,
        alert: &ExpiryAlert,
        now: DateTime<Utc>,
    ) -> Result<RenderedEmail, TemplateError> {
        let html = self.render_page(
            ALERT_TEMPLATE,
            context! {
                subject => &alert.subject,
                alert_message => &alert.message,
                threshold_days => alert.threshold,
                total_users => alert.accounts.len(),
                notification_date => format_timestamp(now),
                accounts => minijinja::Value::from_serialize(&alert.accounts),
            },
        )?;
        Ok(finish(alert.subject.clone(), html))
    }
}

fn finish(subject: String, html: String) -> RenderedEmail {
    let text = html_to_text(&html);
    RenderedEmail {
        subject,
        html,
        text,
    }
}

/// Plain-text rendition of an HTML document.
///
/// Drops `<head>`, `<style>` and `<script>` content and all tags, decodes the
/// common entities, trims each line and collapses runs of blank lines.
pub fn html_to_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        stripped.push_str(&rest[..start]);
        let tag_src = &rest[start..];
        let Some(end) = tag_src.find('>') else {
            rest = "";
            break;
        };
        let tag = tag_src[1..end].trim().to_ascii_lowercase();
        rest = &tag_src[end + 1..];

        if let Some(skip) = ["head", "style", "script"]
            .iter()
            .find(|name| tag == **name || tag.starts_with(&format!("{} ", name)))
        {
            let close = format!("</{}>", skip);
            match rest.to_ascii_lowercase().find(&close) {
                Some(pos) => rest = &rest[pos + close.len()..],
                None => rest = "",
            }
            continue;
        }

        // Keep table cells apart
        if tag == "/td" || tag == "/th" {
            stripped.push(' ');
        }
    }
    stripped.push_str(rest);

    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#x2f;", "/")
        .replace("&amp;", "&");

    let mut out = Vec::new();
    let mut blank = true;
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() {
            if !blank {
                out.push("");
            }
            blank = true;
        } else {
            out.push(line);
            blank = false;
        }
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
