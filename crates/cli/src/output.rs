// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use chrono::{DateTime, Utc};
use expiry_core::{days_until, format_date};
use expiry_engine::{AlertReport, UserRecord};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + fmt::Display>(
    items: &[T],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

/// One catalog user as listed by `expiry users`
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub username: String,
    pub email: String,
    pub expires: Option<String>,
    pub days_left: Option<i64>,
    pub admin: bool,
    pub disabled: bool,
    pub expired: bool,
    pub dn: Option<String>,
}

impl UserRow {
    pub fn new(user: &UserRecord, now: DateTime<Utc>) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            expires: user.expires_at.map(format_date),
            days_left: user.expires_at.map(|at| days_until(at, now)),
            admin: user.is_admin,
            disabled: user.is_disabled,
            expired: user.is_expired,
            dn: user.dn.clone(),
        }
    }

    fn flags(&self) -> String {
        let flags: Vec<&str> = [
            (self.admin, "admin"),
            (self.disabled, "disabled"),
            (self.expired, "expired"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        if flags.is_empty() {
            "-".to_string()
        } else {
            flags.join(",")
        }
    }
}

impl fmt::Display for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let email = if self.email.is_empty() { "-" } else { &self.email };
        let expires = match (&self.expires, self.days_left) {
            (Some(date), Some(days)) => format!("{} ({}d)", date, days),
            _ => "never".to_string(),
        };
        write!(
            f,
            "{:<20} {:<32} {:<20} {}",
            self.username,
            email,
            expires,
            self.flags()
        )
    }
}

pub fn user_header() -> String {
    format!("{:<20} {:<32} {:<20} FLAGS", "USERNAME", "EMAIL", "EXPIRES")
}

/// One-line outcome of an admin alert pass
pub fn alert_summary(report: &AlertReport, threshold: i64) -> String {
    if report.listed == 0 {
        return format!("No accounts expire within {} days", threshold);
    }
    if report.recipients == 0 {
        return format!(
            "Listed {} account(s); no admin email addresses, alert not sent",
            report.listed
        );
    }
    if report.sent {
        format!(
            "Listed {} account(s); alert sent to {} admin(s)",
            report.listed, report.recipients
        )
    } else {
        format!(
            "Listed {} account(s); alert to {} admin(s) not sent",
            report.listed, report.recipients
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
