// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::EmailContent;
use chrono::TimeZone;

fn event(username: &str, email: &str, stage: Stage, days_left: i64) -> NotificationEvent {
    let sent_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 5).unwrap();
    NotificationEvent {
        username: username.to_string(),
        email: email.to_string(),
        stage,
        texts: MessageTexts::default(),
        days_left,
        expires_at: sent_at + chrono::Duration::days(days_left),
        sent_at,
    }
}

#[test]
fn aggregates_events() {
    let digest = AdminDigest::from_events(&[
        event("a", "a@example.com", Stage::Early, 25),
        event("b", "b@example.com", Stage::Urgent, 3),
        event("c", "a@example.com", Stage::Early, 28),
    ]);

    assert_eq!(digest.total, 3);
    assert_eq!(digest.unique_recipients, 2);
    assert_eq!(digest.count(Stage::Early), 2);
    assert_eq!(digest.count(Stage::Urgent), 1);
    assert_eq!(digest.count(Stage::Expired), 0);
}

#[test]
fn rows_are_numbered_and_formatted() {
    let digest = AdminDigest::from_events(&[
        event("a", "a@example.com", Stage::Early, 25),
        event("b", "b@example.com", Stage::Expired, -2),
    ]);

    assert_eq!(
        digest.rows[1],
        DigestRow {
            index: 2,
            username: "b".to_string(),
            email: "b@example.com".to_string(),
            days_left: -2,
            stage: Stage::Expired,
            expiry_date: "27.02.2025".to_string(),
            sent_at: "01.03.2025 09:00".to_string(),
        }
    );
    assert_eq!(digest.rows[0].index, 1);
}

#[test]
fn empty_pass_yields_empty_digest() {
    let digest = AdminDigest::from_events(&[]);
    assert!(digest.is_empty());
    assert_eq!(digest.unique_recipients, 0);
    assert!(digest.rows.is_empty());
}

#[test]
fn report_texts_use_date_and_total() {
    let digest = AdminDigest::from_events(&[event("a", "a@example.com", Stage::Early, 25)]);
    let template = MessageTemplate {
        subject: "Report {date}: {total_users} users".to_string(),
        email_content: EmailContent {
            header: "Notifications on {date}".to_string(),
            body: "{total_users} notified".to_string(),
            footer: String::new(),
        },
    };
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

    let texts = digest.texts(&template, now, &TemplateEngine::new()).unwrap();
    assert_eq!(texts.subject, "Report 2025-03-01: 1 users");
    assert_eq!(texts.header, "Notifications on 2025-03-01");
    assert_eq!(texts.body, "1 notified");
}

#[test]
fn alert_sorts_soonest_first() {
    let account = |name: &str, days: i64| ExpiringAccount {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        days_left: days,
        expiry_date: String::new(),
    };
    let alert = ExpiryAlert::new(
        "Expiring",
        "Review",
        14,
        vec![account("late", 12), account("gone", -3), account("soon", 2)],
    );

    let order: Vec<_> = alert.accounts.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(order, ["gone", "soon", "late"]);
    assert!(!alert.is_empty());
}
