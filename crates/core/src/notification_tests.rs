// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::EmailContent;
use chrono::TimeZone;

fn recipient() -> Recipient<'static> {
    Recipient {
        username: "jdoe",
        email: "jdoe@example.com",
        first_name: "Jane",
        last_name: "Doe",
    }
}

fn template(subject: &str, body: &str) -> MessageTemplate {
    MessageTemplate {
        subject: subject.to_string(),
        email_content: EmailContent {
            header: "Hello {first_name} {last_name}".to_string(),
            body: body.to_string(),
            footer: "(c) {year}".to_string(),
        },
    }
}

#[test]
fn renders_all_parts() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let expires = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
    let ctx = user_context(recipient(), 13, expires, now);

    let texts = MessageTexts::render(
        &template("{username}: {days} days left", "Sent {date}, expires on {expiry_date}"),
        &ctx,
        &TemplateEngine::new(),
    )
    .unwrap();

    assert_eq!(texts.subject, "jdoe: 13 days left");
    assert_eq!(texts.header, "Hello Jane Doe");
    assert_eq!(texts.body, "Sent 2025-03-01, expires on 15.03.2025");
    assert_eq!(texts.footer, "(c) 2025");
}

#[test]
fn overdue_days_are_positive() {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let expires = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
    let ctx = user_context(recipient(), -6, expires, now);

    let texts = MessageTexts::render(
        &template("Expired {days_overdue} days ago", "{expired_days}"),
        &ctx,
        &TemplateEngine::new(),
    )
    .unwrap();

    assert_eq!(texts.subject, "Expired 6 days ago");
    assert_eq!(texts.body, "-6");
}

#[test]
fn unknown_placeholder_fails() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let ctx = user_context(recipient(), 5, now, now);

    let err = MessageTexts::render(
        &template("{dayz} days", ""),
        &ctx,
        &TemplateEngine::new(),
    )
    .unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedVariable(_)));
}

#[test]
fn empty_template_renders_empty_texts() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let ctx = user_context(recipient(), 5, now, now);

    let texts =
        MessageTexts::render(&MessageTemplate::default(), &ctx, &TemplateEngine::new()).unwrap();
    assert_eq!(texts, MessageTexts::default());
}
