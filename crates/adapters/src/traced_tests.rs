// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::directory::FakeDirectory;
use crate::mail::FakeMailer;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn mail(recipients: Vec<String>) -> OutgoingMail {
    OutgoingMail {
        subject: "Expiry report".to_string(),
        recipients,
        html: "<p>x</p>".to_string(),
        text: "x".to_string(),
    }
}

// =============================================================================
// Precondition validation tests
// =============================================================================

#[tokio::test]
async fn traced_mailer_rejects_empty_recipients() {
    let fake = FakeMailer::new();
    let traced = TracedMailer::new(fake.clone());

    let err = traced.send(&mail(Vec::new())).await.unwrap_err();
    assert!(
        err.to_string().contains("no recipients"),
        "Expected error about recipients, got: {}",
        err
    );
    assert!(fake.sent().is_empty());
}

#[tokio::test]
async fn traced_directory_passes_results_through() {
    let fake = FakeDirectory::new();
    fake.add_result(
        "(objectClass=user)",
        DirectoryEntry::new("CN=a,DC=x").with("mail", "a@x"),
    );
    let traced = TracedDirectory::new(fake.clone());

    let mut conn = traced.connect().await.unwrap();
    let found = conn
        .search("DC=x", SearchScope::Subtree, "(objectClass=user)", &["mail"])
        .await
        .unwrap();
    conn.unbind().await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(fake.unbinds(), 1);
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_connect_failure_logs_category() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDirectory::new();
        fake.fail_connect(DirectoryError::Connection("connection refused".into()));
        TracedDirectory::new(fake).connect().await.map(|_| ())
    });

    assert!(result.is_err());
    assert!(
        logs.contains("directory.connect"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("category=connection"),
        "Should log error category. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("connection refused"),
        "Should log error. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_search_logs_count_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDirectory::new();
        fake.add_result("(cn=*)", DirectoryEntry::new("CN=a,DC=x"));
        let mut conn = TracedDirectory::new(fake).connect().await.unwrap();
        conn.search("DC=x", SearchScope::Subtree, "(cn=*)", &[])
            .await
    });

    assert!(result.is_ok());
    assert!(logs.contains("directory.search"), "Logs:\n{}", logs);
    assert!(logs.contains("count=1"), "Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Logs:\n{}", logs);
}

#[test]
fn traced_modify_failure_is_warned() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDirectory::new();
        let mut conn = TracedDirectory::new(fake).connect().await.unwrap();
        conn.modify("CN=ghost,DC=x", vec![AttributeChange::add("info", "x")])
            .await
    });

    assert!(matches!(result, Err(DirectoryError::NoSuchObject(_))));
    assert!(logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("modify failed"), "Logs:\n{}", logs);
    assert!(logs.contains("category=no-such-object"), "Logs:\n{}", logs);
}

#[test]
fn traced_send_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedMailer::new(FakeMailer::new());
        traced
            .send(&mail(vec!["admin@example.com".to_string()]))
            .await
    });

    assert!(result.is_ok(), "send should succeed: {:?}", result);
    assert!(logs.contains("mail.send"), "Logs:\n{}", logs);
    assert!(logs.contains("sending"), "Logs:\n{}", logs);
    assert!(logs.contains("Expiry report"), "Logs:\n{}", logs);
    assert!(logs.contains("sent"), "Logs:\n{}", logs);
}

#[test]
fn traced_send_failure_logs_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeMailer::new();
        fake.fail_for("bad@example.com");
        TracedMailer::new(fake)
            .send(&mail(vec!["bad@example.com".to_string()]))
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("ERROR"), "Logs:\n{}", logs);
    assert!(logs.contains("send failed"), "Logs:\n{}", logs);
}
