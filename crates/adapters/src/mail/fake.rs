// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake mail adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MailAdapter, MailError, OutgoingMail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeMailState {
    sent: Vec<OutgoingMail>,
    failing: HashSet<String>,
}

/// Mail adapter that records messages instead of delivering them
#[derive(Clone, Default)]
pub struct FakeMailer {
    inner: Arc<Mutex<FakeMailState>>,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every message addressed to `recipient`
    pub fn fail_for(&self, recipient: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing
            .insert(recipient.to_string());
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sent
            .clone()
    }

    /// Accepted messages that include `recipient`
    pub fn sent_to(&self, recipient: &str) -> Vec<OutgoingMail> {
        self.sent()
            .into_iter()
            .filter(|m| m.recipients.iter().any(|r| r == recipient))
            .collect()
    }
}

#[async_trait]
impl MailAdapter for FakeMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bad) = mail.recipients.iter().find(|r| state.failing.contains(*r)) {
            return Err(MailError::Transport(format!("rejected recipient {}", bad)));
        }
        state.sent.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
