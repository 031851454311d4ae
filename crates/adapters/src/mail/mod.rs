// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail delivery adapters

mod smtp;

pub use smtp::{SmtpConfig, SmtpMailer, SmtpSecurity};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMailer;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from mail delivery
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("invalid address {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// A message ready for delivery: one subject, an HTML body with a plain-text
/// alternative, and one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub recipients: Vec<String>,
    pub html: String,
    pub text: String,
}

/// Adapter for sending mail
#[async_trait]
pub trait MailAdapter: Clone + Send + Sync + 'static {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}
