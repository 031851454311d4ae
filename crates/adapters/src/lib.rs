// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the directory service and mail delivery

pub mod directory;
pub mod mail;
pub mod traced;

pub use directory::{
    AttributeChange, ChangeOp, DirectoryAdapter, DirectoryConnection, DirectoryEntry,
    DirectoryError, ErrorCategory, LdapConfig, LdapDirectory, SearchScope,
};
pub use mail::{MailAdapter, MailError, OutgoingMail, SmtpConfig, SmtpMailer, SmtpSecurity};
pub use traced::{TracedConnection, TracedDirectory, TracedMailer};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use directory::{DirectoryCall, FakeDirectory};
#[cfg(any(test, feature = "test-support"))]
pub use mail::FakeMailer;
