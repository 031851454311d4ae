// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! expiry-core: pure building blocks for the account expiry notifier
//!
//! This crate provides:
//! - Expiry timestamp decoding (FILETIME ticks, ISO-8601, native instants)
//! - The notification marker set and the stage decision engine
//! - Notifier configuration, trigger times and their debounce state
//! - Message formatting, HTML email rendering and the admin digest

pub mod clock;
pub mod config;
pub mod digest;
pub mod email;
pub mod marker;
pub mod notification;
pub mod schedule;
pub mod stage;
pub mod template;
pub mod time;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    AdminAlertSettings, ConfigError, EmailContent, MessageTemplate, NotificationTime,
    NotifierConfig,
};
pub use digest::{AdminDigest, DigestRow, ExpiryAlert, ExpiringAccount};
pub use email::{html_to_text, EmailRenderer, RenderedEmail};
pub use marker::NotificationMarker;
pub use notification::{user_context, MessageTexts, NotificationEvent, Recipient};
pub use schedule::{Debouncer, TriggerKind, TriggerTime, TriggerTimeError};
pub use stage::{
    evaluate, next_stage, Stage, StageDecision, StageError, StageThresholds, StageWindow,
};
pub use template::{Context, ContextValue, TemplateEngine, TemplateError};
pub use time::{
    days_until, format_date, format_iso_date, format_timestamp, to_filetime, to_instant,
    RawExpiry, TimeError,
};
