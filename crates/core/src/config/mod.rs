// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod document;

pub use document::{
    AdminAlertSettings, ConfigError, EmailContent, MessageTemplate, NotificationTime,
    NotifierConfig,
};
