// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Account expiry notifier service: settings, host lock and the schedule
//! coordinator. Shared by `expiryd` and the `expiry` operator CLI.

pub mod coordinator;
pub mod lifecycle;
pub mod settings;

pub use coordinator::{Coordinator, Passes};
pub use lifecycle::{startup, DaemonRunner, LifecycleError, LockFile};
pub use settings::{
    ServiceSettings, SettingsError, DEFAULT_CONFIG_PATH, DEFAULT_SETTINGS_PATH,
};
