// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Account expiry notification engine

pub mod catalog;
mod error;
mod runner;

pub use catalog::{build_catalog, Catalog, CatalogSettings, UserRecord};
pub use error::{CatalogError, PassError, UserDataError};
pub use runner::{AlertReport, PassReport, ResetReport, Runner, RunnerDeps};
