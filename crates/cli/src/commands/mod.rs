// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod check;
pub mod markers;
pub mod pass;
pub mod users;

use anyhow::{Context, Result};
use expiry_core::NotifierConfig;
use expiry_daemon::{startup, DaemonRunner, ServiceSettings};
use std::path::PathBuf;

/// File locations shared by every command
pub struct Paths {
    pub settings: PathBuf,
    pub config: PathBuf,
}

impl Paths {
    pub fn load_settings(&self) -> Result<ServiceSettings> {
        ServiceSettings::load(&self.settings)
            .with_context(|| format!("loading settings {}", self.settings.display()))
    }

    pub fn load_config(&self) -> Result<NotifierConfig> {
        let config = NotifierConfig::load(&self.config)
            .with_context(|| format!("loading configuration {}", self.config.display()))?;
        config
            .validate()
            .with_context(|| format!("validating configuration {}", self.config.display()))?;
        Ok(config)
    }

    pub fn runner(&self) -> Result<DaemonRunner> {
        let settings = self.load_settings()?;
        Ok(startup(&settings)?)
    }
}
