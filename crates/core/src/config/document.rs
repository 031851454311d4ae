// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier configuration document
//!
//! Stage thresholds, message texts, report texts and trigger times. The file
//! is re-read on every coordinator wake so edits apply without a restart.
//! JSON is the native format; a `.toml` file with the same shape also works.

use crate::schedule::TriggerTime;
use crate::stage::{Stage, StageError, StageThresholds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or validating the notifier configuration
///
/// Malformed trigger times surface as parse errors of the document format.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Header, body and footer format strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailContent {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub footer: String,
}

/// Subject plus email content for one kind of message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub email_content: EmailContent,
}

/// Wall-clock times for the two automatic passes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotificationTime {
    pub automatic_message_all_users: TriggerTime,
    pub automatic_message_admins: TriggerTime,
}

/// Texts for the admin-only expiring-accounts alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAlertSettings {
    #[serde(default = "default_alert_subject")]
    pub email_subject: String,
    #[serde(default)]
    pub alert_message: String,
}

impl Default for AdminAlertSettings {
    fn default() -> Self {
        Self {
            email_subject: default_alert_subject(),
            alert_message: String::new(),
        }
    }
}

fn default_alert_subject() -> String {
    "Accounts expiring soon".to_string()
}

/// The notifier configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub notification_days: StageThresholds,
    /// Per-stage messages keyed by stage name; unknown keys are ignored
    #[serde(default)]
    pub messages: HashMap<String, MessageTemplate>,
    #[serde(default)]
    pub admin_auto_report: MessageTemplate,
    pub notification_time: NotificationTime,
    /// Days-left cutoff for the admin alert; defaults to the early threshold
    #[serde(default)]
    pub admin_notification_threshold: Option<i64>,
    #[serde(default)]
    pub admin_notification_settings: AdminAlertSettings,
}

impl NotifierConfig {
    /// Load and validate a configuration file, picking the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|e| e == "toml") {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.notification_days.validate()?;
        Ok(())
    }

    /// Message texts for a stage; missing sections render as empty strings.
    pub fn message_for(&self, stage: Stage) -> MessageTemplate {
        self.messages.get(stage.name()).cloned().unwrap_or_default()
    }

    pub fn admin_threshold(&self) -> i64 {
        self.admin_notification_threshold
            .unwrap_or(self.notification_days.early)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
