// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service settings
//!
//! Connection details for the directory and the mail relay plus daemon paths.
//! Read once at startup from TOML. Secrets can come from the environment
//! instead of the file.

use expiry_adapters::{LdapConfig, SmtpConfig, SmtpSecurity};
use expiry_engine::CatalogSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides `directory.bind_password`
pub const LDAP_PASSWORD_ENV: &str = "EXPIRY_LDAP_BIND_PASSWORD";
/// Overrides `mail.password`
pub const SMTP_PASSWORD_ENV: &str = "EXPIRY_SMTP_PASSWORD";

pub const DEFAULT_SETTINGS_PATH: &str = "/etc/expiry-notifier/settings.toml";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/expiry-notifier/config.json";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub url: String,
    #[serde(default)]
    pub bind_dn: String,
    #[serde(default)]
    pub bind_password: String,
    pub base_dn: String,
    #[serde(default)]
    pub admin_group_dn: Option<String>,
    #[serde(default)]
    pub users_container: Option<String>,
    #[serde(default = "default_marker_attribute")]
    pub marker_attribute: String,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default = "default_true")]
    pub tls_verify: bool,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_receive_timeout")]
    pub receive_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailSecurity {
    None,
    #[default]
    Starttls,
    Tls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub security: MailSecurity,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: String,
    #[serde(with = "humantime_serde", default = "default_receive_timeout")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonSettings {
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
    /// Log file; stderr when absent
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    /// Directory with email template overrides
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            lock_path: default_lock_path(),
            poll_interval: default_poll_interval(),
            log_path: None,
            template_dir: None,
        }
    }
}

/// The service settings file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub directory: DirectorySettings,
    pub mail: MailSettings,
    #[serde(default)]
    pub daemon: DaemonSettings,
}

fn default_marker_attribute() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_receive_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_smtp_port() -> u16 {
    587
}

fn default_lock_path() -> PathBuf {
    PathBuf::from("/tmp/expiry-notifier.lock")
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

impl ServiceSettings {
    /// Load settings from a file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::parse(&content)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply secret overrides from a variable lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(LDAP_PASSWORD_ENV) {
            self.directory.bind_password = password;
        }
        if let Some(password) = lookup(SMTP_PASSWORD_ENV) {
            self.mail.password = password;
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let url = &self.directory.url;
        if !(url.starts_with("ldap://") || url.starts_with("ldaps://")) {
            return Err(SettingsError::Invalid(format!(
                "directory.url must start with ldap:// or ldaps://, got {}",
                url
            )));
        }
        if self.directory.base_dn.trim().is_empty() {
            return Err(SettingsError::Invalid("directory.base_dn is empty".into()));
        }
        if self.daemon.poll_interval.is_zero() {
            return Err(SettingsError::Invalid("daemon.poll_interval must be positive".into()));
        }
        Ok(())
    }

    pub fn ldap_config(&self) -> LdapConfig {
        let d = &self.directory;
        LdapConfig {
            url: d.url.clone(),
            bind_dn: d.bind_dn.clone(),
            bind_password: d.bind_password.clone(),
            starttls: d.starttls,
            tls_verify: d.tls_verify,
            connect_timeout: d.connect_timeout,
            receive_timeout: d.receive_timeout,
        }
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        let d = &self.directory;
        let mut settings = CatalogSettings::new(d.base_dn.clone());
        if let Some(group) = &d.admin_group_dn {
            settings.admin_group_dn = group.clone();
        }
        if let Some(container) = &d.users_container {
            settings.users_container = container.clone();
        }
        settings.marker_attribute = d.marker_attribute.clone();
        settings
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        let m = &self.mail;
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SmtpConfig {
            host: m.host.clone(),
            port: m.port,
            security: match m.security {
                MailSecurity::None => SmtpSecurity::None,
                MailSecurity::Starttls => SmtpSecurity::StartTls,
                MailSecurity::Tls => SmtpSecurity::Tls,
            },
            username: non_empty(&m.username),
            password: non_empty(&m.password),
            from: m.from.clone(),
            timeout: m.timeout,
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
