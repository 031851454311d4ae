// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for notification passes

use expiry_adapters::{DirectoryError, ErrorCategory, MailError};
use expiry_core::{ConfigError, TemplateError, TimeError};
use thiserror::Error;

/// Problems with one user's directory data.
///
/// These never abort a pass; the user is logged and skipped.
#[derive(Debug, Error)]
pub enum UserDataError {
    #[error("no email address")]
    MissingEmail,
    #[error("no distinguished name")]
    MissingDn,
    #[error("no expiry date")]
    MissingExpiry,
    #[error("invalid accountExpires: {0}")]
    InvalidExpiry(#[from] TimeError),
    #[error("invalid userAccountControl: {0}")]
    InvalidAccountControl(String),
    #[error("marker read failed: {0}")]
    MarkerRead(#[source] DirectoryError),
    #[error("message template failed: {0}")]
    Template(#[from] TemplateError),
}

/// Failure loading the user catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} search failed: {source}")]
    Search {
        kind: &'static str,
        #[source]
        source: DirectoryError,
    },
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::Search { source, .. } => source.category(),
        }
    }
}

/// Errors that abort a whole pass
#[derive(Debug, Error)]
pub enum PassError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("cannot notify {username}: {source}")]
    UserData {
        username: String,
        #[source]
        source: UserDataError,
    },
    #[error("failed to render email: {0}")]
    Render(#[from] TemplateError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl PassError {
    /// Directory failure family, when the directory caused the error
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            PassError::Catalog(e) => Some(e.category()),
            PassError::Directory(e) => Some(e.category()),
            _ => None,
        }
    }
}
