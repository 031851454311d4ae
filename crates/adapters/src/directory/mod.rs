// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory service adapters

mod ldap;

pub use ldap::{LdapConfig, LdapDirectory};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DirectoryCall, FakeDirectory};

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Which family a directory failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Socket, timeout or stream failures
    Connection,
    /// Non-success result codes, TLS or certificate failures
    Protocol,
    /// The target entry does not exist
    NoSuchObject,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Connection => write!(f, "connection"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::NoSuchObject => write!(f, "no-such-object"),
        }
    }
}

/// Errors from directory operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("directory connection failed: {0}")]
    Connection(String),
    #[error("directory operation failed: {0}")]
    Protocol(String),
    #[error("no such directory object: {0}")]
    NoSuchObject(String),
}

impl DirectoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DirectoryError::Connection(_) => ErrorCategory::Connection,
            DirectoryError::Protocol(_) => ErrorCategory::Protocol,
            DirectoryError::NoSuchObject(_) => ErrorCategory::NoSuchObject,
        }
    }
}

/// Search scope relative to the base DN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
}

/// One entry returned by a search.
///
/// Attribute names are matched case-insensitively and absence is never an
/// error: lookups return `None` or an empty slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    dn: Option<String>,
    attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        let dn = dn.into();
        Self {
            dn: (!dn.is_empty()).then_some(dn),
            attrs: HashMap::new(),
        }
    }

    /// Entry without a distinguished name
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builder-style single-valued attribute
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, vec![value.into()]);
        self
    }

    pub fn set(&mut self, name: &str, values: Vec<String>) {
        self.attrs.insert(name.to_ascii_lowercase(), values);
    }

    pub fn remove(&mut self, name: &str) {
        self.attrs.remove(&name.to_ascii_lowercase());
    }

    pub fn dn(&self) -> Option<&str> {
        self.dn.as_deref()
    }

    /// All values of an attribute
    pub fn values(&self, name: &str) -> &[String] {
        self.attrs
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value of an attribute, if present
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }
}

/// Kind of attribute modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Add,
    Replace,
}

/// A single attribute modification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub op: ChangeOp,
    pub attribute: String,
    pub values: Vec<String>,
}

impl AttributeChange {
    pub fn add(attribute: &str, value: impl Into<String>) -> Self {
        Self {
            op: ChangeOp::Add,
            attribute: attribute.to_string(),
            values: vec![value.into()],
        }
    }

    pub fn replace(attribute: &str, value: impl Into<String>) -> Self {
        Self {
            op: ChangeOp::Replace,
            attribute: attribute.to_string(),
            values: vec![value.into()],
        }
    }

    /// REPLACE with no values, which removes the attribute
    pub fn clear(attribute: &str) -> Self {
        Self {
            op: ChangeOp::Replace,
            attribute: attribute.to_string(),
            values: Vec::new(),
        }
    }
}

/// Factory for bound directory connections
#[async_trait]
pub trait DirectoryAdapter: Clone + Send + Sync + 'static {
    type Connection: DirectoryConnection;

    /// Open and bind a new connection
    async fn connect(&self) -> Result<Self::Connection, DirectoryError>;
}

/// A bound directory session
#[async_trait]
pub trait DirectoryConnection: Send {
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    async fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>)
        -> Result<(), DirectoryError>;

    /// Close the session
    async fn unbind(&mut self) -> Result<(), DirectoryError>;
}
