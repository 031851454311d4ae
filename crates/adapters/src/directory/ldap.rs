// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LDAP directory adapter

use super::{
    AttributeChange, ChangeOp, DirectoryAdapter, DirectoryConnection, DirectoryEntry,
    DirectoryError, SearchScope,
};
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Mod, Scope, SearchEntry};
use std::collections::HashSet;
use std::time::Duration;

const RC_NO_SUCH_OBJECT: u32 = 32;
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Connection parameters for [`LdapDirectory`]
#[derive(Debug, Clone)]
pub struct LdapConfig {
    /// `ldap://` or `ldaps://` URL
    pub url: String,
    pub bind_dn: String,
    pub bind_password: String,
    pub starttls: bool,
    pub tls_verify: bool,
    pub connect_timeout: Duration,
    /// Applied to every request on the connection
    pub receive_timeout: Duration,
}

/// Directory adapter backed by `ldap3`
#[derive(Clone)]
pub struct LdapDirectory {
    config: LdapConfig,
}

impl LdapDirectory {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }
}

/// Socket-level failures are connection problems; everything else the
/// server or TLS layer reports is a protocol problem.
fn classify(err: LdapError) -> DirectoryError {
    match err {
        LdapError::Io { .. } | LdapError::Timeout { .. } | LdapError::EndOfStream => {
            DirectoryError::Connection(err.to_string())
        }
        LdapError::LdapResult { result } if result.rc == RC_NO_SUCH_OBJECT => {
            DirectoryError::NoSuchObject(result.text)
        }
        other => DirectoryError::Protocol(other.to_string()),
    }
}

fn scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

fn to_mod(change: AttributeChange) -> Mod<String> {
    let values: HashSet<String> = change.values.into_iter().collect();
    match change.op {
        ChangeOp::Add => Mod::Add(change.attribute, values),
        ChangeOp::Replace => Mod::Replace(change.attribute, values),
    }
}

#[async_trait]
impl DirectoryAdapter for LdapDirectory {
    type Connection = LdapConnection;

    async fn connect(&self) -> Result<LdapConnection, DirectoryError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.connect_timeout)
            .set_starttls(self.config.starttls)
            .set_no_tls_verify(!self.config.tls_verify);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url)
            .await
            .map_err(classify)?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "ldap connection driver error");
            }
        });

        let result = ldap
            .with_timeout(self.config.receive_timeout)
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(classify)?;

        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(DirectoryError::Protocol(format!(
                "invalid credentials for {}",
                self.config.bind_dn
            )));
        }
        result.success().map_err(classify)?;

        Ok(LdapConnection {
            ldap,
            receive_timeout: self.config.receive_timeout,
        })
    }
}

/// A bound `ldap3` session
pub struct LdapConnection {
    ldap: Ldap,
    receive_timeout: Duration,
}

#[async_trait]
impl DirectoryConnection for LdapConnection {
    async fn search(
        &mut self,
        base: &str,
        search_scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let (entries, _) = self
            .ldap
            .with_timeout(self.receive_timeout)
            .search(base, scope(search_scope), filter, attributes.to_vec())
            .await
            .map_err(classify)?
            .success()
            .map_err(classify)?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|raw| {
                let mut entry = DirectoryEntry::new(raw.dn);
                for (name, values) in raw.attrs {
                    entry.set(&name, values);
                }
                entry
            })
            .collect())
    }

    async fn modify(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<(), DirectoryError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mods: Vec<Mod<String>> = changes.into_iter().map(to_mod).collect();
        let result = self
            .ldap
            .with_timeout(self.receive_timeout)
            .modify(dn, mods)
            .await
            .map_err(classify)?;

        if result.rc == RC_NO_SUCH_OBJECT {
            return Err(DirectoryError::NoSuchObject(dn.to_string()));
        }
        result.success().map_err(classify)?;
        Ok(())
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.ldap.unbind().await.map_err(classify)
    }
}
