// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User catalog
//!
//! Turns raw directory entries into typed [`UserRecord`]s. The catalog is
//! rebuilt from the directory on every pass and never cached.

use crate::error::{CatalogError, UserDataError};
use chrono::{DateTime, Utc};
use expiry_adapters::{DirectoryConnection, DirectoryEntry, SearchScope};
use expiry_core::{to_instant, RawExpiry};
use serde::Serialize;

/// Attributes requested for every user entry
pub const USER_ATTRIBUTES: [&str; 9] = [
    "cn",
    "mail",
    "accountExpires",
    "userAccountControl",
    "displayName",
    "sAMAccountName",
    "givenName",
    "sn",
    "memberOf",
];

/// `userAccountControl` bit for disabled accounts
const UAC_ACCOUNT_DISABLE: u32 = 0x0002;

/// Where users live and how they are marked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub base_dn: String,
    pub admin_group_dn: String,
    /// Container used to compute a DN for entries that lack one
    pub users_container: String,
    /// Free-text attribute holding the notification marker
    pub marker_attribute: String,
}

impl CatalogSettings {
    /// Settings with the conventional Active Directory defaults under `base_dn`
    pub fn new(base_dn: impl Into<String>) -> Self {
        let base_dn = base_dn.into();
        Self {
            admin_group_dn: format!("CN=Domain Admins,CN=Users,{}", base_dn),
            users_container: format!("CN=Users,{}", base_dn),
            marker_attribute: "info".to_string(),
            base_dn,
        }
    }

    /// Enabled users outside the admin group
    pub fn user_filter(&self) -> String {
        format!(
            "(&(objectClass=user)(!(userAccountControl:1.2.840.113556.1.4.803:=2))(!(memberOf={})))",
            self.admin_group_dn
        )
    }

    /// Members of the admin group
    pub fn admin_filter(&self) -> String {
        format!(
            "(&(objectCategory=person)(objectClass=user)(memberOf={}))",
            self.admin_group_dn
        )
    }
}

/// A directory user, normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_disabled: bool,
    pub is_expired: bool,
    /// `None` means the account never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub dn: Option<String>,
}

impl UserRecord {
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}

/// Users and admins as of one moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub users: Vec<UserRecord>,
    pub admins: Vec<UserRecord>,
}

impl Catalog {
    /// Look up a user by login name (case-insensitive), admins included
    pub fn find(&self, username: &str) -> Option<&UserRecord> {
        self.users
            .iter()
            .chain(self.admins.iter())
            .find(|u| u.username.eq_ignore_ascii_case(username))
    }

    /// Admin email addresses, deduplicated, in directory order
    pub fn admin_recipients(&self) -> Vec<String> {
        let mut recipients: Vec<String> = Vec::new();
        for admin in self.admins.iter().filter(|a| a.has_email()) {
            if !recipients.iter().any(|r| r.eq_ignore_ascii_case(&admin.email)) {
                recipients.push(admin.email.clone());
            }
        }
        recipients
    }
}

/// Query users and admins and normalize them.
///
/// Malformed entries are logged and skipped; only search failures are errors.
pub async fn build_catalog<C: DirectoryConnection>(
    conn: &mut C,
    settings: &CatalogSettings,
    now: DateTime<Utc>,
) -> Result<Catalog, CatalogError> {
    let users = search(conn, settings, "user", &settings.user_filter(), false, now).await?;
    let admins = search(conn, settings, "admin", &settings.admin_filter(), true, now).await?;

    tracing::info!(users = users.len(), admins = admins.len(), "catalog built");
    Ok(Catalog { users, admins })
}

async fn search<C: DirectoryConnection>(
    conn: &mut C,
    settings: &CatalogSettings,
    kind: &'static str,
    filter: &str,
    is_admin: bool,
    now: DateTime<Utc>,
) -> Result<Vec<UserRecord>, CatalogError> {
    let entries = conn
        .search(&settings.base_dn, SearchScope::Subtree, filter, &USER_ATTRIBUTES)
        .await
        .map_err(|source| CatalogError::Search { kind, source })?;

    Ok(entries
        .iter()
        .filter_map(|entry| match parse_entry(entry, is_admin, settings, now) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(
                    dn = entry.dn().unwrap_or("<none>"),
                    username = entry.first("sAMAccountName").unwrap_or(""),
                    error = %e,
                    "skipping malformed entry"
                );
                None
            }
        })
        .collect())
}

/// Normalize one entry.
pub fn parse_entry(
    entry: &DirectoryEntry,
    is_admin: bool,
    settings: &CatalogSettings,
    now: DateTime<Utc>,
) -> Result<UserRecord, UserDataError> {
    let text = |name: &str| entry.first(name).unwrap_or("").trim().to_string();

    let expires_at = match entry.first("accountExpires") {
        Some(raw) => to_instant(&RawExpiry::from(raw))?,
        None => None,
    };

    let uac = match entry.first("userAccountControl") {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| UserDataError::InvalidAccountControl(raw.to_string()))?,
        None => 0,
    };

    let first_name = text("givenName");
    let last_name = text("sn");
    let display_name = match text("displayName") {
        name if name.is_empty() => text("cn"),
        name => name,
    };

    let dn = entry.dn().map(str::to_string).or_else(|| {
        (!first_name.is_empty() && !last_name.is_empty()).then(|| {
            format!(
                "CN={} {},{}",
                first_name, last_name, settings.users_container
            )
        })
    });

    Ok(UserRecord {
        username: text("sAMAccountName"),
        email: text("mail"),
        first_name,
        last_name,
        display_name,
        is_admin,
        is_disabled: uac & UAC_ACCOUNT_DISABLE != 0,
        is_expired: expires_at.is_some_and(|e| e <= now),
        expires_at,
        dn,
    })
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
