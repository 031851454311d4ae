// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::directory::ErrorCategory;

const USERS: &str = "(objectClass=user)";
const DN: &str = "CN=Jane Doe,CN=Users,DC=example,DC=com";

fn jane() -> DirectoryEntry {
    DirectoryEntry::new(DN)
        .with("sAMAccountName", "jdoe")
        .with("mail", "jdoe@example.com")
}

#[test]
fn entry_attributes_are_case_insensitive() {
    let entry = jane();
    assert_eq!(entry.first("samaccountname"), Some("jdoe"));
    assert_eq!(entry.first("MAIL"), Some("jdoe@example.com"));
    assert_eq!(entry.first("info"), None);
    assert!(entry.values("memberOf").is_empty());
}

#[test]
fn empty_dn_is_absent() {
    assert_eq!(DirectoryEntry::new("").dn(), None);
    assert_eq!(jane().dn(), Some(DN));
}

#[tokio::test]
async fn subtree_search_returns_registered_entries() {
    let directory = FakeDirectory::new();
    directory.add_result(USERS, jane());

    let mut conn = directory.connect().await.unwrap();
    let found = conn
        .search("DC=example,DC=com", SearchScope::Subtree, USERS, &["mail"])
        .await
        .unwrap();
    assert_eq!(found, vec![jane()]);

    let none = conn
        .search("DC=example,DC=com", SearchScope::Subtree, "(cn=x)", &[])
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn base_search_resolves_dn() {
    let directory = FakeDirectory::new();
    directory.add_result(USERS, jane());
    let mut conn = directory.connect().await.unwrap();

    let found = conn
        .search(DN, SearchScope::Base, "(objectClass=*)", &["info"])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let err = conn
        .search("CN=Nobody,DC=example,DC=com", SearchScope::Base, "(objectClass=*)", &[])
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NoSuchObject);
}

#[tokio::test]
async fn modify_applies_changes() {
    let directory = FakeDirectory::new();
    directory.add_result(USERS, jane());
    let mut conn = directory.connect().await.unwrap();

    conn.modify(DN, vec![AttributeChange::add("info", "notified_early")])
        .await
        .unwrap();
    assert_eq!(directory.attribute(DN, "info").as_deref(), Some("notified_early"));

    conn.modify(
        DN,
        vec![AttributeChange::replace("info", "notified_early;notified_middle")],
    )
    .await
    .unwrap();
    assert_eq!(
        directory.attribute(DN, "info").as_deref(),
        Some("notified_early;notified_middle")
    );

    conn.modify(DN, vec![AttributeChange::clear("info")])
        .await
        .unwrap();
    assert_eq!(directory.attribute(DN, "info"), None);
    assert_eq!(directory.modifications(DN).len(), 3);
}

#[tokio::test]
async fn injected_failures_surface() {
    let directory = FakeDirectory::new();
    directory.add_result(USERS, jane());
    directory.fail_modify(DN, DirectoryError::Protocol("insufficient access".into()));

    let mut conn = directory.connect().await.unwrap();
    let err = conn
        .modify(DN, vec![AttributeChange::add("info", "x")])
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Protocol);
    // State untouched
    assert_eq!(directory.attribute(DN, "info"), None);

    directory.fail_connect(DirectoryError::Connection("refused".into()));
    assert!(matches!(
        directory.connect().await,
        Err(DirectoryError::Connection(_))
    ));
}

#[tokio::test]
async fn records_calls() {
    let directory = FakeDirectory::new();
    let mut conn = directory.connect().await.unwrap();
    conn.search("DC=x", SearchScope::Subtree, USERS, &[])
        .await
        .unwrap();
    conn.unbind().await.unwrap();

    assert_eq!(
        directory.calls(),
        vec![
            DirectoryCall::Connect,
            DirectoryCall::Search {
                base: "DC=x".to_string(),
                scope: SearchScope::Subtree,
                filter: USERS.to_string(),
            },
            DirectoryCall::Unbind,
        ]
    );
    assert_eq!(directory.connects(), 1);
    assert_eq!(directory.unbinds(), 1);
}
