// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use expiry_adapters::{DirectoryAdapter, DirectoryError, ErrorCategory, FakeDirectory};
use expiry_core::to_filetime;
use yare::parameterized;

const BASE: &str = "DC=example,DC=com";

fn settings() -> CatalogSettings {
    CatalogSettings::new(BASE)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn user(dn: &str, login: &str) -> DirectoryEntry {
    DirectoryEntry::new(dn)
        .with("sAMAccountName", login)
        .with("mail", format!("{login}@example.com"))
        .with("givenName", "Jane")
        .with("sn", "Doe")
        .with("cn", "Jane Doe")
        .with("userAccountControl", "512")
}

#[test]
fn default_settings_follow_base_dn() {
    let s = settings();
    assert_eq!(s.admin_group_dn, "CN=Domain Admins,CN=Users,DC=example,DC=com");
    assert_eq!(s.users_container, "CN=Users,DC=example,DC=com");
    assert_eq!(s.marker_attribute, "info");
}

#[test]
fn filters_match_directory_conventions() {
    let s = settings();
    assert_eq!(
        s.user_filter(),
        "(&(objectClass=user)(!(userAccountControl:1.2.840.113556.1.4.803:=2))\
         (!(memberOf=CN=Domain Admins,CN=Users,DC=example,DC=com)))"
    );
    assert_eq!(
        s.admin_filter(),
        "(&(objectCategory=person)(objectClass=user)(memberOf=CN=Domain Admins,CN=Users,DC=example,DC=com))"
    );
}

#[test]
fn parses_full_entry() {
    let expires = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
    let entry = user("CN=Jane Doe,OU=Staff,DC=example,DC=com", "jdoe")
        .with("accountExpires", to_filetime(expires).to_string())
        .with("displayName", "Jane D.");

    let record = parse_entry(&entry, false, &settings(), now()).unwrap();
    assert_eq!(record.username, "jdoe");
    assert_eq!(record.email, "jdoe@example.com");
    assert_eq!(record.display_name, "Jane D.");
    assert_eq!(record.expires_at, Some(expires));
    assert!(!record.is_expired);
    assert!(!record.is_disabled);
    assert!(!record.is_admin);
    assert_eq!(record.dn.as_deref(), Some("CN=Jane Doe,OU=Staff,DC=example,DC=com"));
}

#[parameterized(
    zero = { "0" },
    never = { "9223372036854775807" },
    absent = { "" },
)]
fn sentinel_expiry_means_never(raw: &str) {
    let mut entry = user("CN=a,DC=example,DC=com", "a");
    if !raw.is_empty() {
        entry = entry.with("accountExpires", raw);
    }
    let record = parse_entry(&entry, false, &settings(), now()).unwrap();
    assert_eq!(record.expires_at, None);
    assert!(!record.is_expired);
}

#[test]
fn past_expiry_is_expired() {
    let expires = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let entry = user("CN=a,DC=example,DC=com", "a")
        .with("accountExpires", to_filetime(expires).to_string());
    assert!(parse_entry(&entry, false, &settings(), now()).unwrap().is_expired);
}

#[test]
fn disabled_bit_is_decoded() {
    let entry = user("CN=a,DC=example,DC=com", "a").with("userAccountControl", "514");
    assert!(parse_entry(&entry, false, &settings(), now()).unwrap().is_disabled);
}

#[test]
fn missing_attributes_become_empty() {
    let entry = DirectoryEntry::new("CN=bare,DC=example,DC=com").with("cn", "bare");
    let record = parse_entry(&entry, true, &settings(), now()).unwrap();
    assert_eq!(record.username, "");
    assert_eq!(record.email, "");
    assert_eq!(record.display_name, "bare");
    assert!(record.is_admin);
    assert!(!record.has_email());
}

#[test]
fn computes_dn_when_entry_has_none() {
    let entry = DirectoryEntry::anonymous()
        .with("givenName", "Jane")
        .with("sn", "Doe");
    let record = parse_entry(&entry, false, &settings(), now()).unwrap();
    assert_eq!(
        record.dn.as_deref(),
        Some("CN=Jane Doe,CN=Users,DC=example,DC=com")
    );

    let nameless = DirectoryEntry::anonymous().with("givenName", "Jane");
    assert_eq!(
        parse_entry(&nameless, false, &settings(), now()).unwrap().dn,
        None
    );
}

#[parameterized(
    bad_expiry = { "accountExpires", "next tuesday" },
    bad_uac = { "userAccountControl", "enabled" },
)]
fn malformed_entries_are_rejected(attr: &str, value: &str) {
    let entry = user("CN=a,DC=example,DC=com", "a").with(attr, value);
    assert!(parse_entry(&entry, false, &settings(), now()).is_err());
}

#[tokio::test]
async fn build_skips_malformed_entries() {
    let s = settings();
    let directory = FakeDirectory::new();
    directory.add_result(&s.user_filter(), user("CN=a,DC=example,DC=com", "a"));
    directory.add_result(
        &s.user_filter(),
        user("CN=b,DC=example,DC=com", "b").with("accountExpires", "garbage"),
    );
    directory.add_result(&s.admin_filter(), user("CN=boss,DC=example,DC=com", "boss"));

    let mut conn = directory.connect().await.unwrap();
    let catalog = build_catalog(&mut conn, &s, now()).await.unwrap();

    assert_eq!(catalog.users.len(), 1);
    assert_eq!(catalog.users[0].username, "a");
    assert_eq!(catalog.admins.len(), 1);
    assert!(catalog.admins[0].is_admin);
    assert_eq!(catalog.admin_recipients(), vec!["boss@example.com".to_string()]);
}

#[tokio::test]
async fn search_failure_is_catalog_error() {
    let s = settings();
    let directory = FakeDirectory::new();
    directory.fail_search(
        &s.admin_filter(),
        DirectoryError::Connection("reset by peer".into()),
    );

    let mut conn = directory.connect().await.unwrap();
    let err = build_catalog(&mut conn, &s, now()).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Connection);
    assert!(err.to_string().starts_with("admin search failed"));
}

#[test]
fn find_is_case_insensitive_and_includes_admins() {
    let parse = |e: DirectoryEntry, admin| parse_entry(&e, admin, &settings(), now()).unwrap();
    let catalog = Catalog {
        users: vec![parse(user("CN=a,DC=x", "Alice"), false)],
        admins: vec![parse(user("CN=b,DC=x", "bob"), true)],
    };
    assert_eq!(catalog.find("alice").map(|u| u.username.as_str()), Some("Alice"));
    assert!(catalog.find("BOB").is_some_and(|u| u.is_admin));
    assert!(catalog.find("carol").is_none());
}

#[test]
fn admin_recipients_skip_blank_and_duplicate_emails() {
    let parse = |e: DirectoryEntry| parse_entry(&e, true, &settings(), now()).unwrap();
    let catalog = Catalog {
        users: Vec::new(),
        admins: vec![
            parse(user("CN=a,DC=x", "a")),
            parse(DirectoryEntry::new("CN=b,DC=x").with("sAMAccountName", "b")),
            parse(user("CN=c,DC=x", "a")),
        ],
    };
    assert_eq!(catalog.admin_recipients(), vec!["a@example.com".to_string()]);
}
