// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use yare::parameterized;

const FULL: &str = r#"
[directory]
url = "ldaps://dc.example.com:636"
bind_dn = "EXAMPLE\\svc-notify"
bind_password = "from-file"
base_dn = "DC=example,DC=com"
admin_group_dn = "CN=IT Admins,OU=Groups,DC=example,DC=com"
marker_attribute = "comment"
starttls = false
tls_verify = false
connect_timeout = "5s"
receive_timeout = "1m"

[mail]
host = "smtp.example.com"
port = 465
security = "tls"
username = "notify"
password = "smtp-secret"
from = "Account Notifier <notify@example.com>"
timeout = "45s"

[daemon]
lock_path = "/run/expiry.lock"
poll_interval = "15s"
log_path = "/var/log/expiry/expiryd.log"
template_dir = "/etc/expiry/templates"
"#;

const MINIMAL: &str = r#"
[directory]
url = "ldap://dc.example.com"
base_dn = "DC=example,DC=com"

[mail]
host = "smtp.example.com"
from = "notify@example.com"
"#;

#[test]
fn parses_full_settings() {
    let settings = ServiceSettings::parse(FULL).unwrap();

    let ldap = settings.ldap_config();
    assert_eq!(ldap.url, "ldaps://dc.example.com:636");
    assert_eq!(ldap.bind_dn, "EXAMPLE\\svc-notify");
    assert!(!ldap.tls_verify);
    assert_eq!(ldap.connect_timeout, Duration::from_secs(5));
    assert_eq!(ldap.receive_timeout, Duration::from_secs(60));

    let catalog = settings.catalog_settings();
    assert_eq!(catalog.admin_group_dn, "CN=IT Admins,OU=Groups,DC=example,DC=com");
    assert_eq!(catalog.users_container, "CN=Users,DC=example,DC=com");
    assert_eq!(catalog.marker_attribute, "comment");

    let smtp = settings.smtp_config();
    assert_eq!(smtp.port, 465);
    assert_eq!(smtp.security, SmtpSecurity::Tls);
    assert_eq!(smtp.username.as_deref(), Some("notify"));
    assert_eq!(smtp.timeout, Duration::from_secs(45));

    assert_eq!(settings.daemon.lock_path, PathBuf::from("/run/expiry.lock"));
    assert_eq!(settings.daemon.poll_interval, Duration::from_secs(15));
    assert!(settings.daemon.template_dir.is_some());
}

#[test]
fn minimal_settings_use_defaults() {
    let settings = ServiceSettings::parse(MINIMAL).unwrap();

    assert!(settings.directory.tls_verify);
    assert!(!settings.directory.starttls);
    assert_eq!(settings.directory.connect_timeout, Duration::from_secs(10));
    assert_eq!(settings.directory.receive_timeout, Duration::from_secs(30));
    assert_eq!(
        settings.catalog_settings().admin_group_dn,
        "CN=Domain Admins,CN=Users,DC=example,DC=com"
    );
    assert_eq!(settings.catalog_settings().marker_attribute, "info");

    let smtp = settings.smtp_config();
    assert_eq!(smtp.port, 587);
    assert_eq!(smtp.security, SmtpSecurity::StartTls);
    assert_eq!(smtp.username, None);

    assert_eq!(settings.daemon.poll_interval, Duration::from_secs(30));
    assert_eq!(settings.daemon.log_path, None);
}

#[test]
fn environment_overrides_secrets() {
    let mut settings = ServiceSettings::parse(FULL).unwrap();
    let env: HashMap<&str, &str> = [
        (LDAP_PASSWORD_ENV, "ldap-env"),
        (SMTP_PASSWORD_ENV, "smtp-env"),
    ]
    .into_iter()
    .collect();

    settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.ldap_config().bind_password, "ldap-env");
    assert_eq!(settings.smtp_config().password.as_deref(), Some("smtp-env"));
}

#[test]
fn missing_environment_keeps_file_values() {
    let mut settings = ServiceSettings::parse(FULL).unwrap();
    settings.apply_env(|_| None);
    assert_eq!(settings.ldap_config().bind_password, "from-file");
}

#[parameterized(
    bad_scheme = { "url = \"http://dc\"\nbase_dn = \"DC=x\"" },
    empty_base = { "url = \"ldap://dc\"\nbase_dn = \" \"" },
)]
fn rejects_invalid_directory(directory: &str) {
    let content = format!(
        "[directory]\n{directory}\n\n[mail]\nhost = \"smtp\"\nfrom = \"a@b.c\"\n"
    );
    assert!(matches!(
        ServiceSettings::parse(&content),
        Err(SettingsError::Invalid(_))
    ));
}

#[test]
fn rejects_bad_duration() {
    let content = MINIMAL.replace(
        "base_dn = \"DC=example,DC=com\"",
        "base_dn = \"DC=example,DC=com\"\nconnect_timeout = \"soon\"",
    );
    assert!(matches!(
        ServiceSettings::parse(&content),
        Err(SettingsError::Parse(_))
    ));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServiceSettings::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }));
}
