// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `expiry check-config` - validate both files without touching the network

use anyhow::{bail, Result};
use chrono::Utc;
use expiry_core::{
    user_context, AdminDigest, MessageTexts, NotifierConfig, Recipient, Stage, TemplateEngine,
};

use super::Paths;

pub fn check_config(paths: &Paths) -> Result<()> {
    let settings = paths.load_settings()?;
    println!("Settings: {}", paths.settings.display());
    println!(
        "  directory {} (base {})",
        settings.directory.url, settings.directory.base_dn
    );
    println!("  mail relay {}:{}", settings.mail.host, settings.mail.port);
    println!("  lock file {}", settings.daemon.lock_path.display());

    let config = paths.load_config()?;
    println!("Configuration: {}", paths.config.display());
    let times = &config.notification_time;
    println!("Triggers:");
    println!("  user pass   {}", times.automatic_message_all_users);
    println!("  admin pass  {}", times.automatic_message_admins);
    println!("Stages:");
    for window in config.notification_days.windows() {
        println!("  {}", window);
    }
    println!("Admin alert threshold: {} days", config.admin_threshold());

    let problems = template_problems(&config);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("error: {}", problem);
        }
        bail!("{} message template(s) failed to render", problems.len());
    }
    println!("Message templates: ok");
    Ok(())
}

/// Render every configured message against sample values.
fn template_problems(config: &NotifierConfig) -> Vec<String> {
    let engine = TemplateEngine::new();
    let now = Utc::now();
    let recipient = Recipient {
        username: "jdoe",
        email: "jdoe@example.com",
        first_name: "Jane",
        last_name: "Doe",
    };

    let mut problems = Vec::new();
    for stage in Stage::ALL {
        if !config.messages.contains_key(stage.name()) {
            println!("  note: no message configured for {}", stage);
        }
        let context = user_context(recipient, 7, now, now);
        if let Err(e) = MessageTexts::render(&config.message_for(stage), &context, &engine) {
            problems.push(format!("{} message: {}", stage, e));
        }
    }

    if let Err(e) = AdminDigest::from_events(&[]).texts(&config.admin_auto_report, now, &engine) {
        problems.push(format!("admin_auto_report: {}", e));
    }
    problems
}
