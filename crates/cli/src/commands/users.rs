// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `expiry users`

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use super::Paths;
use crate::output::{print_list, user_header, OutputFormat, UserRow};

#[derive(Args)]
pub struct UsersArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Include members of the admin group
    #[arg(long)]
    pub admins: bool,
}

pub async fn list(paths: &Paths, args: UsersArgs) -> Result<()> {
    let runner = paths.runner()?;
    let catalog = runner.catalog().await?;
    let now = Utc::now();

    let mut rows: Vec<UserRow> = catalog.users.iter().map(|u| UserRow::new(u, now)).collect();
    if args.admins {
        rows.extend(catalog.admins.iter().map(|u| UserRow::new(u, now)));
    }

    let format = OutputFormat::from_json_flag(args.json);
    if let OutputFormat::Text = format {
        if rows.is_empty() {
            println!("No users");
            return Ok(());
        }
        println!("{}", user_header());
    }
    print_list(&rows, format)
}
