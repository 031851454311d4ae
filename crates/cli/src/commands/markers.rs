// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `expiry reset-markers`

use anyhow::{bail, Result};

use super::Paths;

pub async fn reset(paths: &Paths) -> Result<()> {
    let runner = paths.runner()?;
    let report = runner.reset_markers().await?;

    println!("Cleared {} marker(s)", report.cleared);
    if report.failed > 0 {
        bail!("{} marker(s) could not be cleared", report.failed);
    }
    Ok(())
}
