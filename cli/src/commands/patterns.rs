// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pattern listing grouped by category

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use unravel_core::domain::config::UnravelConfigManifest;
use unravel_core::domain::pattern::group_by_category;

use crate::services::Services;

#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Only show this category
    #[arg(long)]
    pub category: Option<String>,

    /// Print the grouped listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle_command(args: PatternsArgs, config: UnravelConfigManifest) -> Result<()> {
    let services = Services::build(&config).await?;
    let patterns = services.patterns.list().await;

    let mut grouped = group_by_category(&patterns);
    if let Some(category) = &args.category {
        grouped.retain(|name, _| name == category);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&grouped)?);
        return Ok(());
    }

    if grouped.is_empty() {
        println!("{}", "No patterns found".yellow());
        return Ok(());
    }

    for (category, summaries) in &grouped {
        println!("{} ({})", category.bold(), summaries.len());
        for summary in summaries {
            println!("  {:<32} {}", summary.id, summary.description.dimmed());
        }
        println!();
    }

    println!("{} patterns", patterns.len());

    Ok(())
}
